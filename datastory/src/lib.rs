//! datastory joins country-by-year datasets and steps through the scenes of a chart story.
//!
//! The engine is two pieces:
//!
//! - A dataset joiner: load CO2, life-expectancy and obesity CSVs in parallel, parse them into
//!   typed [`MeasureTable`]s and join them on `(Country, Year)` into [`JoinedRecord`]s.
//! - A scene controller: hold an index into an ordered scene list and, on every
//!   next / previous / home, clear the target [`Surface`] and draw the current scene.
//!
//! Stories are described in JSON ([`Story`]) and driven through a [`StorySession`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Dataset loading, parsing and joining.
pub mod data;
/// Chart model, scales and drawing surfaces.
pub mod render;
/// Scene builders and story definitions.
pub mod scene;
/// Navigation over a loaded story.
pub mod session;

pub use crate::foundation::core::{BezPath, Canvas, Layout, Margin, Point, Rect, RecordKey};
pub use crate::foundation::error::{StoryError, StoryResult};

pub use crate::data::dataset::{Dataset, MeasureRecord, MeasureTable};
pub use crate::data::join::{JoinedRecord, complete, join, retain_complete};
pub use crate::data::load::{DataSource, StoryData, load_sources};
pub use crate::data::schema::{ColumnMap, Measure};
pub use crate::render::chart::{Annotation, ChartSpec};
pub use crate::render::color::Color;
pub use crate::render::surface::{ControlState, RecordingSurface, Surface, SurfaceOp};
pub use crate::render::svg::SvgSurface;
pub use crate::scene::descriptor::SceneDescriptor;
pub use crate::scene::story::{ChartDef, SceneDef, Story};
pub use crate::session::controller::{NavigationPolicy, Phase, SceneController, Transition};
pub use crate::session::story_session::{NavStep, StorySession};
