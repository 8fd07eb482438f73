//! Scene list entries.

use crate::data::load::StoryData;
use crate::foundation::error::StoryResult;
use crate::render::chart::{Annotation, ChartSpec};
use std::fmt;

/// Builds a scene's chart from loaded data.
pub type RenderFn = Box<dyn Fn(&StoryData) -> StoryResult<ChartSpec> + Send + Sync>;
/// Produces the annotations drawn over a scene's chart.
pub type AnnotateFn = Box<dyn Fn(&StoryData) -> Vec<Annotation> + Send + Sync>;

/// One entry of a scene list: a render function plus an optional annotation function.
pub struct SceneDescriptor {
    title: String,
    render: RenderFn,
    annotate: Option<AnnotateFn>,
}

impl SceneDescriptor {
    /// Scene without annotations.
    pub fn new<F>(title: impl Into<String>, render: F) -> Self
    where
        F: Fn(&StoryData) -> StoryResult<ChartSpec> + Send + Sync + 'static,
    {
        Self {
            title: title.into(),
            render: Box::new(render),
            annotate: None,
        }
    }

    /// Attach an annotation function.
    pub fn with_annotations<F>(mut self, annotate: F) -> Self
    where
        F: Fn(&StoryData) -> Vec<Annotation> + Send + Sync + 'static,
    {
        self.annotate = Some(Box::new(annotate));
        self
    }

    /// Scene title, used in logs.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Build the chart for this scene.
    pub fn render(&self, data: &StoryData) -> StoryResult<ChartSpec> {
        (self.render)(data)
    }

    /// Annotations for this scene, or `None` when it has no annotation function.
    pub fn annotate(&self, data: &StoryData) -> Option<Vec<Annotation>> {
        self.annotate.as_ref().map(|f| f(data))
    }
}

impl fmt::Debug for SceneDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneDescriptor")
            .field("title", &self.title)
            .field("annotated", &self.annotate.is_some())
            .finish()
    }
}
