//! Drawing targets the scene controller talks to.

use crate::foundation::error::StoryResult;
use crate::render::chart::{Annotation, ChartSpec};

/// Enabled/visible state of the previous, next and home triggers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlState {
    /// "previous" can be pressed.
    pub previous_enabled: bool,
    /// "next" can be pressed.
    pub next_enabled: bool,
    /// "home" is shown.
    pub home_visible: bool,
}

/// Drawing target addressed by container id.
///
/// The scene controller only ever calls `clear` before `render`, so implementations may assume a
/// container is empty when `render` is called.
pub trait Surface {
    /// Remove the chart, annotations and any error from a container.
    fn clear(&mut self, container_id: &str) -> StoryResult<()>;
    /// Draw a chart into a cleared container.
    fn render(&mut self, container_id: &str, chart: &ChartSpec) -> StoryResult<()>;
    /// Overlay annotations on the chart last rendered into the container.
    fn annotate(&mut self, container_id: &str, notes: &[Annotation]) -> StoryResult<()>;
    /// Show an operator-visible error in place of a chart.
    fn show_error(&mut self, container_id: &str, message: &str) -> StoryResult<()>;
    /// Set or remove the footer note (data source attribution).
    fn set_note(&mut self, container_id: &str, note: Option<&str>) -> StoryResult<()>;
    /// Reflect navigation availability. Surfaces without controls ignore this.
    fn update_controls(&mut self, _controls: ControlState) -> StoryResult<()> {
        Ok(())
    }
}

/// One call received by a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceOp {
    /// `clear(container)`.
    Clear(String),
    /// `render(container, chart)`; only the title is kept.
    Render {
        /// Container id.
        container: String,
        /// Chart title.
        title: String,
    },
    /// `annotate(container, notes)`; only the texts are kept.
    Annotate {
        /// Container id.
        container: String,
        /// Annotation texts.
        texts: Vec<String>,
    },
    /// `show_error(container, message)`.
    Error {
        /// Container id.
        container: String,
        /// Error text.
        message: String,
    },
    /// `set_note(container, note)`.
    Note {
        /// Container id.
        container: String,
        /// New note.
        note: Option<String>,
    },
    /// `update_controls(state)`.
    Controls(ControlState),
}

/// In-memory surface that logs every call, for tests and debugging.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    ops: Vec<SurfaceOp>,
}

impl RecordingSurface {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, oldest first.
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Forget recorded calls.
    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    /// Number of `render` calls recorded.
    pub fn render_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Render { .. }))
            .count()
    }

    /// Number of `clear` calls recorded.
    pub fn clear_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, SurfaceOp::Clear(_)))
            .count()
    }

    /// Most recent control state pushed by the controller.
    pub fn last_controls(&self) -> Option<ControlState> {
        self.ops.iter().rev().find_map(|op| match op {
            SurfaceOp::Controls(c) => Some(*c),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, container_id: &str) -> StoryResult<()> {
        self.ops.push(SurfaceOp::Clear(container_id.to_owned()));
        Ok(())
    }

    fn render(&mut self, container_id: &str, chart: &ChartSpec) -> StoryResult<()> {
        self.ops.push(SurfaceOp::Render {
            container: container_id.to_owned(),
            title: chart.title.clone(),
        });
        Ok(())
    }

    fn annotate(&mut self, container_id: &str, notes: &[Annotation]) -> StoryResult<()> {
        self.ops.push(SurfaceOp::Annotate {
            container: container_id.to_owned(),
            texts: notes.iter().map(|n| n.text.clone()).collect(),
        });
        Ok(())
    }

    fn show_error(&mut self, container_id: &str, message: &str) -> StoryResult<()> {
        self.ops.push(SurfaceOp::Error {
            container: container_id.to_owned(),
            message: message.to_owned(),
        });
        Ok(())
    }

    fn set_note(&mut self, container_id: &str, note: Option<&str>) -> StoryResult<()> {
        self.ops.push(SurfaceOp::Note {
            container: container_id.to_owned(),
            note: note.map(str::to_owned),
        });
        Ok(())
    }

    fn update_controls(&mut self, controls: ControlState) -> StoryResult<()> {
        self.ops.push(SurfaceOp::Controls(controls));
        Ok(())
    }
}

impl<S: Surface + ?Sized> Surface for &mut S {
    fn clear(&mut self, container_id: &str) -> StoryResult<()> {
        (**self).clear(container_id)
    }

    fn render(&mut self, container_id: &str, chart: &ChartSpec) -> StoryResult<()> {
        (**self).render(container_id, chart)
    }

    fn annotate(&mut self, container_id: &str, notes: &[Annotation]) -> StoryResult<()> {
        (**self).annotate(container_id, notes)
    }

    fn show_error(&mut self, container_id: &str, message: &str) -> StoryResult<()> {
        (**self).show_error(container_id, message)
    }

    fn set_note(&mut self, container_id: &str, note: Option<&str>) -> StoryResult<()> {
        (**self).set_note(container_id, note)
    }

    fn update_controls(&mut self, controls: ControlState) -> StoryResult<()> {
        (**self).update_controls(controls)
    }
}
