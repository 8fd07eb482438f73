//! A story file bound to its data, a controller and a surface.

use crate::data::load::{StoryData, load_sources};
use crate::foundation::error::{StoryError, StoryResult};
use crate::render::surface::Surface;
use crate::scene::story::Story;
use crate::session::controller::{Phase, SceneController, Transition};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// A user navigation control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavStep {
    /// "next" button.
    Next,
    /// "previous" button.
    Previous,
    /// "home" button.
    Home,
}

impl FromStr for NavStep {
    type Err = StoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "next" | "n" => Ok(Self::Next),
            "previous" | "prev" | "p" => Ok(Self::Previous),
            "home" | "h" => Ok(Self::Home),
            other => Err(StoryError::validation(format!(
                "unknown navigation step '{other}' (expected next, previous or home)"
            ))),
        }
    }
}

/// A validated story wired to a controller and a surface.
///
/// Construction loads every dataset. A load failure does not fail construction: the controller
/// is left in [`Phase::Failed`] with the error on the surface, and every step is a no-op.
pub struct StorySession<S: Surface> {
    story: Story,
    base_dir: PathBuf,
    controller: SceneController<S>,
}

impl<S: Surface> StorySession<S> {
    /// Open a story file; dataset paths resolve against the file's directory.
    pub fn open(path: impl AsRef<Path>, surface: S) -> StoryResult<Self> {
        let path = path.as_ref();
        let story = Story::from_path(path)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::new(story, base_dir, surface)
    }

    /// Validate `story`, load its data from `base_dir` and show the first scene.
    #[tracing::instrument(skip_all, fields(base_dir = %base_dir.as_ref().display()))]
    pub fn new(story: Story, base_dir: impl AsRef<Path>, surface: S) -> StoryResult<Self> {
        story.validate()?;
        let base_dir = base_dir.as_ref().to_path_buf();
        let mut controller = SceneController::new(story.container(), story.scenes(), surface)?
            .with_policy(story.navigation())
            .with_note(story.source_note().map(str::to_owned));

        let data = load_sources(story.sources(), &base_dir, story.primary());
        match controller.initialize(data) {
            Ok(_) => {}
            Err(e) if controller.phase() == Phase::Failed => {
                tracing::warn!(error = %e, "story opened without data");
            }
            Err(e) => return Err(e),
        }

        Ok(Self {
            story,
            base_dir,
            controller,
        })
    }

    /// Apply one navigation control.
    pub fn step(&mut self, step: NavStep) -> StoryResult<Transition> {
        let t = match step {
            NavStep::Next => self.controller.advance()?,
            NavStep::Previous => self.controller.retreat()?,
            NavStep::Home => self.controller.reset()?,
        };
        tracing::debug!(?step, ?t, index = self.controller.current_index(), "navigation");
        Ok(t)
    }

    /// The parsed story.
    pub fn story(&self) -> &Story {
        &self.story
    }

    /// Directory dataset paths resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Loaded data, unless loading failed.
    pub fn data(&self) -> Option<&StoryData> {
        self.controller.data()
    }

    /// The controller.
    pub fn controller(&self) -> &SceneController<S> {
        &self.controller
    }

    /// The controller, mutably.
    pub fn controller_mut(&mut self) -> &mut SceneController<S> {
        &mut self.controller
    }

    /// Consume the session and return its surface.
    pub fn into_surface(self) -> S {
        self.controller.into_surface()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/story_session.rs"]
mod tests;
