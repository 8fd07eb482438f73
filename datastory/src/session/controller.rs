//! Scene navigation.
//!
//! The controller owns the current scene index and the loaded data. Every transition clears the
//! container before anything new is drawn into it.

use crate::data::load::StoryData;
use crate::foundation::error::{StoryError, StoryResult};
use crate::render::surface::{ControlState, Surface};
use crate::scene::descriptor::SceneDescriptor;
use serde::{Deserialize, Serialize};

/// What `advance` / `retreat` do at the ends of the scene list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationPolicy {
    /// Stay on the boundary scene; the call is a no-op.
    #[default]
    Clamp,
    /// Continue from the other end of the list.
    Wrap,
}

/// Lifecycle phase of a [`SceneController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// `initialize` has not been called.
    Uninitialized,
    /// Introductory state: nothing rendered, index parked at 0.
    Home,
    /// The scene at the current index is on screen.
    Showing,
    /// Data failed to load; navigation is disabled.
    Failed,
}

/// Observable outcome of a controller operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The container was cleared and the scene at this index rendered.
    Rendered(usize),
    /// The container was cleared and left empty.
    Cleared,
    /// Nothing happened.
    Unchanged,
}

/// Owns the scene list, the current index and the surface it draws on.
#[derive(Debug)]
pub struct SceneController<S: Surface> {
    container_id: String,
    scenes: Vec<SceneDescriptor>,
    surface: S,
    policy: NavigationPolicy,
    note: Option<String>,
    data: Option<StoryData>,
    current_index: usize,
    phase: Phase,
    failure: Option<String>,
}

impl<S: Surface> SceneController<S> {
    /// Create a controller over a non-empty scene list. Nothing is drawn until
    /// [`SceneController::initialize`].
    pub fn new(
        container_id: impl Into<String>,
        scenes: Vec<SceneDescriptor>,
        surface: S,
    ) -> StoryResult<Self> {
        if scenes.is_empty() {
            return Err(StoryError::validation("scene list must not be empty"));
        }
        Ok(Self {
            container_id: container_id.into(),
            scenes,
            surface,
            policy: NavigationPolicy::default(),
            note: None,
            data: None,
            current_index: 0,
            phase: Phase::Uninitialized,
            failure: None,
        })
    }

    /// Set the boundary policy.
    pub fn with_policy(mut self, policy: NavigationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Footer note shown while a scene is on screen and removed at home.
    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    /// Take ownership of the load result and show scene 0.
    ///
    /// On a load error nothing is rendered: the error is logged, shown on the surface and
    /// returned, and the controller stays failed. There is no retry.
    pub fn initialize(&mut self, data: StoryResult<StoryData>) -> StoryResult<Transition> {
        if self.phase != Phase::Uninitialized {
            return Err(StoryError::validation("controller is already initialized"));
        }
        match data {
            Ok(data) => {
                self.data = Some(data);
                self.show(0)
            }
            Err(e) => {
                tracing::error!(container = %self.container_id, error = %e, "data failed to load; not rendering");
                self.phase = Phase::Failed;
                self.failure = Some(e.to_string());
                self.surface.clear(&self.container_id)?;
                self.surface.show_error(&self.container_id, &e.to_string())?;
                self.push_controls()?;
                Err(e)
            }
        }
    }

    /// Show the next scene. From home this starts the story at scene 0.
    pub fn advance(&mut self) -> StoryResult<Transition> {
        match self.phase {
            Phase::Uninitialized | Phase::Failed => Ok(Transition::Unchanged),
            Phase::Home => self.show(0),
            Phase::Showing if self.current_index < self.last_index() => {
                self.show(self.current_index + 1)
            }
            Phase::Showing => match self.policy {
                NavigationPolicy::Clamp => Ok(Transition::Unchanged),
                NavigationPolicy::Wrap => self.show(0),
            },
        }
    }

    /// Show the previous scene. No-op at home.
    pub fn retreat(&mut self) -> StoryResult<Transition> {
        match self.phase {
            Phase::Uninitialized | Phase::Failed | Phase::Home => Ok(Transition::Unchanged),
            Phase::Showing if self.current_index > 0 => self.show(self.current_index - 1),
            Phase::Showing => match self.policy {
                NavigationPolicy::Clamp => Ok(Transition::Unchanged),
                NavigationPolicy::Wrap => self.show(self.last_index()),
            },
        }
    }

    /// Return to the introductory state: index 0, container cleared, no chart.
    pub fn reset(&mut self) -> StoryResult<Transition> {
        if self.phase != Phase::Showing {
            return Ok(Transition::Unchanged);
        }
        tracing::debug!(from = self.current_index, "scene reset");
        self.current_index = 0;
        self.phase = Phase::Home;
        self.surface.clear(&self.container_id)?;
        if self.note.is_some() {
            self.surface.set_note(&self.container_id, None)?;
        }
        self.push_controls()?;
        Ok(Transition::Cleared)
    }

    /// Jump straight to `index`.
    pub fn go_to(&mut self, index: usize) -> StoryResult<Transition> {
        if index >= self.scenes.len() {
            return Err(StoryError::validation(format!(
                "scene index {index} out of range (0..{})",
                self.scenes.len()
            )));
        }
        match self.phase {
            Phase::Uninitialized => Err(StoryError::validation("controller is not initialized")),
            Phase::Failed => Ok(Transition::Unchanged),
            Phase::Home | Phase::Showing => self.show(index),
        }
    }

    /// Index of the current scene; always within the scene list.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Boundary policy in effect.
    pub fn policy(&self) -> NavigationPolicy {
        self.policy
    }

    /// Number of scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Always `false`; the constructor rejects empty scene lists.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Title of the current scene.
    pub fn current_title(&self) -> &str {
        self.scenes[self.current_index].title()
    }

    /// Load error message, when initialization failed.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Loaded data, once initialized successfully.
    pub fn data(&self) -> Option<&StoryData> {
        self.data.as_ref()
    }

    /// Navigation availability for the current state.
    pub fn controls(&self) -> ControlState {
        match self.phase {
            Phase::Uninitialized | Phase::Failed => ControlState::default(),
            Phase::Home => ControlState {
                previous_enabled: false,
                next_enabled: true,
                home_visible: false,
            },
            Phase::Showing => {
                let wrap = self.policy == NavigationPolicy::Wrap;
                ControlState {
                    previous_enabled: wrap || self.current_index > 0,
                    next_enabled: wrap || self.current_index < self.last_index(),
                    home_visible: true,
                }
            }
        }
    }

    /// Surface being drawn on.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Give the surface back.
    pub fn into_surface(self) -> S {
        self.surface
    }

    fn last_index(&self) -> usize {
        self.scenes.len() - 1
    }

    fn push_controls(&mut self) -> StoryResult<()> {
        let controls = self.controls();
        self.surface.update_controls(controls)
    }

    fn show(&mut self, index: usize) -> StoryResult<Transition> {
        let entering = self.phase != Phase::Showing;
        let from = self.current_index;

        self.surface.clear(&self.container_id)?;
        if entering {
            if let Some(note) = &self.note {
                self.surface.set_note(&self.container_id, Some(note))?;
            }
        }
        // State moves only once the container has been cleared.
        self.current_index = index;
        self.phase = Phase::Showing;

        let data = self
            .data
            .as_ref()
            .ok_or_else(|| StoryError::validation("controller has no data"))?;
        let scene = &self.scenes[index];
        tracing::debug!(from, to = index, title = scene.title(), "scene transition");

        let built = scene.render(data).and_then(|chart| {
            self.surface.render(&self.container_id, &chart)?;
            if let Some(notes) = scene.annotate(data) {
                self.surface.annotate(&self.container_id, &notes)?;
            }
            Ok(())
        });
        if let Err(e) = built {
            tracing::error!(scene = scene.title(), error = %e, "scene failed to render");
            self.surface.show_error(&self.container_id, &e.to_string())?;
            self.push_controls()?;
            return Err(e);
        }

        self.push_controls()?;
        Ok(Transition::Rendered(index))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/controller.rs"]
mod tests;
