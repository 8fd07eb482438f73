/// Crate-wide result type.
pub type StoryResult<T> = Result<T, StoryError>;

/// Error type shared by loading, joining, scene building and rendering.
#[derive(thiserror::Error, Debug)]
pub enum StoryError {
    /// Story definition or caller input is invalid.
    #[error("validation error: {0}")]
    Validation(String),

    /// A dataset could not be read.
    #[error("load error: {0}")]
    Load(String),

    /// A dataset was read but holds malformed cells.
    #[error("parse error: {0}")]
    Parse(String),

    /// A chart could not be built or drawn.
    #[error("render error: {0}")]
    Render(String),

    /// JSON (de)serialization failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryError {
    /// Build a [`StoryError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StoryError::Load`].
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Build a [`StoryError::Parse`].
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`StoryError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StoryError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
