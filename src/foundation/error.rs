pub type FilmrollResult<T> = Result<T, FilmrollError>;

/// Errors surfaced by configuration, asset loading and rendering.
///
/// Per-slot load failures never reach callers as errors; the loader reports them as
/// [`LoadEvent`](crate::LoadEvent)s and leaves the slot empty.
#[derive(thiserror::Error, Debug)]
pub enum FilmrollError {
    /// Invalid configuration or argument.
    #[error("validation error: {0}")]
    Validation(String),

    /// Frame asset could not be fetched or decoded.
    #[error("asset error: {0}")]
    Asset(String),

    /// Drawing surface missing or unusable.
    #[error("render error: {0}")]
    Render(String),

    /// Config (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Anything else, with its source chain.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FilmrollError {
    /// Build a [`FilmrollError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FilmrollError::Asset`].
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build a [`FilmrollError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`FilmrollError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
