/// Crate-wide result alias.
pub type CarouselResult<T> = Result<T, CarouselError>;

/// Errors surfaced by the carousel engine.
#[derive(thiserror::Error, Debug)]
pub enum CarouselError {
    /// Input rejected at a boundary (bad patch, bad configuration).
    #[error("validation error: {0}")]
    Validation(String),

    /// Geometry input that cannot produce a meaningful rectangle.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Failure inside a render surface.
    #[error("render error: {0}")]
    Render(String),

    /// Failure while encoding or packaging output.
    #[error("encode error: {0}")]
    Encode(String),

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other failure, usually I/O or codec errors with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CarouselError {
    /// Build a [`CarouselError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CarouselError::Geometry`].
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`CarouselError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CarouselError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`CarouselError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
