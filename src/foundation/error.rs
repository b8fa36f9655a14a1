/// Convenience result type used across Stackpane.
pub type StackpaneResult<T> = Result<T, StackpaneError>;

/// Top-level error taxonomy used by engine APIs.
///
/// None of these escape to the end user; the engine degrades gracefully (a
/// missing layer, a missing highlight, or the placeholder) and logs instead.
#[derive(thiserror::Error, Debug)]
pub enum StackpaneError {
    /// Invalid caller-provided data (dimensions, byte lengths, ids).
    #[error("validation error: {0}")]
    Validation(String),

    /// Network or decode failure while resolving a layer bitmap.
    #[error("load error: {0}")]
    Load(String),

    /// Alpha buffer inaccessible or unreadable during a pointer query.
    #[error("hit test error: {0}")]
    HitTest(String),

    /// Drawing surface unavailable or invalid for this render pass.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StackpaneError {
    /// Build a [`StackpaneError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StackpaneError::Load`] value.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Build a [`StackpaneError::HitTest`] value.
    pub fn hit_test(msg: impl Into<String>) -> Self {
        Self::HitTest(msg.into())
    }

    /// Build a [`StackpaneError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
