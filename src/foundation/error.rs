/// Convenience result type used across motiongram.
pub type MotiongramResult<T> = Result<T, MotiongramError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum MotiongramError {
    /// Malformed or contradictory document data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A movement became active with an interpolation strategy the engine does not know.
    #[error(
        "unsupported movement strategy '{strategy}' (movement #{movement} targeting '{element}')"
    )]
    UnsupportedStrategy {
        /// Index of the movement in document order.
        movement: usize,
        /// Element name the movement targets.
        element: String,
        /// Declared strategy name.
        strategy: String,
    },

    /// Errors while drawing elements to a raster surface.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while encoding or writing captured frames.
    #[error("export error: {0}")]
    Export(String),

    /// Errors when serializing or deserializing documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MotiongramError {
    /// Build a [`MotiongramError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MotiongramError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`MotiongramError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`MotiongramError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`MotiongramError::UnsupportedStrategy`] value.
    pub fn unsupported_strategy(
        movement: usize,
        element: impl Into<String>,
        strategy: impl Into<String>,
    ) -> Self {
        Self::UnsupportedStrategy {
            movement,
            element: element.into(),
            strategy: strategy.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
