//! Engine error taxonomy
//!
//! Every fallible engine operation returns [`EngineResult`]. The variants
//! mirror how failures are handled by callers:
//!
//! - [`EngineError::NotImplemented`]: a component type was asked for a
//!   capability it never supplied (e.g. loading from JSON).
//! - [`EngineError::FileNotFound`] / [`EngineError::Io`] / [`EngineError::Json`]:
//!   archetype or resource files that are missing or unparseable.
//! - [`EngineError::InvalidParameters`]: unknown archetype, unknown component
//!   type, or malformed archetype content.
//! - [`EngineError::InternalError`]: wrapped lower-level failures such as an
//!   incomplete framebuffer or a shader that failed to compile.

use std::path::PathBuf;

/// Result type used across the engine
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine errors
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// Capability not provided by a component type
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// File or directory missing
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// IO failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse or write failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unknown name or malformed input
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Wrapped failure from a lower layer
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl EngineError {
    /// Shorthand for [`EngineError::InvalidParameters`]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameters(message.into())
    }

    /// Shorthand for [`EngineError::InternalError`]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<crate::render::RenderError> for EngineError {
    fn from(error: crate::render::RenderError) -> Self {
        Self::InternalError(error.to_string())
    }
}
