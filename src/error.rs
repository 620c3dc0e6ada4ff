//! Error types for the retrieval pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for retrieval operations
pub type Result<T> = std::result::Result<T, ImatchError>;

/// Error types that can occur across extraction, comparison, and storage
#[derive(Error, Debug)]
pub enum ImatchError {
    #[error("failed to decode image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The detector found no regions. Recoverable: callers indexing a
    /// face database skip the image instead of reporting corruption.
    #[error("no face detected")]
    NoFaceDetected,

    #[error("feature length mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("metric {metric} cannot compare {method} features")]
    MethodMismatch { metric: String, method: String },

    #[error("unknown method: {name}")]
    UnknownMethod { name: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(String),
}
