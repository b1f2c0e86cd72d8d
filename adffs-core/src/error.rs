//! Error types for the volume adapter.

use thiserror::Error;

/// Errors that can occur while operating on a mounted volume.
#[derive(Error, Debug)]
pub enum AdfError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("read-only volume")]
    ReadOnly,

    #[error("entry exists: {0}")]
    Exists(String),

    #[error("volume fault: {0}")]
    IoFault(String),

    #[error("unsupported entry: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for adapter operations.
pub type AdfResult<T> = Result<T, AdfError>;
