//! Error types for policy module.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Errors that can occur during policy operations.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Manifest not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
