//! Error types for templates.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur during template operations.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(PathBuf),

    #[error("Not a template file (expected a .template suffix): {0}")]
    InvalidTemplateName(PathBuf),

    #[error("Template validation failed:\n{}", .0.join("\n"))]
    ValidationFailed(Vec<String>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
