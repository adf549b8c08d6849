//! Error types for the core module.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur during core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Backup of {path} failed: {message}")]
    BackupFailed { path: PathBuf, message: String },

    #[error("No backup available for rollback")]
    NoBackup,

    #[error("kustomize build failed: {0}")]
    KustomizeFailed(String),

    #[error("Template error: {0}")]
    Template(#[from] kf_templates::TemplateError),

    #[error("Runner error: {0}")]
    Runner(#[from] kf_runner::RunnerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
