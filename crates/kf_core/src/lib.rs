//! # kf_core
//!
//! Directory workflow for kustforge.
//!
//! - [`ForgeEngine`]: discover hidden manifest templates, render them,
//!   validate, back up, write and run `kustomize build`
//! - [`RollbackManager`]: in-memory and on-disk snapshots with best-effort
//!   restore and age-based cleanup
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::path::Path;
//! use std::sync::Arc;
//! use kf_aws::{AwsConfig, AwsResourceResolver, CachedResolver, SessionManager};
//! use kf_core::{ApplyOutcome, ForgeEngine};
//! use kf_runner::{CliRunner, CliRunnerOptions};
//!
//! let runner = Arc::new(CliRunner::new(CliRunnerOptions::default()));
//! let sessions = SessionManager::new("us-east-1", AwsConfig::default(), runner.clone());
//! let resolver = CachedResolver::new(AwsResourceResolver::new(sessions));
//!
//! let mut engine = ForgeEngine::new(Box::new(resolver), runner);
//! let dir = Path::new("k8s");
//! let changes = engine.process_files(dir, &HashMap::new()).unwrap();
//! if let ApplyOutcome::Applied { .. } = engine.apply_changes(dir, &changes).unwrap() {
//!     println!("{}", engine.kustomize_build(dir, "").unwrap());
//! }
//! ```

pub mod engine;
pub mod error;
pub mod rollback;

pub use engine::{ApplyOutcome, BackupHook, EngineOptions, ForgeEngine};
pub use error::{CoreError, CoreResult};
pub use rollback::{
    BackupSnapshot, CleanupReport, RestoreReport, RollbackManager, BACKUP_DIR_NAME,
    BACKUP_TIMESTAMP_FORMAT, DEFAULT_KEEP_DAYS,
};
