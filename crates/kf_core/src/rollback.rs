//! Backup and rollback of manifests around a batch of writes.
//!
//! A backup captures every manifest under a directory twice: in memory for
//! restoration and on disk under `<dir>/.kustomize-backup/<YYYYMMDD_HHMMSS>/`
//! for manual recovery. On-disk copies are only removed by [`RollbackManager::cleanup`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{CoreError, CoreResult};

/// Directory, relative to the target, holding on-disk backups.
pub const BACKUP_DIR_NAME: &str = ".kustomize-backup";

/// Name format of each backup subdirectory.
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Default retention for [`RollbackManager::cleanup`].
pub const DEFAULT_KEEP_DAYS: i64 = 7;

/// Original manifest contents captured before a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BackupSnapshot {
    pub backup_dir: PathBuf,
    pub created_at: DateTime<Local>,
    pub entries: BTreeMap<PathBuf, String>,
}

impl BackupSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }
}

/// Per-file outcome of a restore.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RestoreReport {
    pub restored: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
    pub backup_dir: PathBuf,
}

impl RestoreReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of removing old backups.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

fn is_backed_up(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    !name.starts_with('.') && (name.ends_with(".yaml") || name.ends_with(".yml"))
}

/// Snapshots manifests and restores them on failure.
#[derive(Debug, Default)]
pub struct RollbackManager {
    snapshot: Option<BackupSnapshot>,
}

impl RollbackManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current snapshot, if a backup has been taken.
    pub fn snapshot(&self) -> Option<&BackupSnapshot> {
        self.snapshot.as_ref()
    }

    /// Capture every visible `.yaml` / `.yml` file under `dir`.
    ///
    /// The snapshot replaces the previous one only once every file has been
    /// read and copied; any failure leaves the manager unchanged.
    pub fn backup(&mut self, dir: &Path) -> CoreResult<&BackupSnapshot> {
        if !dir.is_dir() {
            return Err(CoreError::DirectoryNotFound(dir.to_path_buf()));
        }

        let created_at = Local::now();
        let backup_dir = dir
            .join(BACKUP_DIR_NAME)
            .join(created_at.format(BACKUP_TIMESTAMP_FORMAT).to_string());
        fs::create_dir_all(&backup_dir)?;

        let mut entries = BTreeMap::new();
        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.file_name() != BACKUP_DIR_NAME);

        for entry in walker {
            let entry = entry.map_err(|e| CoreError::BackupFailed {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_backed_up(path) {
                continue;
            }

            let content = fs::read_to_string(path).map_err(|e| CoreError::BackupFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

            let relative = path.strip_prefix(dir).unwrap_or(path);
            let target = backup_dir.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, &content).map_err(|e| CoreError::BackupFailed {
                path: target.clone(),
                message: e.to_string(),
            })?;

            debug!("Backed up {:?}", path);
            entries.insert(path.to_path_buf(), content);
        }

        info!("Backed up {} manifest(s) to {:?}", entries.len(), backup_dir);
        let snapshot = self.snapshot.insert(BackupSnapshot {
            backup_dir,
            created_at,
            entries,
        });
        Ok(&*snapshot)
    }

    /// Rewrite every snapshotted file with its original content.
    ///
    /// Best effort: each file is attempted and reported. Calling it again
    /// rewrites the same content. The on-disk backup is left in place.
    pub fn restore(&self) -> CoreResult<RestoreReport> {
        let snapshot = self.snapshot.as_ref().ok_or(CoreError::NoBackup)?;
        let mut report = RestoreReport {
            backup_dir: snapshot.backup_dir.clone(),
            ..Default::default()
        };

        info!("Rolling back {} manifest(s)", snapshot.len());
        for (path, content) in &snapshot.entries {
            match fs::write(path, content) {
                Ok(()) => {
                    debug!("Restored {:?}", path);
                    report.restored.push(path.clone());
                }
                Err(e) => {
                    warn!("Failed to restore {:?}: {}", path, e);
                    report.failed.push((path.clone(), e.to_string()));
                }
            }
        }
        info!("Backup preserved in {:?}", snapshot.backup_dir);
        Ok(report)
    }

    /// Delete backup directories under `dir` older than `keep_days`.
    ///
    /// Age comes from the directory's timestamp name, falling back to its
    /// modification time. Failures are logged and reported per directory.
    pub fn cleanup(dir: &Path, keep_days: i64) -> CleanupReport {
        let mut report = CleanupReport::default();
        let root = dir.join(BACKUP_DIR_NAME);
        let entries = match fs::read_dir(&root) {
            Ok(entries) => entries,
            Err(_) => return report,
        };

        let cutoff = Local::now().naive_local() - Duration::days(keep_days);
        for entry in entries.filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(created) = backup_time(&path) else {
                continue;
            };
            if created >= cutoff {
                continue;
            }

            match fs::remove_dir_all(&path) {
                Ok(()) => {
                    info!("Removed old backup {:?}", path);
                    report.removed.push(path);
                }
                Err(e) => {
                    warn!("Failed to clean up {:?}: {}", path, e);
                    report.failed.push((path, e.to_string()));
                }
            }
        }
        report
    }
}

fn backup_time(path: &Path) -> Option<NaiveDateTime> {
    let from_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|name| NaiveDateTime::parse_from_str(name, BACKUP_TIMESTAMP_FORMAT).ok());
    from_name.or_else(|| {
        let modified = fs::metadata(path).and_then(|m| m.modified()).ok()?;
        Some(DateTime::<Local>::from(modified).naive_local())
    })
}
