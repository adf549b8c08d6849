//! Ctrl-C handling.
//!
//! An interrupt exits with status 1 and points at the backup taken for the
//! batch being written, if any.

use std::path::{Path, PathBuf};

use parking_lot::{const_mutex, Mutex};
use tracing::warn;

static ACTIVE_BACKUP: Mutex<Option<PathBuf>> = const_mutex(None);

/// Remember the backup of the batch currently being applied.
pub fn record_backup(dir: &Path) {
    *ACTIVE_BACKUP.lock() = Some(dir.to_path_buf());
}

/// Install the process-wide Ctrl-C handler.
pub fn install() {
    let result = ctrlc::set_handler(|| {
        let backup = ACTIVE_BACKUP.lock().clone();
        warn!("Operation cancelled by user");
        eprintln!("\n{}", cancellation_message(backup.as_deref()));
        std::process::exit(1);
    });
    if let Err(e) = result {
        warn!("Failed to install interrupt handler: {}", e);
    }
}

fn cancellation_message(backup: Option<&Path>) -> String {
    match backup {
        Some(dir) => format!(
            "⚠️  Operation cancelled by user. Backup preserved in {}",
            dir.display()
        ),
        None => "⚠️  Operation cancelled by user".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_message_names_backup() {
        assert_eq!(cancellation_message(None), "⚠️  Operation cancelled by user");

        let dir = Path::new("k8s/.kustomize-backup/20240102_030405");
        assert_eq!(
            cancellation_message(Some(dir)),
            "⚠️  Operation cancelled by user. Backup preserved in k8s/.kustomize-backup/20240102_030405"
        );
    }

    #[test]
    fn test_record_backup_replaces_previous() {
        record_backup(Path::new("a/.kustomize-backup/1"));
        record_backup(Path::new("b/.kustomize-backup/2"));
        assert_eq!(
            ACTIVE_BACKUP.lock().as_deref(),
            Some(Path::new("b/.kustomize-backup/2"))
        );
    }
}
