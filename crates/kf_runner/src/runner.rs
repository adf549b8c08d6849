//! Command runner trait and types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::CommandSpec;
use crate::error::RunnerResult;

/// Result of a command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Exit code from the process (-1 when killed by a signal)
    pub exit_code: i64,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Execution start time
    pub started_at: DateTime<Utc>,
    /// Execution end time
    pub finished_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// Check if execution was successful (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Get combined output (stdout + stderr).
    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Command runner trait.
///
/// Implementations block until the command exits. A non-zero exit code is
/// reported through [`ExecutionResult::exit_code`], not as an error; errors
/// are reserved for failures to launch or supervise the process.
pub trait CommandRunner: Send + Sync {
    /// Check if a program can be launched.
    fn is_available(&self, program: &str) -> bool;

    /// Run a command to completion.
    fn run(&self, spec: &CommandSpec) -> RunnerResult<ExecutionResult>;
}
