//! Process-backed command runner.
//!
//! Runs external binaries with `std::process::Command`, feeding stdin from a
//! helper thread and draining stdout/stderr concurrently so large outputs
//! cannot dead-lock the child.

use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info};

use crate::config::CommandSpec;
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandRunner, ExecutionResult};

/// CLI runner options.
#[derive(Debug, Clone, Default)]
pub struct CliRunnerOptions {
    /// Dry-run mode (log commands without executing)
    pub dry_run: bool,
    /// Timeout applied when a command does not set its own (0 = none)
    pub default_timeout_seconds: u64,
}

impl CliRunnerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn default_timeout(mut self, seconds: u64) -> Self {
        self.default_timeout_seconds = seconds;
        self
    }
}

/// Runner that executes commands as local child processes.
#[derive(Debug, Clone, Default)]
pub struct CliRunner {
    options: CliRunnerOptions,
}

impl CliRunner {
    pub fn new(options: CliRunnerOptions) -> Self {
        Self { options }
    }

    /// Check if dry-run mode is enabled.
    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    fn effective_timeout(&self, spec: &CommandSpec) -> u64 {
        if spec.timeout_seconds > 0 {
            spec.timeout_seconds
        } else {
            self.options.default_timeout_seconds
        }
    }

    fn execute(&self, spec: &CommandSpec) -> RunnerResult<(i64, String, String)> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .envs(&spec.env)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if spec.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });
        if let Some(dir) = &spec.workdir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RunnerError::ProgramNotAvailable(spec.program.clone())
            } else {
                RunnerError::ExecutionFailed(format!("Failed to spawn {}: {}", spec.program, e))
            }
        })?;

        let stdin_handle = match (child.stdin.take(), spec.stdin.clone()) {
            (Some(mut pipe), Some(input)) => Some(std::thread::spawn(move || {
                // The child may exit without reading everything; a broken pipe is not ours to report.
                let _ = pipe.write_all(input.as_bytes());
            })),
            _ => None,
        };

        let stdout_handle = child.stdout.take().map(|mut out| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = out.read_to_string(&mut buf);
                buf
            })
        });
        let stderr_handle = child.stderr.take().map(|mut err| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = err.read_to_string(&mut buf);
                buf
            })
        });

        let timeout_seconds = self.effective_timeout(spec);
        let status = if timeout_seconds > 0 {
            let timeout = Duration::from_secs(timeout_seconds);
            let start = Instant::now();
            loop {
                match child.try_wait() {
                    Ok(Some(status)) => break status,
                    Ok(None) => {
                        if start.elapsed() > timeout {
                            let _ = child.kill();
                            let _ = child.wait();
                            return Err(RunnerError::Timeout(timeout_seconds));
                        }
                        std::thread::sleep(Duration::from_millis(50));
                    }
                    Err(e) => {
                        return Err(RunnerError::ExecutionFailed(format!(
                            "Failed to wait for process: {}",
                            e
                        )));
                    }
                }
            }
        } else {
            child.wait().map_err(|e| {
                RunnerError::ExecutionFailed(format!("Failed to wait for process: {}", e))
            })?
        };

        if let Some(handle) = stdin_handle {
            let _ = handle.join();
        }
        let stdout = stdout_handle
            .and_then(|h| h.join().ok())
            .unwrap_or_default();
        let stderr = stderr_handle
            .and_then(|h| h.join().ok())
            .unwrap_or_default();

        Ok((status.code().unwrap_or(-1) as i64, stdout, stderr))
    }
}

impl CommandRunner for CliRunner {
    fn is_available(&self, program: &str) -> bool {
        Command::new(program)
            .arg("--help")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    fn run(&self, spec: &CommandSpec) -> RunnerResult<ExecutionResult> {
        let started_at = Utc::now();

        if self.options.dry_run {
            info!("[DRY-RUN] Would execute: {}", spec.command_line());
            return Ok(ExecutionResult {
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
                started_at,
                finished_at: started_at,
                duration_ms: 0,
            });
        }

        debug!("Executing: {}", spec.command_line());
        let start = Instant::now();
        let (exit_code, stdout, stderr) = self.execute(spec)?;
        let duration_ms = start.elapsed().as_millis() as u64;

        debug!(exit_code, duration_ms, "Command finished: {}", spec.program);

        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
            started_at,
            finished_at: Utc::now(),
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_skips_execution() {
        let runner = CliRunner::new(CliRunnerOptions::new().dry_run());
        let spec = CommandSpec::new("definitely-not-a-real-binary-kf").arg("--oops");

        let result = runner.run(&spec).unwrap();
        assert!(result.success());
        assert!(result.stdout.is_empty());
        assert!(runner.is_dry_run());
    }

    #[test]
    fn test_missing_program_is_reported() {
        let runner = CliRunner::default();
        let spec = CommandSpec::new("definitely-not-a-real-binary-kf");

        let err = runner.run(&spec).unwrap_err();
        assert!(matches!(err, RunnerError::ProgramNotAvailable(_)));
        assert!(!runner.is_available("definitely-not-a-real-binary-kf"));
    }

    #[cfg(unix)]
    #[test]
    fn test_stdin_is_forwarded() {
        let runner = CliRunner::default();
        let spec = CommandSpec::new("cat").stdin("kind: Pod\n");

        let result = runner.run(&spec).unwrap();
        assert!(result.success());
        assert_eq!(result.stdout, "kind: Pod\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_not_an_error() {
        let runner = CliRunner::default();
        let spec = CommandSpec::new("sh").args(["-c", "echo boom >&2; exit 3"]);

        let result = runner.run(&spec).unwrap();
        assert_eq!(result.exit_code, 3);
        assert_eq!(result.stderr.trim(), "boom");
        assert_eq!(result.combined_output().trim(), "boom");
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let runner = CliRunner::new(CliRunnerOptions::new().default_timeout(1));
        let spec = CommandSpec::new("sleep").arg("5");

        let err = runner.run(&spec).unwrap_err();
        assert!(matches!(err, RunnerError::Timeout(1)));
    }
}
