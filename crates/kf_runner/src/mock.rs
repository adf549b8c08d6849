//! Mock command runner for testing.
//!
//! Provides a configurable implementation of the [`CommandRunner`] trait for
//! use in unit tests without requiring `aws`, `kubectl` or `kustomize`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;

use crate::config::CommandSpec;
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandRunner, ExecutionResult};

/// Predefined mock response for a command execution.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i64,
    pub stdout: String,
    pub stderr: String,
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(exit_code: i64, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Attach stderr output to an otherwise successful response.
    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }
}

/// Captured call information for verification.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub stdin: Option<String>,
}

impl CapturedCall {
    /// The call rendered as `program arg1 arg2 ...`.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Mock command runner for testing.
///
/// Responses are matched by command-line prefix first (most recently added
/// route wins); unmatched calls cycle through the sequential response list,
/// and fall back to an empty success.
#[derive(Clone)]
pub struct MockRunner {
    /// Programs reported as available; `None` means every program is.
    available: Arc<RwLock<Option<Vec<String>>>>,
    /// Responses keyed by command-line prefix.
    routes: Arc<RwLock<Vec<(String, MockResponse)>>>,
    /// Sequential responses for unmatched calls.
    responses: Arc<RwLock<Vec<MockResponse>>>,
    /// Index of next sequential response.
    response_index: Arc<AtomicUsize>,
    /// Captured calls for verification.
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
    /// Simulated failure to return (as a string message for ExecutionFailed).
    simulate_failure: Arc<RwLock<Option<String>>>,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            available: Arc::new(RwLock::new(None)),
            routes: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(Vec::new())),
            response_index: Arc::new(AtomicUsize::new(0)),
            captured_calls: Arc::new(RwLock::new(Vec::new())),
            simulate_failure: Arc::new(RwLock::new(None)),
        }
    }

    /// Restrict the set of programs reported as available.
    pub fn with_available(self, programs: &[&str]) -> Self {
        *self.available.write() = Some(programs.iter().map(|p| p.to_string()).collect());
        self
    }

    /// Respond to any call whose command line starts with `prefix`.
    pub fn on(self, prefix: impl Into<String>, response: MockResponse) -> Self {
        self.routes.write().push((prefix.into(), response));
        self
    }

    /// Add a sequential response for unmatched calls.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push(response);
        self
    }

    /// Set a failure to simulate.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some(message.into());
        self
    }

    /// Clear all captured calls.
    pub fn clear_calls(&self) {
        self.captured_calls.write().clear();
    }

    /// Get all captured calls.
    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    /// Count calls whose command line starts with `prefix`.
    pub fn count_matching(&self, prefix: &str) -> usize {
        self.captured_calls
            .read()
            .iter()
            .filter(|c| c.command_line().starts_with(prefix))
            .count()
    }

    fn next_response(&self, command_line: &str) -> MockResponse {
        if let Some((_, response)) = self
            .routes
            .read()
            .iter()
            .rev()
            .find(|(prefix, _)| command_line.starts_with(prefix.as_str()))
        {
            return response.clone();
        }

        let responses = self.responses.read();
        if responses.is_empty() {
            return MockResponse::success("");
        }
        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        responses
            .get(index % responses.len())
            .cloned()
            .unwrap_or_else(|| MockResponse::success(""))
    }
}

impl CommandRunner for MockRunner {
    fn is_available(&self, program: &str) -> bool {
        match &*self.available.read() {
            Some(programs) => programs.iter().any(|p| p == program),
            None => true,
        }
    }

    fn run(&self, spec: &CommandSpec) -> RunnerResult<ExecutionResult> {
        let call = CapturedCall {
            program: spec.program.clone(),
            args: spec.args.clone(),
            env: spec.env.clone(),
            stdin: spec.stdin.clone(),
        };
        let command_line = call.command_line();
        self.captured_calls.write().push(call);

        if let Some(msg) = self.simulate_failure.read().clone() {
            return Err(RunnerError::ExecutionFailed(msg));
        }

        let response = self.next_response(&command_line);
        let now = Utc::now();
        Ok(ExecutionResult {
            exit_code: response.exit_code,
            stdout: response.stdout,
            stderr: response.stderr,
            started_at: now,
            finished_at: now,
            duration_ms: 0,
        })
    }
}
