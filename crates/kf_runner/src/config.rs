//! Command configuration types.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A single external command invocation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Program to execute (resolved through `PATH`)
    pub program: String,
    /// Arguments passed to the program
    pub args: Vec<String>,
    /// Extra environment variables
    pub env: BTreeMap<String, String>,
    /// Content written to the child's stdin
    pub stdin: Option<String>,
    /// Working directory
    pub workdir: Option<PathBuf>,
    /// Timeout in seconds (0 = no timeout)
    pub timeout_seconds: u64,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Render the invocation as a single shell-like line for logs and matching.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            if arg.contains(' ') {
                line.push_str(&format!(" '{}'", arg));
            } else {
                line.push(' ');
                line.push_str(arg);
            }
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_quotes_spaces() {
        let spec = CommandSpec::new("aws")
            .args(["secretsmanager", "get-secret-value"])
            .arg("--secret-id")
            .arg("my secret");

        assert_eq!(
            spec.command_line(),
            "aws secretsmanager get-secret-value --secret-id 'my secret'"
        );
    }

    #[test]
    fn test_builder_collects_env() {
        let spec = CommandSpec::new("aws")
            .env("AWS_REGION", "eu-west-1")
            .envs([("AWS_PROFILE", "staging")])
            .timeout(30);

        assert_eq!(spec.env.get("AWS_REGION").map(String::as_str), Some("eu-west-1"));
        assert_eq!(spec.env.get("AWS_PROFILE").map(String::as_str), Some("staging"));
        assert_eq!(spec.timeout_seconds, 30);
    }
}
