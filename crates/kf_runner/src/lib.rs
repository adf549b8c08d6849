//! # kf_runner
//!
//! External command execution for kustforge.
//!
//! Every collaborator kustforge talks to lives behind a binary on `PATH`:
//! the `aws` CLI for resource lookups and role assumption, `kubectl` for
//! server-side dry runs and `kustomize` for the final manifest build.
//! This crate runs those binaries synchronously and captures their output.
//!
//! # Features
//!
//! - **CommandRunner trait**: one seam for every subprocess call
//! - **CliRunner**: `std::process` backed runner with stdin and timeouts
//! - **Dry-Run Mode**: log commands without executing them
//! - **Mock Runner**: canned responses keyed by command prefix, for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use kf_runner::{CliRunner, CliRunnerOptions, CommandRunner, CommandSpec};
//!
//! let runner = CliRunner::new(CliRunnerOptions::default());
//! let spec = CommandSpec::new("kubectl")
//!     .args(["apply", "--dry-run=server", "-f", "-"])
//!     .stdin("apiVersion: v1\nkind: ConfigMap\n");
//!
//! let result = runner.run(&spec).unwrap();
//! println!("Exit code: {}", result.exit_code);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod mock;
pub mod runner;

pub use cli::{CliRunner, CliRunnerOptions};
pub use config::CommandSpec;
pub use error::{RunnerError, RunnerResult};
pub use mock::{CapturedCall, MockResponse, MockRunner};
pub use runner::{CommandRunner, ExecutionResult};
