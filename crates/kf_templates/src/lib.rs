//! # kf_templates
//!
//! Template processing for kustforge.
//!
//! - [`TemplateRenderer`]: single-pass `{{ ... }}` / `${aws:...}` substitution
//! - [`TemplateProcessor`]: file-level `${aws:...}` processing into [`FileChange`]s
//! - [`DiffFormatter`]: unified diffs and change summaries
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use kf_aws::{AwsConfig, AwsResourceResolver, SessionManager};
//! use kf_runner::{CliRunner, CliRunnerOptions};
//! use kf_templates::TemplateRenderer;
//!
//! let runner = Arc::new(CliRunner::new(CliRunnerOptions::default()));
//! let sessions = SessionManager::new("us-east-1", AwsConfig::default(), runner);
//! let mut resolver = AwsResourceResolver::new(sessions);
//!
//! let mut variables = HashMap::new();
//! variables.insert("env".to_string(), "prod".to_string());
//!
//! let renderer = TemplateRenderer::new();
//! let text = renderer.substitute(
//!     "env: {{ env }}\nimage: {{ aws:ecr:name=myapp }}",
//!     &variables,
//!     &mut resolver,
//! );
//! ```

pub mod diff;
pub mod error;
pub mod processor;
pub mod renderer;

pub use diff::{DiffFormatter, FileChange};
pub use error::{TemplateError, TemplateResult};
pub use processor::{
    discover_templates, is_manifest_template, output_path_for, ContentValidator, TemplateProcessor,
};
pub use renderer::TemplateRenderer;
