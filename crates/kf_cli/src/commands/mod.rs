//! CLI command definitions.
//!
//! Each subcommand lives in its own module with an `Args` struct and an
//! `execute` function.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use kf_aws::{resolve_region, AwsConfig, AwsResourceResolver, CachedResolver, ResourceResolver, SessionManager};
use kf_runner::{CliRunner, CliRunnerOptions, CommandRunner};
use tracing::debug;

pub mod process;
pub mod render;
pub mod validate;

/// kustforge - render Kubernetes manifest templates with live AWS values
#[derive(Parser)]
#[command(name = "kustforge")]
#[command(version, about = "Render Kubernetes manifest templates with live AWS resource values")]
#[command(long_about = r#"
kustforge renders hidden manifest templates (.name.yaml.template) into
manifests, filling {{ variables }} and {{ aws:... }} / ${aws:...} resource
references from live AWS lookups, then validates, backs up, writes and
builds them with kustomize.

REFERENCES:
  aws:[role=<name>:]<type>:<key>=<value>[,<key>=<value>...]
  types: acm, alb, ecr, elasticache, rds, secret, waf

COMMANDS:
  process   → Render every template in a directory, diff, apply, build
  render    → Resolve ${aws:...} references in a single file
  validate  → Check a manifest file

EXIT CODES:
  0 - Success
  1 - Validation, apply or runtime failure
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// AWS region for lookups
    #[arg(long, global = true, env = "AWS_REGION")]
    pub aws_region: Option<String>,

    /// YAML file with role, account and profile mappings
    #[arg(long, global = true)]
    pub aws_config: Option<PathBuf>,

    /// Resolve every reference afresh instead of caching lookups
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Process-backed runner for `aws`, `kubectl` and `kustomize`.
    pub fn runner(&self) -> Arc<dyn CommandRunner> {
        Arc::new(CliRunner::new(CliRunnerOptions::default()))
    }

    /// Resolver pipeline built from the global options.
    pub fn resolver(&self, runner: Arc<dyn CommandRunner>) -> Box<dyn ResourceResolver> {
        let region = resolve_region(self.aws_region.as_deref());
        let config = AwsConfig::load(self.aws_config.as_deref());
        debug!(region = %region, cache = !self.no_cache, "Building resource resolver");

        let resolver = AwsResourceResolver::new(SessionManager::new(region, config, runner));
        if self.no_cache {
            Box::new(resolver)
        } else {
            Box::new(CachedResolver::new(resolver))
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render, diff and optionally apply every template in a directory
    Process(process::ProcessArgs),

    /// Resolve resource references in a single template file
    Render(render::RenderArgs),

    /// Validate a manifest file
    Validate(validate::ValidateArgs),
}
