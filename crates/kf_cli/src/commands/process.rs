//! Process command - Render every template in a directory.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use kf_core::{ApplyOutcome, EngineOptions, ForgeEngine, DEFAULT_KEEP_DAYS};
use kf_policy::ManifestValidator;
use kf_templates::DiffFormatter;
use tracing::{info, warn};

use super::GlobalArgs;

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Directory containing hidden `.name.yaml.template` files
    #[arg(short, long)]
    dir: PathBuf,

    /// Show a unified diff for every template (always shown without --apply)
    #[arg(long)]
    diff: bool,

    /// Write the rendered manifests and run `kustomize build`
    #[arg(long)]
    apply: bool,

    /// Template variable as key=value (repeatable)
    #[arg(short = 'v', long = "var", value_name = "KEY=VALUE")]
    vars: Vec<String>,

    /// Extra arguments passed to `kustomize build`
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    kustomize_args: String,

    /// Write without validating the rendered manifests
    #[arg(long)]
    skip_validation: bool,

    /// Also dry-run manifests against the cluster; its warnings block apply
    #[arg(long)]
    cluster_validate: bool,

    /// Remove backups older than seven days before processing
    #[arg(long)]
    cleanup_backups: bool,
}

pub fn execute(global: &GlobalArgs, args: &ProcessArgs) -> Result<()> {
    info!("Processing templates in {:?}", args.dir);

    if !args.dir.is_dir() {
        anyhow::bail!("Directory not found: {}", args.dir.display());
    }

    let runner = global.runner();
    let mut validator = ManifestValidator::new();
    if args.cluster_validate {
        validator = validator.with_cluster(runner.clone());
    }
    let options = EngineOptions::new()
        .skip_validation(args.skip_validation)
        .warnings_block(args.cluster_validate);
    let mut engine = ForgeEngine::new(global.resolver(runner.clone()), runner)
        .with_validator(validator)
        .with_options(options)
        .with_backup_hook(crate::interrupt::record_backup);

    if args.cleanup_backups {
        let report = engine.cleanup_backups(&args.dir, DEFAULT_KEEP_DAYS);
        println!("🧹 Removed {} old backup(s)", report.removed.len());
        for (path, error) in &report.failed {
            println!("   ⚠️  {}: {}", path.display(), error);
        }
    }

    let variables = parse_variables(&args.vars);
    let changes = engine
        .process_files(&args.dir, &variables)
        .context("Failed to process templates")?;

    if changes.is_empty() {
        println!("⚠️  No template files found in {}", args.dir.display());
        return Ok(());
    }

    let formatter = DiffFormatter::new().with_base_dir(&args.dir);
    println!("{}", formatter.summarize_changes(&changes));
    if shows_diff(args) {
        println!("{}", formatter.render_changes(&changes));
    }

    if !args.apply {
        println!("ℹ️  Dry run, pass --apply to write the manifests");
        return Ok(());
    }

    match engine
        .apply_changes(&args.dir, &changes)
        .context("Failed to apply changes")?
    {
        ApplyOutcome::Applied { written, backup_dir } => {
            println!("💾 Backup saved to {}", backup_dir.display());
            for path in &written {
                println!("   ✅ {}", path.display());
            }
        }
        ApplyOutcome::Rejected(report) => {
            println!("❌ Validation failed, no files were written:\n");
            println!("{}", report);
            anyhow::bail!(
                "validation failed with {} error(s) and {} warning(s)",
                report.error_count(),
                report.warning_count()
            );
        }
        ApplyOutcome::RolledBack { error, restore } => {
            println!("↩️  Restored {} file(s) from {}", restore.restored.len(), restore.backup_dir.display());
            for (path, reason) in &restore.failed {
                println!("   ❌ Could not restore {}: {}", path.display(), reason);
            }
            anyhow::bail!("failed to write manifests: {}", error);
        }
    }

    println!("\n🔨 Running kustomize build...\n");
    let output = engine
        .kustomize_build(&args.dir, &args.kustomize_args)
        .context("kustomize build failed")?;
    println!("{}", output);

    Ok(())
}

/// Diffs are shown on request and for every dry run.
fn shows_diff(args: &ProcessArgs) -> bool {
    args.diff || !args.apply
}

/// Parse `key=value` assignments, skipping malformed entries.
fn parse_variables(assignments: &[String]) -> HashMap<String, String> {
    let mut variables = HashMap::new();
    for assignment in assignments {
        match assignment.split_once('=') {
            Some((key, value)) => {
                variables.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => warn!("Ignoring variable without '=': {}", assignment),
        }
    }
    variables
}
