//! Validate command - Check a manifest file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use kf_policy::ManifestValidator;
use tracing::info;

use super::GlobalArgs;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Manifest file to validate
    file: PathBuf,

    /// Also dry-run the manifest against the cluster with kubectl
    #[arg(long)]
    cluster: bool,
}

pub fn execute(global: &GlobalArgs, args: &ValidateArgs) -> Result<()> {
    info!("Validating {:?}", args.file);

    let mut validator = ManifestValidator::new();
    if args.cluster {
        validator = validator.with_cluster(global.runner());
    }

    let result = validator
        .validate_file(&args.file)
        .with_context(|| format!("Failed to validate {}", args.file.display()))?;

    for warning in &result.warnings {
        println!("   ⚠️  {}", warning);
    }

    if result.errors.is_empty() {
        println!("✅ {} is valid", args.file.display());
        return Ok(());
    }

    println!("❌ Validation failed for {}:", args.file.display());
    for error in &result.errors {
        println!("      - {}", error);
    }
    anyhow::bail!("validation failed with {} error(s)", result.errors.len())
}
