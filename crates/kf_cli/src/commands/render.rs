//! Render command - Resolve resource references in one file.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use kf_policy::ManifestValidator;
use kf_templates::TemplateProcessor;
use tracing::info;

use super::GlobalArgs;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Template file containing `${aws:...}` references
    template: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip manifest validation of the result
    #[arg(long)]
    no_validate: bool,
}

pub fn execute(global: &GlobalArgs, args: &RenderArgs) -> Result<()> {
    info!("Rendering {:?}", args.template);

    let content = fs::read_to_string(&args.template)
        .with_context(|| format!("Failed to read template {}", args.template.display()))?;

    let runner = global.runner();
    let mut processor =
        TemplateProcessor::new(global.resolver(runner)).with_validator(Box::new(ManifestValidator::new()));
    let rendered = processor
        .process_template(&content, !args.no_validate)
        .with_context(|| format!("Failed to render {}", args.template.display()))?;

    match &args.output {
        Some(path) => {
            fs::write(path, &rendered).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✅ Rendered {} → {}", args.template.display(), path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
