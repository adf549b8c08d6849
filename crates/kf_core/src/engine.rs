//! Directory workflow: render templates, validate, back up, write, build.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kf_aws::ResourceResolver;
use kf_policy::{ManifestValidator, ValidationReport};
use kf_runner::{CommandRunner, CommandSpec};
use kf_templates::{discover_templates, output_path_for, FileChange, TemplateError, TemplateRenderer};
use tracing::{debug, error, info};

use crate::error::{CoreError, CoreResult};
use crate::rollback::{CleanupReport, RestoreReport, RollbackManager};

/// Engine settings.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Skip the validation gate before writing.
    pub skip_validation: bool,
    /// Treat validation warnings as blocking.
    pub warnings_block: bool,
    /// `kustomize` executable.
    pub kustomize_program: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            skip_validation: false,
            warnings_block: false,
            kustomize_program: "kustomize".to_string(),
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_validation(mut self, skip: bool) -> Self {
        self.skip_validation = skip;
        self
    }

    pub fn warnings_block(mut self, block: bool) -> Self {
        self.warnings_block = block;
        self
    }
}

/// Result of applying a batch.
#[derive(Debug)]
pub enum ApplyOutcome {
    /// Every output was written.
    Applied {
        written: Vec<PathBuf>,
        backup_dir: PathBuf,
    },
    /// Validation failed; nothing was written.
    Rejected(ValidationReport),
    /// A write failed and the backup was restored.
    RolledBack { error: String, restore: RestoreReport },
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }
}

/// Called with the backup directory once a backup has been written.
pub type BackupHook = Box<dyn Fn(&Path) + Send + Sync>;

/// Runs the template workflow over a directory.
pub struct ForgeEngine {
    renderer: TemplateRenderer,
    resolver: Box<dyn ResourceResolver>,
    validator: ManifestValidator,
    rollback: RollbackManager,
    runner: Arc<dyn CommandRunner>,
    options: EngineOptions,
    backup_hook: Option<BackupHook>,
}

impl ForgeEngine {
    pub fn new(resolver: Box<dyn ResourceResolver>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            renderer: TemplateRenderer::new(),
            resolver,
            validator: ManifestValidator::new(),
            rollback: RollbackManager::new(),
            runner,
            options: EngineOptions::default(),
            backup_hook: None,
        }
    }

    pub fn with_validator(mut self, validator: ManifestValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Notify `hook` of every backup directory before files are written.
    pub fn with_backup_hook(mut self, hook: impl Fn(&Path) + Send + Sync + 'static) -> Self {
        self.backup_hook = Some(Box::new(hook));
        self
    }

    pub fn rollback(&self) -> &RollbackManager {
        &self.rollback
    }

    /// Render every hidden manifest template under `dir`.
    ///
    /// Nothing is written. Each change records the template text as its
    /// original content.
    pub fn process_files(
        &mut self,
        dir: &Path,
        variables: &HashMap<String, String>,
    ) -> CoreResult<Vec<FileChange>> {
        if !dir.is_dir() {
            return Err(CoreError::DirectoryNotFound(dir.to_path_buf()));
        }

        let mut changes = Vec::new();
        for template in discover_templates(dir) {
            let output = output_path_for(&template)
                .ok_or_else(|| TemplateError::InvalidTemplateName(template.clone()))?;
            let content = fs::read_to_string(&template)?;
            let processed = self
                .renderer
                .substitute(&content, variables, self.resolver.as_mut());

            debug!("Rendered {:?} -> {:?}", template, output);
            changes.push(FileChange::new(template, output, content, processed));
        }

        info!("Processed {} template(s) in {:?}", changes.len(), dir);
        Ok(changes)
    }

    /// Run the validation gate over `changes`.
    pub fn validate_changes(&self, changes: &[FileChange]) -> ValidationReport {
        self.validator.validate_changes(changes)
    }

    /// Validate, back up `dir`, then write every change.
    ///
    /// A failed write restores the backup. A failed backup aborts before
    /// anything is written.
    pub fn apply_changes(&mut self, dir: &Path, changes: &[FileChange]) -> CoreResult<ApplyOutcome> {
        if !self.options.skip_validation {
            let report = self.validate_changes(changes);
            if !report.passed(self.options.warnings_block) {
                return Ok(ApplyOutcome::Rejected(report));
            }
        }

        let backup_dir = self.rollback.backup(dir)?.backup_dir.clone();
        if let Some(hook) = &self.backup_hook {
            hook(&backup_dir);
        }

        let mut written = Vec::with_capacity(changes.len());
        for change in changes {
            if let Err(e) = fs::write(&change.output_path, &change.processed_content) {
                error!("Error applying changes to {:?}: {}", change.output_path, e);
                let restore = self.rollback.restore()?;
                return Ok(ApplyOutcome::RolledBack {
                    error: format!("{}: {}", change.output_path.display(), e),
                    restore,
                });
            }
            written.push(change.output_path.clone());
        }

        info!("Wrote {} manifest(s)", written.len());
        Ok(ApplyOutcome::Applied { written, backup_dir })
    }

    /// Remove backups under `dir` older than `keep_days`.
    pub fn cleanup_backups(&self, dir: &Path, keep_days: i64) -> CleanupReport {
        RollbackManager::cleanup(dir, keep_days)
    }

    /// Run `kustomize build <dir> <extra args>` and return its output.
    pub fn kustomize_build(&self, dir: &Path, extra_args: &str) -> CoreResult<String> {
        let spec = CommandSpec::new(&self.options.kustomize_program)
            .arg("build")
            .arg(dir.to_string_lossy())
            .args(extra_args.split_whitespace());

        info!("Running {}", spec.command_line());
        let result = self.runner.run(&spec)?;
        if !result.success() {
            return Err(CoreError::KustomizeFailed(result.stderr.trim().to_string()));
        }
        Ok(result.stdout)
    }
}
