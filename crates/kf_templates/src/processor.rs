//! File-level template processing.

use std::fs;
use std::path::{Path, PathBuf};

use kf_aws::ResourceResolver;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::diff::FileChange;
use crate::error::{TemplateError, TemplateResult};
use crate::renderer::TemplateRenderer;

/// Suffix marking a template file.
pub const TEMPLATE_SUFFIX: &str = ".template";

/// Manifest template suffixes picked up by directory discovery.
pub const MANIFEST_TEMPLATE_SUFFIXES: [&str; 2] = [".yaml.template", ".yml.template"];

/// Structural check applied to processed content.
pub trait ContentValidator: Send + Sync {
    /// Human-readable problems; empty when the content is acceptable.
    fn validate(&self, content: &str) -> Vec<String>;
}

/// Whether `path` names a hidden manifest template such as `.app.yaml.template`.
pub fn is_manifest_template(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| {
            name.starts_with('.') && MANIFEST_TEMPLATE_SUFFIXES.iter().any(|s| name.ends_with(s))
        })
        .unwrap_or(false)
}

/// Output path for a hidden template: `dir/.app.yaml.template` -> `dir/app.yaml`.
pub fn output_path_for(template: &Path) -> Option<PathBuf> {
    let name = template.file_name()?.to_str()?;
    let stripped = name.strip_suffix(TEMPLATE_SUFFIX)?.trim_start_matches('.');
    if stripped.is_empty() {
        return None;
    }
    Some(template.with_file_name(stripped))
}

/// Find hidden manifest templates under `dir`, sorted by path.
pub fn discover_templates(dir: &Path) -> Vec<PathBuf> {
    let templates: Vec<PathBuf> = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_manifest_template(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();
    debug!("Found {} template(s) under {:?}", templates.len(), dir);
    templates
}

/// Rewrites `${aws:...}` references in template files.
pub struct TemplateProcessor {
    renderer: TemplateRenderer,
    resolver: Box<dyn ResourceResolver>,
    validator: Option<Box<dyn ContentValidator>>,
}

impl TemplateProcessor {
    pub fn new(resolver: Box<dyn ResourceResolver>) -> Self {
        Self {
            renderer: TemplateRenderer::new(),
            resolver,
            validator: None,
        }
    }

    /// Validator run by [`process_template`](Self::process_template) when asked.
    pub fn with_validator(mut self, validator: Box<dyn ContentValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn resolver(&self) -> &dyn ResourceResolver {
        self.resolver.as_ref()
    }

    /// Rewrite references in `content`, then optionally validate the result.
    pub fn process_template(&mut self, content: &str, validate: bool) -> TemplateResult<String> {
        let processed = self
            .renderer
            .substitute_references(content, self.resolver.as_mut());

        if validate {
            if let Some(validator) = &self.validator {
                let errors = validator.validate(&processed);
                if !errors.is_empty() {
                    return Err(TemplateError::ValidationFailed(errors));
                }
            }
        }

        Ok(processed)
    }

    /// Read and process one template file, validating the result.
    pub fn process_file(&mut self, path: &Path) -> TemplateResult<String> {
        if !path.is_file() {
            return Err(TemplateError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        self.process_template(&content, true)
    }

    /// Process several templates into pending changes.
    ///
    /// Each output path is the template path without its `.template`
    /// suffix; the original content is the current output file, or empty
    /// when it does not exist yet.
    pub fn process_templates(&mut self, paths: &[PathBuf]) -> TemplateResult<Vec<FileChange>> {
        let mut changes = Vec::with_capacity(paths.len());
        for template_path in paths {
            let output_path = strip_template_suffix(template_path)
                .ok_or_else(|| TemplateError::InvalidTemplateName(template_path.clone()))?;

            let original_content = if output_path.exists() {
                fs::read_to_string(&output_path)?
            } else {
                String::new()
            };

            let processed_content = self.process_file(template_path)?;
            info!("Processed {:?} -> {:?}", template_path, output_path);

            changes.push(FileChange::new(
                template_path.clone(),
                output_path,
                original_content,
                processed_content,
            ));
        }
        Ok(changes)
    }
}

fn strip_template_suffix(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let stripped = name.strip_suffix(TEMPLATE_SUFFIX)?;
    if stripped.is_empty() {
        return None;
    }
    Some(path.with_file_name(stripped))
}
