//! Structural and cluster-side manifest checks.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use kf_runner::{CommandRunner, CommandSpec};
use kf_templates::{ContentValidator, FileChange, TemplateRenderer};
use serde_yaml::Value;
use tracing::{debug, info};

use crate::error::{PolicyError, PolicyResult};
use crate::report::{ChangeValidation, ValidationReport};

/// Top-level keys every deployable manifest carries.
pub const REQUIRED_FIELDS: [&str; 3] = ["apiVersion", "kind", "metadata"];

/// Validates processed manifests.
///
/// Structural checks are always available. Cluster checks pipe the manifest
/// to `kubectl apply --dry-run=server` and need a runner.
pub struct ManifestValidator {
    runner: Option<Arc<dyn CommandRunner>>,
    kubectl: String,
    renderer: TemplateRenderer,
}

impl Default for ManifestValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestValidator {
    /// Validator with structural checks only.
    pub fn new() -> Self {
        Self {
            runner: None,
            kubectl: "kubectl".to_string(),
            renderer: TemplateRenderer::new(),
        }
    }

    /// Enable cluster checks through `runner`.
    pub fn with_cluster(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    /// Use a different `kubectl` executable.
    pub fn with_kubectl(mut self, program: impl Into<String>) -> Self {
        self.kubectl = program.into();
        self
    }

    pub fn cluster_enabled(&self) -> bool {
        self.runner.is_some()
    }

    /// Structural problems with `content`; empty when it is a usable manifest.
    pub fn validate_manifest(&self, content: &str) -> Vec<String> {
        if content.trim().is_empty() {
            return vec!["Empty YAML document".to_string()];
        }
        let document: Value = match serde_yaml::from_str(content) {
            Ok(document) => document,
            Err(e) => return vec![format!("Invalid YAML syntax: {}", e)],
        };

        if is_empty_document(&document) {
            return vec!["Empty YAML document".to_string()];
        }
        let Some(mapping) = document.as_mapping() else {
            return vec!["Top-level YAML must be a mapping".to_string()];
        };

        let mut errors = Vec::new();
        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| !mapping.contains_key(*field))
            .collect();
        if !missing.is_empty() {
            errors.push(format!("Missing required fields: {}", missing.join(", ")));
        }

        if let Some(metadata) = mapping.get("metadata") {
            match metadata.as_mapping() {
                None => errors.push("metadata must be a mapping".to_string()),
                Some(metadata) if !metadata.contains_key("name") => {
                    errors.push("metadata.name is required".to_string())
                }
                Some(_) => {}
            }
        }

        errors
    }

    /// Warnings from a server-side dry run.
    ///
    /// A non-zero exit, any stderr output or a failure to run `kubectl` is
    /// reported; none of them is an error. Without a runner nothing is
    /// checked.
    pub fn validate_against_cluster(&self, content: &str) -> Vec<String> {
        let Some(runner) = &self.runner else {
            return Vec::new();
        };

        let spec = CommandSpec::new(&self.kubectl)
            .args(["apply", "--dry-run=server", "-f", "-"])
            .stdin(content);

        match runner.run(&spec) {
            Ok(result) if !result.success() => {
                vec![format!("Cluster validation failed: {}", result.stderr.trim())]
            }
            Ok(result) if !result.stderr.trim().is_empty() => {
                vec![format!("Cluster validation warning: {}", result.stderr.trim())]
            }
            Ok(_) => Vec::new(),
            Err(e) => vec![format!("Cluster validation error: {}", e)],
        }
    }

    /// Warnings for resource references still present in `content`.
    pub fn unresolved_warnings(&self, content: &str) -> Vec<String> {
        self.renderer
            .unresolved_references(content)
            .into_iter()
            .map(|placeholder| format!("Unresolved resource reference: {}", placeholder))
            .collect()
    }

    /// Validate one manifest file on disk.
    pub fn validate_file(&self, path: &Path) -> PolicyResult<ChangeValidation> {
        if !path.is_file() {
            return Err(PolicyError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Ok(self.check(path, &content))
    }

    /// Validate every manifest among `changes`.
    ///
    /// Only `.yaml` / `.yml` outputs are checked.
    pub fn validate_changes(&self, changes: &[FileChange]) -> ValidationReport {
        let mut report = ValidationReport::new();
        for change in changes {
            if !is_manifest_path(&change.output_path) {
                debug!("Skipping validation of {:?}", change.output_path);
                continue;
            }
            report.add(self.check(&change.output_path, &change.processed_content));
        }
        info!(
            "Validated {} manifest(s): {} error(s), {} warning(s)",
            report.entries().len(),
            report.error_count(),
            report.warning_count()
        );
        report
    }

    fn check(&self, path: &Path, content: &str) -> ChangeValidation {
        let mut entry = ChangeValidation::new(path);
        for error in self.validate_manifest(content) {
            entry.add_error(error);
        }
        for warning in self
            .unresolved_warnings(content)
            .into_iter()
            .chain(self.validate_against_cluster(content))
        {
            entry.add_warning(warning);
        }
        entry
    }
}

impl ContentValidator for ManifestValidator {
    fn validate(&self, content: &str) -> Vec<String> {
        self.validate_manifest(content)
    }
}

fn is_empty_document(document: &Value) -> bool {
    match document {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Sequence(s) => s.is_empty(),
        Value::Mapping(m) => m.is_empty(),
        _ => false,
    }
}

fn is_manifest_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use kf_runner::{MockResponse, MockRunner};

    const VALID: &str = "apiVersion: v1\nkind: Service\nmetadata:\n  name: web\n";

    #[test]
    fn test_valid_manifest() {
        assert!(ManifestValidator::new().validate_manifest(VALID).is_empty());
    }

    #[test]
    fn test_empty_and_non_mapping() {
        let validator = ManifestValidator::new();
        assert_eq!(validator.validate_manifest(""), vec!["Empty YAML document"]);
        assert_eq!(validator.validate_manifest("{}"), vec!["Empty YAML document"]);
        assert_eq!(
            validator.validate_manifest("- a\n- b\n"),
            vec!["Top-level YAML must be a mapping"]
        );
    }

    #[test]
    fn test_invalid_yaml() {
        let errors = ManifestValidator::new().validate_manifest("key: [unclosed\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Invalid YAML syntax:"));
    }

    #[test]
    fn test_missing_fields_and_metadata() {
        let validator = ManifestValidator::new();
        assert_eq!(
            validator.validate_manifest("kind: Service\n"),
            vec!["Missing required fields: apiVersion, metadata"]
        );
        assert_eq!(
            validator.validate_manifest("apiVersion: v1\nkind: Service\nmetadata: web\n"),
            vec!["metadata must be a mapping"]
        );
        assert_eq!(
            validator.validate_manifest("apiVersion: v1\nkind: Service\nmetadata:\n  labels: {}\n"),
            vec!["metadata.name is required"]
        );
    }

    #[test]
    fn test_cluster_check_pipes_manifest() {
        let runner = MockRunner::new().on("kubectl apply", MockResponse::success("service/web created (server dry run)"));
        let validator = ManifestValidator::new().with_cluster(Arc::new(runner.clone()));

        assert!(validator.validate_against_cluster(VALID).is_empty());
        let call = &runner.get_calls()[0];
        assert_eq!(call.command_line(), "kubectl apply --dry-run=server -f -");
        assert_eq!(call.stdin.as_deref(), Some(VALID));
    }

    #[test]
    fn test_cluster_failures_are_warnings() {
        let failing = MockRunner::new().on("kubectl", MockResponse::failure(1, "error: unknown kind\n"));
        let validator = ManifestValidator::new().with_cluster(Arc::new(failing));
        assert_eq!(
            validator.validate_against_cluster(VALID),
            vec!["Cluster validation failed: error: unknown kind"]
        );

        let noisy = MockRunner::new().on(
            "kubectl",
            MockResponse::success("ok").with_stderr("Warning: deprecated API\n"),
        );
        let validator = ManifestValidator::new().with_cluster(Arc::new(noisy));
        assert_eq!(
            validator.validate_against_cluster(VALID),
            vec!["Cluster validation warning: Warning: deprecated API"]
        );

        let missing = MockRunner::new().simulate_failure("kubectl not installed");
        let validator = ManifestValidator::new().with_cluster(Arc::new(missing));
        assert!(validator.validate_against_cluster(VALID)[0].starts_with("Cluster validation error:"));
    }

    #[test]
    fn test_no_runner_skips_cluster() {
        let validator = ManifestValidator::new();
        assert!(!validator.cluster_enabled());
        assert!(validator.validate_against_cluster("anything").is_empty());
    }

    #[test]
    fn test_validate_changes_only_manifests() {
        let validator = ManifestValidator::new();
        let changes = vec![
            FileChange::new(".a.yaml.template", "a.yaml", "", VALID),
            FileChange::new(".b.yml.template", "b.yml", "", "kind: Service\n"),
            FileChange::new("notes.txt.template", "notes.txt", "", "not yaml: ["),
            FileChange::new(
                ".c.yaml.template",
                "c.yaml",
                "",
                "apiVersion: v1\nkind: Secret\nmetadata:\n  name: s\ndata:\n  p: ${aws:secret:name=db}\n",
            ),
        ];

        let report = validator.validate_changes(&changes);
        assert_eq!(report.entries().len(), 3);
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
        assert!(report.has_errors());
        assert_eq!(
            report.entries()[2].warnings,
            vec!["Unresolved resource reference: ${aws:secret:name=db}"]
        );
    }

    #[test]
    fn test_validate_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svc.yaml");
        fs::write(&path, VALID).unwrap();

        let entry = ManifestValidator::new().validate_file(&path).unwrap();
        assert!(entry.is_clean());
        assert!(matches!(
            ManifestValidator::new().validate_file(&dir.path().join("nope.yaml")),
            Err(PolicyError::NotFound(_))
        ));
    }
}
