//! Validation results keyed by output path.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Issues found in one manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeValidation {
    pub path: PathBuf,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ChangeValidation {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// No errors and no warnings.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// Validation outcome for a batch of changes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    entries: Vec<ChangeValidation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: ChangeValidation) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ChangeValidation] {
        &self.entries
    }

    pub fn error_count(&self) -> usize {
        self.entries.iter().map(|e| e.errors.len()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.entries.iter().map(|e| e.warnings.len()).sum()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    /// Whether the batch may be applied. Warnings block only when
    /// `warnings_block` is set.
    pub fn passed(&self, warnings_block: bool) -> bool {
        !self.has_errors() && !(warnings_block && self.has_warnings())
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for entry in self.entries.iter().filter(|e| !e.is_clean()) {
            if !first {
                writeln!(f)?;
            }
            first = false;
            writeln!(f, "Validation issues for {}:", entry.path.display())?;
            for error in &entry.errors {
                writeln!(f, "  - Error: {}", error)?;
            }
            for warning in &entry.warnings {
                writeln!(f, "  - Warning: {}", warning)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passed_respects_warning_policy() {
        let mut report = ValidationReport::new();
        let mut entry = ChangeValidation::new("a.yaml");
        entry.add_warning("Cluster validation warning: deprecated");
        report.add(entry);

        assert!(report.passed(false));
        assert!(!report.passed(true));

        let mut failing = ChangeValidation::new("b.yaml");
        failing.add_error("metadata.name is required");
        report.add(failing);
        assert!(!report.passed(false));
    }

    #[test]
    fn test_display_lists_only_problem_entries() {
        let mut report = ValidationReport::new();
        report.add(ChangeValidation::new("clean.yaml"));
        let mut entry = ChangeValidation::new("bad.yaml");
        entry.add_error("Empty YAML document");
        entry.add_warning("Unresolved resource reference: {{ aws:rds:name=db }}");
        report.add(entry);

        assert_eq!(
            report.to_string(),
            "Validation issues for bad.yaml:\n  - Error: Empty YAML document\n  - Warning: Unresolved resource reference: {{ aws:rds:name=db }}\n"
        );
    }
}
