//! Pending file changes and their presentation.

use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use serde::Serialize;
use similar::{ChangeTag, TextDiff};

/// One pending mutation: `processed_content` is to be written to
/// `output_path`, replacing `original_content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub template_path: PathBuf,
    pub output_path: PathBuf,
    pub original_content: String,
    pub processed_content: String,
}

impl FileChange {
    pub fn new(
        template_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        original_content: impl Into<String>,
        processed_content: impl Into<String>,
    ) -> Self {
        Self {
            template_path: template_path.into(),
            output_path: output_path.into(),
            original_content: original_content.into(),
            processed_content: processed_content.into(),
        }
    }

    /// Whether writing the change would alter the text.
    pub fn has_changes(&self) -> bool {
        self.original_content != self.processed_content
    }

    /// Difference in newline count between processed and original text.
    pub fn line_delta(&self) -> i64 {
        let count = |s: &str| s.matches('\n').count() as i64;
        count(&self.processed_content) - count(&self.original_content)
    }
}

/// Renders unified diffs and change summaries.
#[derive(Debug, Clone)]
pub struct DiffFormatter {
    context_lines: usize,
    color: bool,
    base_dir: Option<PathBuf>,
}

impl Default for DiffFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffFormatter {
    pub fn new() -> Self {
        Self {
            context_lines: 3,
            color: true,
            base_dir: None,
        }
    }

    pub fn with_context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Show paths relative to `dir` when they lie under it.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    fn display_path(&self, path: &Path) -> String {
        let shown = self
            .base_dir
            .as_deref()
            .and_then(|base| path.strip_prefix(base).ok())
            .unwrap_or(path);
        shown.to_string_lossy().replace('\\', "/")
    }

    fn paint(&self, line: &str, kind: LineKind) -> String {
        if !self.color {
            return line.to_string();
        }
        match kind {
            LineKind::Header => line.cyan().to_string(),
            LineKind::Added => line.green().to_string(),
            LineKind::Removed => line.red().to_string(),
            LineKind::Separator => line.dimmed().to_string(),
            LineKind::Context => line.to_string(),
        }
    }

    /// Unified diff from the original to the processed content.
    ///
    /// Returns an empty string when the contents are identical.
    pub fn create_diff(&self, change: &FileChange) -> String {
        let diff = TextDiff::from_lines(
            change.original_content.as_str(),
            change.processed_content.as_str(),
        );
        let mut unified = diff.unified_diff();
        unified.context_radius(self.context_lines);

        let mut out = Vec::new();
        for hunk in unified.iter_hunks() {
            if out.is_empty() {
                out.push(self.paint(
                    &format!("--- Template: {}", self.display_path(&change.template_path)),
                    LineKind::Header,
                ));
                out.push(self.paint(
                    &format!("+++ Generated: {}", self.display_path(&change.output_path)),
                    LineKind::Header,
                ));
            }
            out.push(self.paint(&hunk.header().to_string(), LineKind::Header));

            for line in hunk.iter_changes() {
                let text = line.value().trim_end_matches(['\r', '\n']);
                let rendered = match line.tag() {
                    ChangeTag::Equal => self.paint(&format!(" {}", text), LineKind::Context),
                    ChangeTag::Delete => self.paint(&format!("-{}", text), LineKind::Removed),
                    ChangeTag::Insert => self.paint(&format!("+{}", text), LineKind::Added),
                };
                out.push(rendered);
            }
        }

        out.join("\n")
    }

    /// Every change with a file header and its diff.
    pub fn render_changes(&self, changes: &[FileChange]) -> String {
        if changes.is_empty() {
            return self.paint("No changes detected.", LineKind::Separator);
        }

        let separator = self.paint(&"=".repeat(80), LineKind::Separator);
        let mut out = Vec::new();
        for (i, change) in changes.iter().enumerate() {
            out.push(String::new());
            out.push(self.paint(
                &format!("Processing template file [{}/{}]:", i + 1, changes.len()),
                LineKind::Header,
            ));
            out.push(self.paint(
                &format!("  Source: {}", self.display_path(&change.template_path)),
                LineKind::Header,
            ));
            out.push(self.paint(
                &format!("  Output: {}", self.display_path(&change.output_path)),
                LineKind::Header,
            ));
            out.push(separator.clone());
            let diff = self.create_diff(change);
            if diff.is_empty() {
                out.push("(no differences)".to_string());
            } else {
                out.push(diff);
            }
            out.push(separator.clone());
        }
        out.join("\n")
    }

    /// One line per change with its line-count delta.
    pub fn summarize_changes(&self, changes: &[FileChange]) -> String {
        if changes.is_empty() {
            return "No changes to process.".to_string();
        }

        let mut lines = vec![format!("Found {} template(s) to process:", changes.len())];
        for change in changes {
            let delta = change.line_delta();
            let info = match delta {
                d if d > 0 => format!("+{} lines", d),
                d if d < 0 => format!("{} lines", d),
                _ => "no line count change".to_string(),
            };
            lines.push(format!(
                "  • {} → {} ({})",
                self.display_path(&change.template_path),
                self.display_path(&change.output_path),
                info
            ));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Clone, Copy)]
enum LineKind {
    Header,
    Added,
    Removed,
    Context,
    Separator,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> DiffFormatter {
        DiffFormatter::new().with_color(false)
    }

    #[test]
    fn test_identical_content_has_no_diff() {
        let change = FileChange::new(".a.yaml.template", "a.yaml", "x: 1\n", "x: 1\n");
        assert!(!change.has_changes());
        assert_eq!(plain().create_diff(&change), "");
    }

    #[test]
    fn test_single_line_change() {
        let change = FileChange::new(
            "k8s/.app.yaml.template",
            "k8s/app.yaml",
            "kind: Deployment\nimage: {{ aws:ecr:name=app }}\nreplicas: 1\n",
            "kind: Deployment\nimage: repo/app\nreplicas: 1\n",
        );

        let diff = plain().create_diff(&change);
        assert_eq!(
            diff,
            "--- Template: k8s/.app.yaml.template\n\
             +++ Generated: k8s/app.yaml\n\
             @@ -1,3 +1,3 @@\n \
             kind: Deployment\n\
             -image: {{ aws:ecr:name=app }}\n\
             +image: repo/app\n \
             replicas: 1"
        );
    }

    #[test]
    fn test_new_file_diff() {
        let change = FileChange::new(".a.yaml.template", "a.yaml", "", "a: 1\nb: 2\n");
        let diff = plain().create_diff(&change);
        assert!(diff.contains("@@ -0,0 +1,2 @@"));
        assert!(diff.ends_with("+a: 1\n+b: 2"));
    }

    #[test]
    fn test_distant_changes_split_hunks() {
        let old: String = (1..=20).map(|i| format!("line{}\n", i)).collect();
        let new = old.replace("line2\n", "LINE2\n").replace("line19\n", "LINE19\n");
        let change = FileChange::new("t", "o", old, new);

        let diff = plain().with_context_lines(1).create_diff(&change);
        assert_eq!(diff.matches("@@ ").count(), 2);
        assert!(diff.contains("@@ -1,3 +1,3 @@"));
        assert!(diff.contains("@@ -18,3 +18,3 @@"));
    }

    #[test]
    fn test_large_manifest_diff() {
        let old: String = (0..20_000).map(|i| format!("  key{}: value{}\n", i, i)).collect();
        let new = old
            .replace("  key10: value10\n", "  key10: changed\n")
            .replace("  key19990: value19990\n", "  key19990: changed\n");
        let change = FileChange::new(".crd.yaml.template", "crd.yaml", old, new);

        let diff = plain().create_diff(&change);
        assert_eq!(diff.matches("@@ ").count(), 2);
        assert!(diff.contains("@@ -8,7 +8,7 @@"));
        assert!(diff.contains("-  key19990: value19990\n+  key19990: changed"));
        assert_eq!(diff.lines().count(), 2 + 2 * 9);
    }

    #[test]
    fn test_relative_display_paths() {
        let change = FileChange::new("/work/k8s/.a.yaml.template", "/work/k8s/a.yaml", "a\n", "b\n");
        let formatter = plain().with_base_dir("/work");
        assert!(formatter.create_diff(&change).starts_with("--- Template: k8s/.a.yaml.template"));
    }

    #[test]
    fn test_summarize_changes() {
        let formatter = plain();
        assert_eq!(formatter.summarize_changes(&[]), "No changes to process.");

        let changes = vec![
            FileChange::new(".a.yaml.template", "a.yaml", "", "a: 1\nb: 2\n"),
            FileChange::new(".b.yaml.template", "b.yaml", "a: 1\n", "a: 2\n"),
            FileChange::new(".c.yaml.template", "c.yaml", "a\nb\nc\n", "a\n"),
        ];
        let summary = formatter.summarize_changes(&changes);
        assert!(summary.starts_with("Found 3 template(s) to process:"));
        assert!(summary.contains(".a.yaml.template → a.yaml (+2 lines)"));
        assert!(summary.contains("(no line count change)"));
        assert!(summary.contains("(-2 lines)"));
    }

    #[test]
    fn test_render_changes_headers() {
        let changes = vec![FileChange::new(".a.yaml.template", "a.yaml", "a: 1\n", "a: 2\n")];
        let rendered = plain().render_changes(&changes);
        assert!(rendered.contains("Processing template file [1/1]:"));
        assert!(rendered.contains("  Output: a.yaml"));
        assert!(rendered.contains("-a: 1\n+a: 2"));
        assert_eq!(plain().render_changes(&[]), "No changes detected.");
    }

    #[test]
    fn test_colored_lines() {
        let change = FileChange::new("t", "o", "a\n", "b\n");
        let diff = DiffFormatter::new().create_diff(&change);
        assert!(diff.contains(&"+b".green().to_string()));
        assert!(diff.contains(&"-a".red().to_string()));
    }
}
