//! Placeholder substitution.
//!
//! Two placeholder syntaxes are recognised:
//!
//! - `{{ name }}` / `{{ aws:... }}`: plain variables and resource references
//! - `${aws:...}`: resource references only
//!
//! Substitution is a single pass; substituted values are never rescanned.
//! A placeholder that cannot be filled is left in place verbatim.

use std::collections::HashMap;

use kf_aws::identifier::is_reference;
use kf_aws::{AwsResult, ResourceResolver};
use regex::{Captures, Regex};
use tracing::{debug, error, warn};

/// Placeholder renderer.
pub struct TemplateRenderer {
    variable_pattern: Regex,
    reference_pattern: Regex,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Create a new renderer.
    pub fn new() -> Self {
        Self {
            variable_pattern: Regex::new(r"\{\{\s*(.+?)\s*\}\}").unwrap(),
            reference_pattern: Regex::new(r"\$\{(aws:[^}]+)\}").unwrap(),
        }
    }

    /// Fill `{{ ... }}` placeholders.
    ///
    /// Inner text starting with `aws:` is resolved through `resolver`;
    /// anything else is looked up verbatim in `variables`.
    pub fn substitute(
        &self,
        content: &str,
        variables: &HashMap<String, String>,
        resolver: &mut dyn ResourceResolver,
    ) -> String {
        self.variable_pattern
            .replace_all(content, |caps: &Captures| {
                let inner = &caps[1];
                let value = if is_reference(inner) {
                    resolve_reference(resolver, inner)
                } else {
                    variables.get(inner).cloned()
                };
                value.unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// Fill `{{ name }}` placeholders from `variables` only.
    ///
    /// Resource references are left untouched.
    pub fn render_variables(&self, content: &str, variables: &HashMap<String, String>) -> String {
        self.variable_pattern
            .replace_all(content, |caps: &Captures| {
                let inner = &caps[1];
                if is_reference(inner) {
                    return caps[0].to_string();
                }
                variables
                    .get(inner)
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// Fill `${aws:...}` placeholders, warning about each one left in place.
    pub fn substitute_references(&self, content: &str, resolver: &mut dyn ResourceResolver) -> String {
        self.reference_pattern
            .replace_all(content, |caps: &Captures| {
                let reference = &caps[1];
                resolve_reference(resolver, reference).unwrap_or_else(|| {
                    warn!(reference, "Failed to process reference, leaving it unchanged");
                    caps[0].to_string()
                })
            })
            .into_owned()
    }

    /// Resource-reference placeholders of either syntax still present in
    /// `content`, in order of appearance.
    pub fn unresolved_references(&self, content: &str) -> Vec<String> {
        let mut found: Vec<(usize, String)> = self
            .variable_pattern
            .captures_iter(content)
            .filter(|caps| is_reference(&caps[1]))
            .filter_map(|caps| caps.get(0).map(|m| (m.start(), m.as_str().to_string())))
            .collect();
        found.extend(
            self.reference_pattern
                .find_iter(content)
                .map(|m| (m.start(), m.as_str().to_string())),
        );
        found.sort_by_key(|(start, _)| *start);
        found.into_iter().map(|(_, text)| text).collect()
    }
}

fn lookup(resolver: &mut dyn ResourceResolver, reference: &str) -> AwsResult<Option<String>> {
    let identifier = resolver.parse_identifier(reference)?;
    resolver.resolve_identifier(&identifier)
}

fn resolve_reference(resolver: &mut dyn ResourceResolver, reference: &str) -> Option<String> {
    match lookup(resolver, reference) {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            debug!(reference, "Reference resolved to no value");
            None
        }
        Err(e) if e.is_format_error() => {
            warn!(reference, error = %e, "Invalid resource reference");
            None
        }
        Err(e) => {
            error!(reference, error = %e, "Could not resolve reference");
            None
        }
    }
}
