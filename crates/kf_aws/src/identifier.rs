//! Resource reference grammar.
//!
//! ```text
//! aws:[role=<name>:]<resourceType>:<key>=<value>[,<key>=<value>...]
//! ```
//!
//! There is no escaping: values cannot contain `,` and keys cannot contain `=`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{AwsError, AwsResult};

/// Prefix every resource reference starts with.
pub const REFERENCE_PREFIX: &str = "aws:";

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^aws:(?:role=([^:]+):)?([^:]+):(.*)$").expect("identifier pattern is valid")
    })
}

/// Query parameters of a reference, kept in insertion order.
///
/// Keys are unique; inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// JSON object text in insertion order.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl Serialize for QueryParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A parsed resource reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentifier {
    /// Account the lookup targets. The parser never sets it; it is derived
    /// downstream from role context when needed.
    pub account_id: Option<String>,
    /// Role to assume before the lookup.
    pub role_name: Option<String>,
    /// Handler name, e.g. `rds` or `ecr`.
    pub resource_type: String,
    /// Flat query handed to the handler.
    pub query: QueryParams,
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", REFERENCE_PREFIX)?;
        if let Some(role) = &self.role_name {
            write!(f, "role={}:", role)?;
        }
        write!(f, "{}:", self.resource_type)?;
        let params: Vec<String> = self.query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{}", params.join(","))
    }
}

/// Whether `text` looks like a resource reference.
pub fn is_reference(text: &str) -> bool {
    text.starts_with(REFERENCE_PREFIX)
}

/// Parse a resource reference.
///
/// Whitespace around keys and values is trimmed, empty segments between
/// commas are skipped and a repeated key keeps the last value.
pub fn parse_identifier(identifier: &str) -> AwsResult<ResourceIdentifier> {
    let caps = identifier_pattern()
        .captures(identifier)
        .ok_or_else(|| AwsError::InvalidIdentifier(identifier.to_string()))?;

    let role_name = caps.get(1).map(|m| m.as_str().to_string());
    let resource_type = caps[2].to_string();
    let query_str = caps.get(3).map(|m| m.as_str()).unwrap_or("");

    let mut query = QueryParams::new();
    for param in query_str.split(',') {
        let param = param.trim();
        if param.is_empty() {
            continue;
        }

        let (key, value) = param.split_once('=').ok_or_else(|| {
            AwsError::InvalidParameter(format!("missing '=' in '{}'", param))
        })?;
        let key = key.trim();
        let value = value.trim();

        if key.is_empty() {
            return Err(AwsError::InvalidParameter(
                "empty parameter key is not allowed".to_string(),
            ));
        }
        if value.is_empty() {
            return Err(AwsError::InvalidParameter(format!(
                "empty value for parameter key '{}' is not allowed",
                key
            )));
        }

        query.insert(key, value);
    }

    Ok(ResourceIdentifier {
        account_id: None,
        role_name,
        resource_type,
        query,
    })
}
