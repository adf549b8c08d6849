//! Static AWS configuration.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AwsResult;

/// Region used when neither a flag nor `AWS_REGION` supplies one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Environment variable consulted for the region.
pub const REGION_ENV_VAR: &str = "AWS_REGION";

/// Role, account and profile mappings loaded once at startup.
///
/// ```yaml
/// role_mappings:
///   deploy: arn:aws:iam::111111111111:role/deploy
/// account_mappings:
///   prod: "111111111111"
/// profile_mappings:
///   local: my-sso-profile
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// Role alias -> role ARN.
    pub role_mappings: HashMap<String, String>,
    /// Account alias -> numeric account id.
    pub account_mappings: HashMap<String, String>,
    /// Role name -> local credential profile.
    pub profile_mappings: HashMap<String, String>,
}

impl AwsConfig {
    /// Load configuration, degrading to empty mappings.
    ///
    /// A missing path or file yields empty mappings silently; a file that
    /// cannot be read or parsed logs a warning and yields empty mappings.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        if !path.exists() {
            debug!("AWS config {:?} not found, using empty mappings", path);
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load AWS config {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Strictly read and parse a configuration file.
    pub fn from_file(path: &Path) -> AwsResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration text; an empty document yields empty mappings.
    pub fn from_yaml(content: &str) -> AwsResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Option<AwsConfig> = serde_yaml::from_str(content)?;
        Ok(config.unwrap_or_default())
    }

    pub fn with_role(mut self, alias: impl Into<String>, arn: impl Into<String>) -> Self {
        self.role_mappings.insert(alias.into(), arn.into());
        self
    }

    pub fn with_account(mut self, alias: impl Into<String>, account_id: impl Into<String>) -> Self {
        self.account_mappings.insert(alias.into(), account_id.into());
        self
    }

    pub fn with_profile(mut self, role: impl Into<String>, profile: impl Into<String>) -> Self {
        self.profile_mappings.insert(role.into(), profile.into());
        self
    }
}

/// Pick the region: explicit value, then `AWS_REGION`, then [`DEFAULT_REGION`].
pub fn resolve_region(explicit: Option<&str>) -> String {
    explicit
        .filter(|r| !r.trim().is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(REGION_ENV_VAR).ok().filter(|r| !r.is_empty()))
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_full_config() {
        let config = AwsConfig::from_yaml(
            r#"
role_mappings:
  deploy: arn:aws:iam::111111111111:role/deploy
account_mappings:
  prod: "111111111111"
profile_mappings:
  local: dev-profile
"#,
        )
        .unwrap();

        assert_eq!(
            config.role_mappings.get("deploy").map(String::as_str),
            Some("arn:aws:iam::111111111111:role/deploy")
        );
        assert_eq!(config.account_mappings.get("prod").map(String::as_str), Some("111111111111"));
        assert_eq!(config.profile_mappings.get("local").map(String::as_str), Some("dev-profile"));
    }

    #[test]
    fn test_missing_keys_default_to_empty() {
        let config = AwsConfig::from_yaml("account_mappings:\n  dev: \"222222222222\"\n").unwrap();
        assert!(config.role_mappings.is_empty());
        assert!(config.profile_mappings.is_empty());
        assert_eq!(config.account_mappings.len(), 1);

        assert_eq!(AwsConfig::from_yaml("").unwrap(), AwsConfig::default());
        assert_eq!(AwsConfig::from_yaml("~").unwrap(), AwsConfig::default());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let config = AwsConfig::load(Some(&dir.path().join("nope.yaml")));
        assert_eq!(config, AwsConfig::default());
        assert_eq!(AwsConfig::load(None), AwsConfig::default());
    }

    #[test]
    fn test_load_malformed_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aws.yaml");
        std::fs::write(&path, "role_mappings: [not, a, mapping]\n").unwrap();

        assert!(AwsConfig::from_file(&path).is_err());
        assert_eq!(AwsConfig::load(Some(&path)), AwsConfig::default());
    }

    #[test]
    fn test_explicit_region_wins() {
        assert_eq!(resolve_region(Some("eu-west-1")), "eu-west-1");
    }
}
