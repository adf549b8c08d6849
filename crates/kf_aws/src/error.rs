//! Error types for AWS resolution.

use thiserror::Error;

/// Result type alias for AWS operations.
pub type AwsResult<T> = Result<T, AwsError>;

/// Errors that can occur while parsing or resolving resource references.
#[derive(Error, Debug)]
pub enum AwsError {
    #[error("Invalid resource identifier format: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid parameter format: {0}")]
    InvalidParameter(String),

    #[error("Unsupported resource type: {0}")]
    UnsupportedResourceType(String),

    #[error("Missing required parameters for {resource_type}: {}", .params.join(", "))]
    MissingParameter {
        resource_type: String,
        params: Vec<String>,
    },

    #[error("Unknown role alias '{0}' and no account_id provided")]
    UnknownRole(String),

    #[error("Failed to assume role {role_arn}: {message}")]
    AssumeRoleFailed { role_arn: String, message: String },

    #[error("AWS error ({code}): {message}")]
    Remote { code: String, message: String },

    #[error("Unexpected response from {operation}: {message}")]
    UnexpectedResponse { operation: String, message: String },

    #[error("Runner error: {0}")]
    Runner(#[from] kf_runner::RunnerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AwsError {
    /// Whether this is a remote authorization failure.
    pub fn is_access_denied(&self) -> bool {
        matches!(
            self,
            AwsError::Remote { code, .. }
                if matches!(
                    code.as_str(),
                    "AccessDenied" | "AccessDeniedException" | "UnauthorizedOperation"
                )
        )
    }

    /// Whether the remote side reported the resource as absent.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AwsError::Remote { code, .. }
                if code.contains("NotFound") || code == "ResourceNotFoundException"
        )
    }

    /// Format errors are raised while parsing, before any lookup.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            AwsError::InvalidIdentifier(_) | AwsError::InvalidParameter(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(code: &str) -> AwsError {
        AwsError::Remote {
            code: code.to_string(),
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_error_classification() {
        assert!(remote("AccessDenied").is_access_denied());
        assert!(remote("AccessDeniedException").is_access_denied());
        assert!(!remote("Throttling").is_access_denied());

        assert!(remote("DBInstanceNotFound").is_not_found());
        assert!(remote("RepositoryNotFoundException").is_not_found());
        assert!(!remote("AccessDenied").is_not_found());

        assert!(AwsError::InvalidIdentifier("x".into()).is_format_error());
        assert!(!AwsError::UnknownRole("x".into()).is_format_error());
    }

    #[test]
    fn test_missing_parameter_message() {
        let err = AwsError::MissingParameter {
            resource_type: "rds".to_string(),
            params: vec!["name".to_string()],
        };
        assert_eq!(err.to_string(), "Missing required parameters for rds: name");
    }
}
