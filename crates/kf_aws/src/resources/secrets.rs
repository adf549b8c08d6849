use serde_json::Value;
use tracing::warn;

use crate::error::AwsResult;
use crate::identifier::QueryParams;
use crate::provider::ResourceKind;
use crate::session::AwsSession;

use super::{required, text_at, ResourceHandler};

/// Secrets Manager secrets.
///
/// Without `key` the whole secret string is returned. With `key` the secret
/// must be a JSON object; the field is rendered as text, and a missing field
/// or a non-JSON secret yields no value.
pub struct SecretHandler;

impl ResourceHandler for SecretHandler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Secret
    }

    fn required_params(&self) -> &'static [&'static str] {
        &["name"]
    }

    fn resolve(&self, query: &QueryParams, session: &AwsSession) -> AwsResult<Option<String>> {
        let name = required(query, self.kind(), "name")?;
        let response = session.call("secretsmanager", "get-secret-value", &["--secret-id", name])?;

        let Some(secret) = text_at(&response, "/SecretString") else {
            return Ok(None);
        };

        let Some(key) = query.get("key") else {
            return Ok(Some(secret));
        };

        let data: Value = match serde_json::from_str(&secret) {
            Ok(data) => data,
            Err(_) => {
                warn!(secret = name, key, "Secret is not JSON but a key was requested");
                return Ok(None);
            }
        };

        let value = match data.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => {
                warn!(secret = name, key, "Key not present in secret");
                None
            }
            Some(other) => Some(other.to_string()),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_support::session;
    use kf_runner::{MockResponse, MockRunner};

    fn secret_runner(secret_string: &str) -> MockRunner {
        let body = serde_json::json!({"Name": "db", "SecretString": secret_string}).to_string();
        MockRunner::new().on("aws secretsmanager get-secret-value", MockResponse::success(body))
    }

    #[test]
    fn test_plain_secret() {
        let runner = secret_runner("hunter2");
        let value = SecretHandler
            .resolve(&QueryParams::new().with("name", "db"), &session(&runner))
            .unwrap();
        assert_eq!(value.as_deref(), Some("hunter2"));
    }

    #[test]
    fn test_json_key_lookup() {
        let runner = secret_runner(r#"{"username": "admin", "port": 5432}"#);
        let session = session(&runner);

        let user = SecretHandler
            .resolve(&QueryParams::new().with("name", "db").with("key", "username"), &session)
            .unwrap();
        assert_eq!(user.as_deref(), Some("admin"));

        let port = SecretHandler
            .resolve(&QueryParams::new().with("name", "db").with("key", "port"), &session)
            .unwrap();
        assert_eq!(port.as_deref(), Some("5432"));

        let missing = SecretHandler
            .resolve(&QueryParams::new().with("name", "db").with("key", "password"), &session)
            .unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_key_on_plain_secret_is_none() {
        let runner = secret_runner("not json");
        let value = SecretHandler
            .resolve(&QueryParams::new().with("name", "db").with("key", "username"), &session(&runner))
            .unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_binary_secret_is_none() {
        let runner = MockRunner::new().on(
            "aws secretsmanager",
            MockResponse::success(r#"{"Name": "db", "SecretBinary": "AAEC"}"#),
        );
        let value = SecretHandler
            .resolve(&QueryParams::new().with("name", "db"), &session(&runner))
            .unwrap();
        assert_eq!(value, None);
    }
}
