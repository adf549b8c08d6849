//! Typed handlers, one per [`ResourceKind`].
//!
//! A handler maps a flat query to a single string by calling the `aws` CLI
//! through an [`AwsSession`]. Remote failures are returned as errors; the
//! resolver decides whether they become "no value".

mod acm;
mod alb;
mod ecr;
mod elasticache;
mod rds;
mod secrets;
mod waf;

pub use acm::AcmHandler;
pub use alb::AlbHandler;
pub use ecr::EcrHandler;
pub use elasticache::ElasticacheHandler;
pub use rds::RdsHandler;
pub use secrets::SecretHandler;
pub use waf::{WafHandler, DEFAULT_WAF_SCOPE};

use serde_json::Value;
use tracing::warn;

use crate::error::{AwsError, AwsResult};
use crate::identifier::QueryParams;
use crate::provider::ResourceKind;
use crate::session::AwsSession;

/// Resolve a flat query into one string for a resource kind.
pub trait ResourceHandler: Send + Sync {
    /// Kind this handler serves.
    fn kind(&self) -> ResourceKind;

    /// Query keys that must be present before any remote call.
    fn required_params(&self) -> &'static [&'static str];

    /// Look the value up.
    fn resolve(&self, query: &QueryParams, session: &AwsSession) -> AwsResult<Option<String>>;

    /// Required keys absent from `query`, in declaration order.
    fn missing_params(&self, query: &QueryParams) -> Vec<String> {
        self.required_params()
            .iter()
            .filter(|key| !query.contains_key(key))
            .map(|key| key.to_string())
            .collect()
    }
}

/// Scalar at a JSON pointer, rendered as text.
pub(crate) fn text_at(value: &Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First element of the array stored under `key`.
pub(crate) fn first_item<'a>(response: &'a Value, key: &str) -> Option<&'a Value> {
    response.get(key)?.as_array()?.first()
}

/// Element of the array under `list_key` whose `field` equals `expected`.
pub(crate) fn find_item<'a>(
    response: &'a Value,
    list_key: &str,
    field: &str,
    expected: &str,
) -> Option<&'a Value> {
    response
        .get(list_key)?
        .as_array()?
        .iter()
        .find(|item| item.get(field).and_then(Value::as_str) == Some(expected))
}

/// Value of a required key; the resolver checks presence up front.
pub(crate) fn required<'a>(query: &'a QueryParams, kind: ResourceKind, key: &str) -> AwsResult<&'a str> {
    query.get(key).ok_or_else(|| AwsError::MissingParameter {
        resource_type: kind.to_string(),
        params: vec![key.to_string()],
    })
}

pub(crate) fn unsupported_attribute(kind: ResourceKind, attr: &str) -> Option<String> {
    warn!(resource_type = %kind, attr, "Unsupported attribute");
    None
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use kf_runner::MockRunner;

    use crate::session::{AwsSession, SessionAuth};

    pub fn session(runner: &MockRunner) -> AwsSession {
        AwsSession::new("us-east-1", SessionAuth::Default, Arc::new(runner.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_at_renders_scalars() {
        let value = json!({"Endpoint": {"Address": "db.local", "Port": 5432, "Ssl": true, "Tags": []}});
        assert_eq!(text_at(&value, "/Endpoint/Address").as_deref(), Some("db.local"));
        assert_eq!(text_at(&value, "/Endpoint/Port").as_deref(), Some("5432"));
        assert_eq!(text_at(&value, "/Endpoint/Ssl").as_deref(), Some("true"));
        assert_eq!(text_at(&value, "/Endpoint/Tags"), None);
        assert_eq!(text_at(&value, "/Missing"), None);
    }

    #[test]
    fn test_find_item_matches_field() {
        let value = json!({"WebACLs": [{"Name": "a", "ARN": "arn:a"}, {"Name": "b", "ARN": "arn:b"}]});
        let item = find_item(&value, "WebACLs", "Name", "b").unwrap();
        assert_eq!(text_at(item, "/ARN").as_deref(), Some("arn:b"));
        assert!(find_item(&value, "WebACLs", "Name", "c").is_none());
        assert!(first_item(&json!({"WebACLs": []}), "WebACLs").is_none());
    }

    #[test]
    fn test_missing_params_in_declaration_order() {
        let handler = RdsHandler;
        assert_eq!(handler.missing_params(&QueryParams::new()), vec!["name".to_string()]);
        assert!(handler
            .missing_params(&QueryParams::new().with("name", "db"))
            .is_empty());
    }
}
