use crate::error::AwsResult;
use crate::identifier::QueryParams;
use crate::provider::ResourceKind;
use crate::session::AwsSession;

use super::{find_item, required, text_at, unsupported_attribute, ResourceHandler};

/// Scope used when the query names none.
pub const DEFAULT_WAF_SCOPE: &str = "REGIONAL";

/// Web ACLs looked up by name; `arn` is the only attribute.
pub struct WafHandler;

impl ResourceHandler for WafHandler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Waf
    }

    fn required_params(&self) -> &'static [&'static str] {
        &["name"]
    }

    fn resolve(&self, query: &QueryParams, session: &AwsSession) -> AwsResult<Option<String>> {
        let name = required(query, self.kind(), "name")?;
        let scope = query.get("scope").unwrap_or(DEFAULT_WAF_SCOPE);
        let response = session.call("wafv2", "list-web-acls", &["--scope", scope])?;

        let Some(acl) = find_item(&response, "WebACLs", "Name", name) else {
            return Ok(None);
        };

        let value = match query.get("attr").unwrap_or("arn") {
            "arn" => text_at(acl, "/ARN"),
            other => unsupported_attribute(self.kind(), other),
        };
        Ok(value)
    }
}
