use crate::error::AwsResult;
use crate::identifier::QueryParams;
use crate::provider::ResourceKind;
use crate::session::AwsSession;

use super::{first_item, required, text_at, unsupported_attribute, ResourceHandler};

/// Application load balancers: `dns` (default), `arn`, `zone_id`.
pub struct AlbHandler;

impl ResourceHandler for AlbHandler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Alb
    }

    fn required_params(&self) -> &'static [&'static str] {
        &["name"]
    }

    fn resolve(&self, query: &QueryParams, session: &AwsSession) -> AwsResult<Option<String>> {
        let name = required(query, self.kind(), "name")?;
        let response = session.call("elbv2", "describe-load-balancers", &["--names", name])?;

        let Some(lb) = first_item(&response, "LoadBalancers") else {
            return Ok(None);
        };

        let value = match query.get("attr").unwrap_or("dns") {
            "dns" => text_at(lb, "/DNSName"),
            "arn" => text_at(lb, "/LoadBalancerArn"),
            "zone_id" => text_at(lb, "/CanonicalHostedZoneId"),
            other => unsupported_attribute(self.kind(), other),
        };
        Ok(value)
    }
}
