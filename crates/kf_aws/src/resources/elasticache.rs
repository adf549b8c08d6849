use serde_json::Value;

use crate::error::AwsResult;
use crate::identifier::QueryParams;
use crate::provider::ResourceKind;
use crate::session::AwsSession;

use super::{first_item, required, text_at, unsupported_attribute, ResourceHandler};

/// ElastiCache clusters: `endpoint` (default), `port`, `arn`.
///
/// Endpoints come from the first cache node, falling back to the
/// configuration endpoint of cluster-mode replication groups.
pub struct ElasticacheHandler;

impl ElasticacheHandler {
    fn endpoint_field(cluster: &Value, field: &str) -> Option<String> {
        text_at(cluster, &format!("/CacheNodes/0/Endpoint/{}", field))
            .or_else(|| text_at(cluster, &format!("/ConfigurationEndpoint/{}", field)))
    }
}

impl ResourceHandler for ElasticacheHandler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Elasticache
    }

    fn required_params(&self) -> &'static [&'static str] {
        &["cluster"]
    }

    fn resolve(&self, query: &QueryParams, session: &AwsSession) -> AwsResult<Option<String>> {
        let cluster_id = required(query, self.kind(), "cluster")?;
        let response = session.call(
            "elasticache",
            "describe-cache-clusters",
            &["--cache-cluster-id", cluster_id, "--show-cache-node-info"],
        )?;

        let Some(cluster) = first_item(&response, "CacheClusters") else {
            return Ok(None);
        };

        let value = match query.get("attr").unwrap_or("endpoint") {
            "endpoint" => Self::endpoint_field(cluster, "Address"),
            "port" => Self::endpoint_field(cluster, "Port"),
            "arn" => text_at(cluster, "/ARN"),
            other => unsupported_attribute(self.kind(), other),
        };
        Ok(value)
    }
}
