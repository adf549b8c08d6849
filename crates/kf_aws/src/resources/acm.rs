use crate::error::AwsResult;
use crate::identifier::QueryParams;
use crate::provider::ResourceKind;
use crate::session::AwsSession;

use super::{find_item, required, text_at, unsupported_attribute, ResourceHandler};

/// Certificates looked up by domain name; `arn` is the only attribute.
pub struct AcmHandler;

impl ResourceHandler for AcmHandler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Acm
    }

    fn required_params(&self) -> &'static [&'static str] {
        &["domain"]
    }

    fn resolve(&self, query: &QueryParams, session: &AwsSession) -> AwsResult<Option<String>> {
        let domain = required(query, self.kind(), "domain")?;
        let response = session.call("acm", "list-certificates", &[])?;

        let Some(certificate) = find_item(&response, "CertificateSummaryList", "DomainName", domain)
        else {
            return Ok(None);
        };

        let value = match query.get("attr").unwrap_or("arn") {
            "arn" => text_at(certificate, "/CertificateArn"),
            other => unsupported_attribute(self.kind(), other),
        };
        Ok(value)
    }
}
