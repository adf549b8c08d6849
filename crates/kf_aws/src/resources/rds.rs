use crate::error::AwsResult;
use crate::identifier::QueryParams;
use crate::provider::ResourceKind;
use crate::session::AwsSession;

use super::{first_item, required, text_at, unsupported_attribute, ResourceHandler};

/// RDS database instances: `endpoint` (default), `port`, `arn`.
pub struct RdsHandler;

impl ResourceHandler for RdsHandler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Rds
    }

    fn required_params(&self) -> &'static [&'static str] {
        &["name"]
    }

    fn resolve(&self, query: &QueryParams, session: &AwsSession) -> AwsResult<Option<String>> {
        let name = required(query, self.kind(), "name")?;
        let response = session.call(
            "rds",
            "describe-db-instances",
            &["--db-instance-identifier", name],
        )?;

        let Some(instance) = first_item(&response, "DBInstances") else {
            return Ok(None);
        };

        let value = match query.get("attr").unwrap_or("endpoint") {
            "endpoint" => text_at(instance, "/Endpoint/Address"),
            "port" => text_at(instance, "/Endpoint/Port"),
            "arn" => text_at(instance, "/DBInstanceArn"),
            other => unsupported_attribute(self.kind(), other),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::test_support::session;
    use kf_runner::{MockResponse, MockRunner};

    const INSTANCE: &str = r#"{"DBInstances": [{
        "DBInstanceIdentifier": "mydb",
        "DBInstanceArn": "arn:aws:rds:us-east-1:123456789012:db:mydb",
        "Endpoint": {"Address": "mydb.abc.us-east-1.rds.amazonaws.com", "Port": 5432}
    }]}"#;

    fn resolve(query: QueryParams) -> Option<String> {
        let runner = MockRunner::new().on("aws rds describe-db-instances", MockResponse::success(INSTANCE));
        RdsHandler.resolve(&query, &session(&runner)).unwrap()
    }

    #[test]
    fn test_endpoint_is_default() {
        let value = resolve(QueryParams::new().with("name", "mydb"));
        assert_eq!(value.as_deref(), Some("mydb.abc.us-east-1.rds.amazonaws.com"));
    }

    #[test]
    fn test_port_and_arn() {
        let port = resolve(QueryParams::new().with("name", "mydb").with("attr", "port"));
        assert_eq!(port.as_deref(), Some("5432"));

        let arn = resolve(QueryParams::new().with("name", "mydb").with("attr", "arn"));
        assert_eq!(arn.as_deref(), Some("arn:aws:rds:us-east-1:123456789012:db:mydb"));
    }

    #[test]
    fn test_unknown_attribute_is_none() {
        assert_eq!(resolve(QueryParams::new().with("name", "mydb").with("attr", "engine")), None);
    }

    #[test]
    fn test_empty_listing_is_none() {
        let runner = MockRunner::new().on("aws rds", MockResponse::success(r#"{"DBInstances": []}"#));
        let value = RdsHandler
            .resolve(&QueryParams::new().with("name", "mydb"), &session(&runner))
            .unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn test_remote_error_is_returned() {
        let runner = MockRunner::new().on(
            "aws rds",
            MockResponse::failure(
                254,
                "An error occurred (DBInstanceNotFound) when calling the DescribeDBInstances operation: DBInstance mydb not found.",
            ),
        );
        let err = RdsHandler
            .resolve(&QueryParams::new().with("name", "mydb"), &session(&runner))
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
