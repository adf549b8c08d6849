use std::collections::BTreeSet;

use serde_json::Value;
use tracing::warn;

use crate::error::AwsResult;
use crate::identifier::QueryParams;
use crate::provider::ResourceKind;
use crate::session::AwsSession;

use super::{first_item, required, text_at, unsupported_attribute, ResourceHandler};

/// Container registry repositories: `url` (default), `arn`, `name` and
/// `auth` (registry authorization token).
pub struct EcrHandler;

impl EcrHandler {
    fn authorization_token(&self, session: &AwsSession) -> AwsResult<Option<String>> {
        let response = session.call("ecr", "get-authorization-token", &[])?;
        Ok(text_at(&response, "/authorizationData/0/authorizationToken"))
    }

    /// Tags of tagged images in a repository, sorted and de-duplicated.
    pub fn image_tags(
        &self,
        session: &AwsSession,
        repository: &str,
        max_results: usize,
    ) -> AwsResult<Vec<String>> {
        let max_items = max_results.to_string();
        let response = session.call(
            "ecr",
            "list-images",
            &[
                "--repository-name",
                repository,
                "--filter",
                "tagStatus=TAGGED",
                "--max-items",
                &max_items,
            ],
        )?;

        let tags: BTreeSet<String> = response
            .get("imageIds")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|image| image.get("imageTag").and_then(Value::as_str))
            .map(str::to_string)
            .collect();
        Ok(tags.into_iter().collect())
    }

    /// Whether the session can describe `repository`.
    pub fn validate_repository_access(&self, session: &AwsSession, repository: &str) -> bool {
        match session.call(
            "ecr",
            "describe-repositories",
            &["--repository-names", repository],
        ) {
            Ok(_) => true,
            Err(e) if e.is_not_found() => {
                warn!(repository, "Repository does not exist");
                false
            }
            Err(e) if e.is_access_denied() => {
                warn!(repository, "No access to repository");
                false
            }
            Err(e) => {
                warn!(repository, error = %e, "Repository access check failed");
                false
            }
        }
    }
}

impl ResourceHandler for EcrHandler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Ecr
    }

    fn required_params(&self) -> &'static [&'static str] {
        &["name"]
    }

    fn resolve(&self, query: &QueryParams, session: &AwsSession) -> AwsResult<Option<String>> {
        let attr = query.get("attr").unwrap_or("url");
        if attr == "auth" {
            return self.authorization_token(session);
        }

        let name = required(query, self.kind(), "name")?;
        let response = session.call("ecr", "describe-repositories", &["--repository-names", name])?;

        let Some(repository) = first_item(&response, "repositories") else {
            warn!(repository = name, "Repository not found");
            return Ok(None);
        };

        let value = match attr {
            "url" => text_at(repository, "/repositoryUri"),
            "arn" => text_at(repository, "/repositoryArn"),
            "name" => text_at(repository, "/repositoryName"),
            other => unsupported_attribute(self.kind(), other),
        };
        Ok(value)
    }
}
