//! Resolution pipeline: registry lookup, parameter check, session, handler.

use tracing::{debug, warn};

use crate::error::AwsResult;
use crate::identifier::{parse_identifier, QueryParams, ResourceIdentifier};
use crate::registry::HandlerRegistry;
use crate::session::SessionManager;

/// Resolves resource references to single string values.
///
/// `Ok(None)` means "no value": the resource was not found, access was
/// denied, or the remote call failed. Format and configuration problems
/// are returned as errors.
pub trait ResourceResolver {
    /// Parse a reference string.
    fn parse_identifier(&self, identifier: &str) -> AwsResult<ResourceIdentifier> {
        parse_identifier(identifier)
    }

    /// Resolve one lookup.
    fn resolve(
        &mut self,
        resource_type: &str,
        query: &QueryParams,
        account_id: Option<&str>,
        role_name: Option<&str>,
    ) -> AwsResult<Option<String>>;

    /// Whether a reference parses, names a supported type and carries the
    /// required parameters. Never contacts AWS.
    fn validate_reference(&self, identifier: &str) -> bool;

    /// Supported resource-type names.
    fn supported_types(&self) -> Vec<String>;

    /// Resolve a parsed reference.
    fn resolve_identifier(&mut self, identifier: &ResourceIdentifier) -> AwsResult<Option<String>> {
        self.resolve(
            &identifier.resource_type,
            &identifier.query,
            identifier.account_id.as_deref(),
            identifier.role_name.as_deref(),
        )
    }
}

/// Resolver backed by a [`HandlerRegistry`] and a [`SessionManager`].
#[derive(Debug)]
pub struct AwsResourceResolver {
    sessions: SessionManager,
    registry: HandlerRegistry,
}

impl AwsResourceResolver {
    pub fn new(sessions: SessionManager) -> Self {
        Self::with_registry(sessions, HandlerRegistry::standard())
    }

    pub fn with_registry(sessions: SessionManager, registry: HandlerRegistry) -> Self {
        Self { sessions, registry }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }
}

impl ResourceResolver for AwsResourceResolver {
    fn resolve(
        &mut self,
        resource_type: &str,
        query: &QueryParams,
        account_id: Option<&str>,
        role_name: Option<&str>,
    ) -> AwsResult<Option<String>> {
        self.registry.check_params(resource_type, query)?;
        let handler = self.registry.get(resource_type)?;
        let session = self.sessions.get_session(account_id, role_name)?;

        let account = account_id.unwrap_or("default");
        let role = role_name.unwrap_or("default");

        match handler.resolve(query, &session) {
            Ok(Some(value)) => {
                debug!(resource_type, account, role, "Resolved reference");
                Ok(Some(value))
            }
            Ok(None) => {
                debug!(resource_type, account, role, "Reference resolved to no value");
                Ok(None)
            }
            Err(e) if e.is_access_denied() => {
                warn!(
                    resource_type,
                    account,
                    role,
                    error = %e,
                    "Access denied resolving reference, check role permissions"
                );
                Ok(None)
            }
            Err(e) => {
                warn!(resource_type, account, role, error = %e, "Failed to resolve reference");
                Ok(None)
            }
        }
    }

    fn validate_reference(&self, identifier: &str) -> bool {
        let parsed = match self.parse_identifier(identifier) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(identifier, error = %e, "Reference failed to parse");
                return false;
            }
        };

        match self.registry.check_params(&parsed.resource_type, &parsed.query) {
            Ok(()) => true,
            Err(e) => {
                debug!(identifier, error = %e, "Reference failed validation");
                false
            }
        }
    }

    fn supported_types(&self) -> Vec<String> {
        self.registry.supported_types()
    }
}
