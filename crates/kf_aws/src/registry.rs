//! Dispatch table from resource-type name to handler.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{AwsError, AwsResult};
use crate::identifier::QueryParams;
use crate::provider::ResourceKind;
use crate::resources::{
    AcmHandler, AlbHandler, EcrHandler, ElasticacheHandler, RdsHandler, ResourceHandler,
    SecretHandler, WafHandler,
};

/// Registry of resource handlers, one per [`ResourceKind`].
pub struct HandlerRegistry {
    handlers: HashMap<ResourceKind, Arc<dyn ResourceHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry with a handler for every built-in kind.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(RdsHandler));
        registry.register(Arc::new(ElasticacheHandler));
        registry.register(Arc::new(AlbHandler));
        registry.register(Arc::new(EcrHandler));
        registry.register(Arc::new(SecretHandler));
        registry.register(Arc::new(AcmHandler));
        registry.register(Arc::new(WafHandler));
        registry
    }

    /// Register a handler, replacing any existing one for its kind.
    pub fn register(&mut self, handler: Arc<dyn ResourceHandler>) {
        let kind = handler.kind();
        debug!(resource_type = %kind, "Registering handler");
        self.handlers.insert(kind, handler);
    }

    /// Handler for a resource-type name.
    pub fn get(&self, resource_type: &str) -> AwsResult<Arc<dyn ResourceHandler>> {
        ResourceKind::from_name(resource_type)
            .and_then(|kind| self.handlers.get(&kind).cloned())
            .ok_or_else(|| AwsError::UnsupportedResourceType(resource_type.to_string()))
    }

    pub fn contains(&self, resource_type: &str) -> bool {
        self.get(resource_type).is_ok()
    }

    /// Check type support and required parameters without a session.
    pub fn check_params(&self, resource_type: &str, query: &QueryParams) -> AwsResult<()> {
        let handler = self.get(resource_type)?;
        let missing = handler.missing_params(query);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AwsError::MissingParameter {
                resource_type: resource_type.to_string(),
                params: missing,
            })
        }
    }

    /// Registered type names in alphabetical order.
    pub fn supported_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().map(|k| k.as_str().to_string()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.supported_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_all_kinds() {
        let registry = HandlerRegistry::standard();
        assert_eq!(registry.len(), ResourceKind::all().len());
        for kind in ResourceKind::all() {
            assert_eq!(registry.get(kind.as_str()).unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_unknown_type_is_error() {
        let registry = HandlerRegistry::standard();
        assert!(matches!(
            registry.get("dynamodb"),
            Err(AwsError::UnsupportedResourceType(t)) if t == "dynamodb"
        ));
        assert!(!HandlerRegistry::new().contains("rds"));
    }

    #[test]
    fn test_check_params() {
        let registry = HandlerRegistry::standard();
        assert!(registry
            .check_params("elasticache", &QueryParams::new().with("cluster", "c"))
            .is_ok());

        let err = registry
            .check_params("elasticache", &QueryParams::new().with("name", "c"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required parameters for elasticache: cluster"
        );
    }

    #[test]
    fn test_supported_types_sorted() {
        let registry = HandlerRegistry::standard();
        assert_eq!(
            registry.supported_types(),
            vec!["acm", "alb", "ecr", "elasticache", "rds", "secret", "waf"]
        );
    }
}
