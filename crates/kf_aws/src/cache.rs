//! Memoizing decorator around a [`ResourceResolver`].

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::AwsResult;
use crate::identifier::{QueryParams, ResourceIdentifier};
use crate::resolver::ResourceResolver;

/// Key of a resolved value:
/// `{account|default}:{role|default}:{type}:{query as JSON}`.
///
/// The query is serialized in insertion order, so the same parameters in a
/// different order produce a different key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(
        resource_type: &str,
        query: &QueryParams,
        account_id: Option<&str>,
        role_name: Option<&str>,
    ) -> Self {
        Self(format!(
            "{}:{}:{}:{}",
            account_id.unwrap_or("default"),
            role_name.unwrap_or("default"),
            resource_type,
            query.to_json()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caches resolved values by [`CacheKey`].
///
/// Only values are stored; a lookup that produced no value or an error is
/// retried the next time it is requested.
#[derive(Debug)]
pub struct CachedResolver<R> {
    inner: R,
    cache: HashMap<CacheKey, String>,
    hits: usize,
    misses: usize,
}

impl<R: ResourceResolver> CachedResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl<R: ResourceResolver> ResourceResolver for CachedResolver<R> {
    fn parse_identifier(&self, identifier: &str) -> AwsResult<ResourceIdentifier> {
        self.inner.parse_identifier(identifier)
    }

    fn resolve(
        &mut self,
        resource_type: &str,
        query: &QueryParams,
        account_id: Option<&str>,
        role_name: Option<&str>,
    ) -> AwsResult<Option<String>> {
        let key = CacheKey::new(resource_type, query, account_id, role_name);
        if let Some(value) = self.cache.get(&key) {
            self.hits += 1;
            debug!(key = %key, "Cache hit");
            return Ok(Some(value.clone()));
        }

        self.misses += 1;
        let value = self.inner.resolve(resource_type, query, account_id, role_name)?;
        if let Some(value) = &value {
            self.cache.insert(key, value.clone());
        }
        Ok(value)
    }

    fn validate_reference(&self, identifier: &str) -> bool {
        self.inner.validate_reference(identifier)
    }

    fn supported_types(&self) -> Vec<String> {
        self.inner.supported_types()
    }
}
