//! # kf_aws
//!
//! AWS resource reference resolution for kustforge.
//!
//! Templates embed references such as
//! `aws:role=deploy:rds:name=mydb,attr=endpoint`. This crate parses them,
//! derives a session for the requested account/role, routes the lookup to a
//! typed handler and memoizes the answer.
//!
//! ## Features
//!
//! - Reference grammar parsing (`aws:[role=<name>:]<type>:<k>=<v>,...`)
//! - Role/account/profile mappings loaded from YAML
//! - Session memoization per `account:role` pair with role assumption
//! - Handlers for RDS, ElastiCache, ALB, ECR, Secrets Manager, ACM and WAF
//! - A caching decorator that never stores "no value"
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kf_aws::{AwsConfig, AwsResourceResolver, CachedResolver, ResourceResolver, SessionManager};
//! use kf_runner::{CliRunner, CliRunnerOptions};
//!
//! let runner = Arc::new(CliRunner::new(CliRunnerOptions::default()));
//! let config = AwsConfig::load(Some("aws-config.yaml".as_ref()));
//! let sessions = SessionManager::new("us-east-1", config, runner);
//! let mut resolver = CachedResolver::new(AwsResourceResolver::new(sessions));
//!
//! let reference = resolver.parse_identifier("aws:rds:name=mydb,attr=endpoint").unwrap();
//! let endpoint = resolver.resolve_identifier(&reference).unwrap();
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod identifier;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod resources;
pub mod session;

pub use cache::{CacheKey, CachedResolver};
pub use config::{resolve_region, AwsConfig, DEFAULT_REGION};
pub use error::{AwsError, AwsResult};
pub use identifier::{parse_identifier, QueryParams, ResourceIdentifier};
pub use provider::ResourceKind;
pub use registry::HandlerRegistry;
pub use resolver::{AwsResourceResolver, ResourceResolver};
pub use resources::ResourceHandler;
pub use session::{
    AwsSession, CredentialExchange, SessionAuth, SessionManager, StsExchange, TemporaryCredentials,
};
