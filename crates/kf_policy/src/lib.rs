//! # kf_policy
//!
//! Validation gate run before generated manifests are written.
//!
//! - **Structural checks**: one mapping document with `apiVersion`, `kind`
//!   and a `metadata` mapping carrying `name`
//! - **Cluster checks**: optional `kubectl apply --dry-run=server`, reported
//!   as warnings
//! - **Unresolved references**: placeholders still present after processing
//!
//! ## Example
//!
//! ```rust
//! use kf_policy::ManifestValidator;
//!
//! let validator = ManifestValidator::new();
//! let errors = validator.validate_manifest("kind: Service\n");
//! assert_eq!(errors, vec!["Missing required fields: apiVersion, metadata"]);
//! ```

pub mod error;
pub mod report;
pub mod validator;

pub use error::{PolicyError, PolicyResult};
pub use report::{ChangeValidation, ValidationReport};
pub use validator::{ManifestValidator, REQUIRED_FIELDS};
