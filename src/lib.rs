//! Permission and regional-access evaluation for the H-DCN membership backend.
//!
//! Callers hand [`AccessEngine::authorize`] the raw `Authorization` header and
//! the permissions a handler needs; the engine extracts the Cognito groups,
//! classifies them into roles, evaluates the requirement and resolves the
//! caller's regional scope.
//!
//! ```rust
//! use hdcn_authz::{AccessEngine, RequiredPermissions};
//!
//! let engine = AccessEngine::new();
//! let required = RequiredPermissions::any_of(["members_read"]).unwrap();
//! let outcome = engine.authorize(None, &required);
//! assert_eq!(outcome.error_response().map(|e| e.status_code), Some(401));
//! ```
pub use catalog::{LegacyMapping, RoleCatalog};
pub use config::{EngineConfig, SelfServiceTable, default_self_service};
pub use engine::AccessEngine;
pub use error::{AuthzError, CredentialError, CredentialErrorKind};
pub use evaluator::{PermissionEvaluator, REGION_REQUIRED};
pub use extractor::{CredentialExtractor, authorization_header};
pub use guard::{check_resource_access, filter_accessible};
pub use loader::{compile_config, validate_config};
pub use resolver::resolve_access_scope;
pub use traits::{ClaimsVerifier, TrustUpstream};
pub use types::*;

mod catalog;
mod config;
mod engine;
mod error;
mod evaluator;
mod extractor;
mod guard;
mod loader;
mod resolver;
mod timers;
mod traits;
mod types;

#[cfg(feature = "observability")]
pub mod metrics;

#[cfg(test)]
mod tests;
