//! Data model for credentials, roles, scopes and decisions.
//!
//! Canonical string forms:
//! - Role: the Cognito group name, e.g. `Members_CRUD`, `Regio_Utrecht`, `hdcnLeden`
//! - Credential: `email[Role1, Role2]`
//! - Scope: `Full` or `[Region1, Region2]`
//! - Decision: `Allow(basis)` or `Deny(reason)`

mod access_scope;
mod credential;
mod decision;
mod requirement;
mod response;
mod role;
mod role_set;
mod scope_check;
mod user_permissions;

pub use access_scope::AccessScope;
pub use credential::Credential;
pub use decision::{DeniedReason, GrantBasis, PermissionDecision};
pub use requirement::{RequiredPermissions, RequirementMode};
pub use response::{Authorization, ErrorResponse, STATUS_FORBIDDEN, STATUS_UNAUTHORIZED};
pub use role::{
    ALL_REGIONS, BasicRole, Capability, Domain, LegacyRole, PermissionRole, REGION_ROLE_PREFIX,
    Region, Role,
};
pub use role_set::RoleSet;
pub use scope_check::{ScopeCheck, ScopeDenial};
pub use user_permissions::{StructureIssue, UserPermissions};
