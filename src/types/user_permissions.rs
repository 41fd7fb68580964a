//! Effective permission summaries and role-structure findings.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::access_scope::AccessScope;

/// Everything a credential is entitled to, flattened for display or audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserPermissions {
    pub subject: String,
    pub is_system_admin: bool,
    /// Group names, sorted.
    pub roles: Vec<String>,
    /// Abstract permissions granted by permission and legacy roles, sorted.
    pub permissions: Vec<String>,
    /// Self-service permissions granted by basic roles, sorted.
    pub self_service: Vec<String>,
    pub scope: AccessScope,
}

impl UserPermissions {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
            || self.self_service.iter().any(|p| p == permission)
    }

    pub fn is_empty(&self) -> bool {
        !self.is_system_admin && self.permissions.is_empty() && self.self_service.is_empty()
    }
}

/// A problem with how a credential's roles are put together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum StructureIssue {
    /// A non-admin permission role with no region role alongside it.
    PermissionWithoutRegion { role: String },
    /// Region roles present but nothing for them to scope.
    RegionWithoutPermission { region: String },
    /// A deprecated `_All` role that should be migrated.
    LegacyRole { role: String, replacement: String },
    /// A group name outside the role vocabulary.
    UnrecognizedRole { role: String },
}

impl Display for StructureIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StructureIssue::PermissionWithoutRegion { role } => {
                write!(f, "permission role '{role}' has no region role")
            }
            StructureIssue::RegionWithoutPermission { region } => {
                write!(f, "region role '{region}' has no permission role to scope")
            }
            StructureIssue::LegacyRole { role, replacement } => {
                write!(f, "legacy role '{role}' should become '{replacement}' + Regio_All")
            }
            StructureIssue::UnrecognizedRole { role } => {
                write!(f, "unrecognized role '{role}'")
            }
        }
    }
}
