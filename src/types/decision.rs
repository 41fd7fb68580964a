//! Authorization decision types with denial diagnostics.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display as StrumDisplay, EnumString};
use utoipa::ToSchema;

/// Why a permission check was denied.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    StrumDisplay,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeniedReason {
    /// No permission role (or legacy role) is present.
    NoValidPermissionRole,
    /// Permission roles are present but grant none of the required permissions.
    PermissionMismatch,
    /// A permission role is present without any region role.
    MissingRegionRole,
    /// Only basic roles are present and the request is not self-service.
    InsufficientBasicRole,
    /// The credential carries group names outside the role vocabulary.
    UnrecognizedRole,
}

/// What satisfied an allowed permission check.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    StrumDisplay,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GrantBasis {
    SystemAdmin,
    SelfService,
    PermissionRole,
}

/// Outcome of one permission check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct PermissionDecision {
    pub authorized: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granted_by: Option<GrantBasis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denied_reason: Option<DeniedReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_element: Option<String>,
}

impl PermissionDecision {
    pub fn allow(basis: GrantBasis) -> Self {
        PermissionDecision {
            authorized: true,
            granted_by: Some(basis),
            denied_reason: None,
            missing_element: None,
        }
    }

    pub fn deny(reason: DeniedReason) -> Self {
        PermissionDecision {
            authorized: false,
            granted_by: None,
            denied_reason: Some(reason),
            missing_element: None,
        }
    }

    pub fn with_missing(mut self, element: impl Into<String>) -> Self {
        self.missing_element = Some(element.into());
        self
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }
}

impl Display for PermissionDecision {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match (self.granted_by, self.denied_reason) {
            (Some(basis), _) if self.authorized => write!(f, "Allow({basis})"),
            (_, Some(reason)) => write!(f, "Deny({reason})"),
            _ if self.authorized => write!(f, "Allow"),
            _ => write!(f, "Deny"),
        }
    }
}
