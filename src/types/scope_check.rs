//! Result of checking one resource against an access scope.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumString};
use utoipa::ToSchema;

/// Why a resource fell outside the caller's scope.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, StrumDisplay, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScopeDenial {
    /// The resource's region is not one the caller may act in.
    RegionMismatch,
    /// The resource has no region tag, so ownership cannot be verified.
    ResourceRegionMissing,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct ScopeCheck {
    pub can_access: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denial: Option<ScopeDenial>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ScopeCheck {
    pub fn allowed() -> Self {
        ScopeCheck {
            can_access: true,
            denial: None,
            message: None,
        }
    }

    pub fn denied(denial: ScopeDenial, message: impl Into<String>) -> Self {
        ScopeCheck {
            can_access: false,
            denial: Some(denial),
            message: Some(message.into()),
        }
    }
}

impl Display for ScopeCheck {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match (&self.denial, &self.message) {
            _ if self.can_access => write!(f, "Allow"),
            (Some(denial), Some(message)) => write!(f, "Deny({denial}: {message})"),
            (Some(denial), None) => write!(f, "Deny({denial})"),
            _ => write!(f, "Deny"),
        }
    }
}
