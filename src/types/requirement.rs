//! The permissions an operation requires.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumString};
use utoipa::ToSchema;

use crate::error::AuthzError;

/// How multiple required permissions combine.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    StrumDisplay,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequirementMode {
    /// Holding any one of the permissions is sufficient.
    #[default]
    Any,
    /// Every permission must be held.
    All,
}

/// A non-empty set of abstract permissions plus how they combine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct RequiredPermissions {
    mode: RequirementMode,
    permissions: BTreeSet<String>,
}

impl RequiredPermissions {
    pub fn new<I, S>(mode: RequirementMode, permissions: I) -> Result<Self, AuthzError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let permissions: BTreeSet<String> = permissions
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| !p.trim().is_empty())
            .collect();
        if permissions.is_empty() {
            return Err(AuthzError::EmptyRequirement);
        }
        Ok(RequiredPermissions { mode, permissions })
    }

    /// Satisfied by any one of `permissions`.
    pub fn any_of<I, S>(permissions: I) -> Result<Self, AuthzError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(RequirementMode::Any, permissions)
    }

    /// Satisfied only by all of `permissions`.
    pub fn all_of<I, S>(permissions: I) -> Result<Self, AuthzError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(RequirementMode::All, permissions)
    }

    pub fn mode(&self) -> RequirementMode {
        self.mode
    }

    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.permissions
    }

    pub fn is_satisfied_by<'a, I>(&self, granted: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let granted: BTreeSet<&str> = granted.into_iter().collect();
        match self.mode {
            RequirementMode::Any => self
                .permissions
                .iter()
                .any(|p| granted.contains(p.as_str())),
            RequirementMode::All => self
                .permissions
                .iter()
                .all(|p| granted.contains(p.as_str())),
        }
    }

    /// Required permissions absent from `granted`, sorted.
    pub fn missing_from<'a, I>(&self, granted: I) -> Vec<&str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let granted: BTreeSet<&str> = granted.into_iter().collect();
        self.permissions
            .iter()
            .map(String::as_str)
            .filter(|p| !granted.contains(*p))
            .collect()
    }
}

impl Display for RequiredPermissions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let joined = self.permissions.iter().join(", ");
        match self.mode {
            RequirementMode::Any => write!(f, "any of [{joined}]"),
            RequirementMode::All => write!(f, "all of [{joined}]"),
        }
    }
}

impl TryFrom<&str> for RequiredPermissions {
    type Error = AuthzError;

    fn try_from(permission: &str) -> Result<Self, Self::Error> {
        RequiredPermissions::any_of([permission])
    }
}
