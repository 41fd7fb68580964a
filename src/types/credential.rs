//! Per-request identity taken from a bearer token.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use super::role_set::RoleSet;

/// Subject email plus the classified role memberships of one request.
///
/// Built fresh for every request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    subject_email: String,
    roles: RoleSet,
}

impl Credential {
    pub fn new<I, S>(subject_email: impl Into<String>, role_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Credential {
            subject_email: subject_email.into(),
            roles: RoleSet::from_names(role_names),
        }
    }

    pub fn from_role_set(subject_email: impl Into<String>, roles: RoleSet) -> Self {
        Credential {
            subject_email: subject_email.into(),
            roles,
        }
    }

    pub fn subject_email(&self) -> &str {
        &self.subject_email
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    pub(crate) fn map_roles(self, f: impl FnOnce(RoleSet) -> RoleSet) -> Self {
        Credential {
            subject_email: self.subject_email,
            roles: f(self.roles),
        }
    }
}

impl Display for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}{}", self.subject_email, self.roles)
    }
}
