//! Classified role memberships of one credential.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use super::role::{BasicRole, LegacyRole, PermissionRole, Region, Role};

/// The roles of a credential, parsed once into typed [`Role`] values.
///
/// Group names outside the known vocabulary are kept aside as
/// `unrecognized` so they can be reported, but they never grant anything.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct RoleSet {
    roles: BTreeSet<Role>,
    unrecognized: BTreeSet<String>,
}

impl RoleSet {
    /// Classify raw group names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = RoleSet::default();
        for name in names {
            let name = name.as_ref();
            match Role::from_str(name) {
                Ok(role) => {
                    set.roles.insert(role);
                }
                Err(err) => {
                    warn!(
                        event = "Roles",
                        phase = "Classified",
                        role = name,
                        problem = err.to_string()
                    );
                    set.unrecognized.insert(name.to_string());
                }
            }
        }
        set
    }

    /// Demote every legacy `_All` role to an unrecognized name.
    pub fn without_legacy(mut self) -> Self {
        let (legacy, rest): (BTreeSet<Role>, BTreeSet<Role>) = self
            .roles
            .into_iter()
            .partition(|role| matches!(role, Role::Legacy(_)));
        self.unrecognized
            .extend(legacy.iter().map(|role| role.to_string()));
        self.roles = rest;
        self
    }

    /// True when no role at all is present, recognized or not.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.unrecognized.is_empty()
    }

    /// Number of recognized roles.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn contains(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    /// Membership test by raw group name.
    pub fn contains_name(&self, name: &str) -> bool {
        match Role::from_str(name) {
            Ok(role) => self.roles.contains(&role) || self.unrecognized.contains(name),
            Err(_) => self.unrecognized.contains(name),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }

    pub fn unrecognized(&self) -> &BTreeSet<String> {
        &self.unrecognized
    }

    /// Every group name, recognized or not, sorted.
    pub fn names(&self) -> Vec<String> {
        self.roles
            .iter()
            .map(|role| role.to_string())
            .chain(self.unrecognized.iter().cloned())
            .sorted()
            .collect()
    }

    /// Permission roles held directly, excluding legacy roles.
    pub fn permission_roles(&self) -> impl Iterator<Item = PermissionRole> + '_ {
        self.roles.iter().filter_map(|role| match role {
            Role::Permission(p) => Some(*p),
            _ => None,
        })
    }

    pub fn legacy_roles(&self) -> impl Iterator<Item = LegacyRole> + '_ {
        self.roles.iter().filter_map(|role| match role {
            Role::Legacy(l) => Some(*l),
            _ => None,
        })
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.roles.iter().filter_map(|role| match role {
            Role::Region(r) => Some(r),
            _ => None,
        })
    }

    pub fn basic_roles(&self) -> impl Iterator<Item = BasicRole> + '_ {
        self.roles.iter().filter_map(|role| match role {
            Role::Basic(b) => Some(*b),
            _ => None,
        })
    }

    pub fn has_system_admin(&self) -> bool {
        self.roles.iter().any(Role::is_system_admin)
    }

    pub fn has_region_role(&self) -> bool {
        self.regions().next().is_some()
    }

    pub fn has_legacy_role(&self) -> bool {
        self.legacy_roles().next().is_some()
    }

    pub fn has_basic_role(&self) -> bool {
        self.basic_roles().next().is_some()
    }
}

impl Display for RoleSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "[{}]", self.names().join(", "))
    }
}

impl Serialize for RoleSet {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ser.collect_seq(self.names())
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D>(de: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let names = Vec::<String>::deserialize(de)?;
        Ok(RoleSet::from_names(names))
    }
}

impl<S: AsRef<str>> FromIterator<S> for RoleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        RoleSet::from_names(iter)
    }
}
