//! Typed role names as carried in Cognito group memberships.
//!
//! Canonical group name forms:
//! - Permission role: `Members_CRUD`, `Events_Read`, `Members_Status_Approve`, `System_CRUD`
//! - Legacy role: `Members_CRUD_All` (permission plus implicit full region)
//! - Region role: `Regio_All` or `Regio_<name>`, e.g. `Regio_Groningen/Drenthe`
//! - Basic role: `hdcnLeden`, `verzoek_lid`

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum_macros::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

use crate::error::AuthzError;

/// Sentinel region name used when a scope covers every region.
pub const ALL_REGIONS: &str = "all";

/// Prefix shared by every region role.
pub const REGION_ROLE_PREFIX: &str = "Regio_";

static REGION_ROLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Regio_(?P<name>.+)$").expect("region role pattern is valid"));

static LEGACY_ROLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<domain>[A-Za-z]+)_(?P<capability>CRUD|Read|Export)_All$")
        .expect("legacy role pattern is valid")
});

/// Business domain a permission role applies to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, StrumDisplay, EnumString, EnumIter, AsRefStr,
)]
pub enum Domain {
    Members,
    Events,
    Products,
    Communication,
}

impl Domain {
    /// Lowercase prefix used for the abstract permissions of this domain.
    pub fn permission_prefix(&self) -> &'static str {
        match self {
            Domain::Members => "members",
            Domain::Events => "events",
            Domain::Products => "products",
            Domain::Communication => "communication",
        }
    }
}

/// Capability level of a domain permission role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, StrumDisplay, EnumString, EnumIter, AsRefStr,
)]
pub enum Capability {
    #[strum(serialize = "CRUD")]
    Crud,
    Read,
    Export,
}

/// A role from the fixed permission catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PermissionRole {
    Domain {
        domain: Domain,
        capability: Capability,
    },
    MembersStatusApprove,
    SystemCrud,
    SystemUserManagement,
    SystemLogsRead,
}

impl PermissionRole {
    pub fn domain(domain: Domain, capability: Capability) -> Self {
        PermissionRole::Domain { domain, capability }
    }

    /// System administrator roles bypass every region requirement.
    pub fn is_system_admin(&self) -> bool {
        matches!(
            self,
            PermissionRole::SystemCrud
                | PermissionRole::SystemUserManagement
                | PermissionRole::SystemLogsRead
        )
    }
}

impl Display for PermissionRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PermissionRole::Domain { domain, capability } => write!(f, "{domain}_{capability}"),
            PermissionRole::MembersStatusApprove => write!(f, "Members_Status_Approve"),
            PermissionRole::SystemCrud => write!(f, "System_CRUD"),
            PermissionRole::SystemUserManagement => write!(f, "System_User_Management"),
            PermissionRole::SystemLogsRead => write!(f, "System_Logs_Read"),
        }
    }
}

impl FromStr for PermissionRole {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Members_Status_Approve" => return Ok(PermissionRole::MembersStatusApprove),
            "System_CRUD" => return Ok(PermissionRole::SystemCrud),
            "System_User_Management" => return Ok(PermissionRole::SystemUserManagement),
            "System_Logs_Read" => return Ok(PermissionRole::SystemLogsRead),
            _ => {}
        }

        let unrecognized = || AuthzError::UnrecognizedRole(s.to_string());
        let (domain, capability) = s.split_once('_').ok_or_else(unrecognized)?;
        let domain = Domain::from_str(domain).map_err(|_| unrecognized())?;
        let capability = Capability::from_str(capability).map_err(|_| unrecognized())?;
        Ok(PermissionRole::Domain { domain, capability })
    }
}

/// A deprecated `<Domain>_<Capability>_All` role.
///
/// It grants the same permissions as its canonical [`PermissionRole`] and
/// implies access to every region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LegacyRole {
    pub domain: Domain,
    pub capability: Capability,
}

impl LegacyRole {
    /// The modern permission role this legacy role stands in for.
    pub fn canonical(&self) -> PermissionRole {
        PermissionRole::domain(self.domain, self.capability)
    }
}

impl Display for LegacyRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}_{}_All", self.domain, self.capability)
    }
}

impl FromStr for LegacyRole {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unrecognized = || AuthzError::UnrecognizedRole(s.to_string());
        let caps = LEGACY_ROLE.captures(s).ok_or_else(unrecognized)?;
        let domain = Domain::from_str(&caps["domain"]).map_err(|_| unrecognized())?;
        let capability = Capability::from_str(&caps["capability"]).map_err(|_| unrecognized())?;
        Ok(LegacyRole { domain, capability })
    }
}

/// Roles that only grant self-service access to the caller's own record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    StrumDisplay,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum BasicRole {
    /// An authenticated club member.
    #[serde(rename = "hdcnLeden")]
    #[strum(serialize = "hdcnLeden")]
    HdcnLeden,
    /// A membership applicant.
    #[serde(rename = "verzoek_lid")]
    #[strum(serialize = "verzoek_lid")]
    VerzoekLid,
}

/// Geographic scope granted by a `Regio_*` role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    All,
    Named(String),
}

impl Region {
    /// `"all"` for `Regio_All`, otherwise the region identifier.
    pub fn name(&self) -> &str {
        match self {
            Region::All => ALL_REGIONS,
            Region::Named(name) => name,
        }
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Region::All => write!(f, "{REGION_ROLE_PREFIX}All"),
            Region::Named(name) => write!(f, "{REGION_ROLE_PREFIX}{name}"),
        }
    }
}

impl FromStr for Region {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = REGION_ROLE.captures(s).ok_or_else(|| {
            AuthzError::InvalidRegionRole(format!("'{s}' does not match Regio_<name>"))
        })?;
        let name = &caps["name"];

        if name.trim().is_empty() {
            return Err(AuthzError::InvalidRegionRole(format!(
                "'{s}' has an empty region name"
            )));
        }
        if name.trim() != name {
            return Err(AuthzError::InvalidRegionRole(format!(
                "'{s}' has whitespace around the region name"
            )));
        }
        if name == "All" {
            return Ok(Region::All);
        }
        // `all` is reserved for the full-access sentinel.
        if name.eq_ignore_ascii_case(ALL_REGIONS) {
            return Err(AuthzError::InvalidRegionRole(format!(
                "'{s}' is ambiguous, use Regio_All"
            )));
        }
        Ok(Region::Named(name.to_string()))
    }
}

/// Any recognized role name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Permission(PermissionRole),
    Legacy(LegacyRole),
    Region(Region),
    Basic(BasicRole),
}

impl Role {
    pub fn is_system_admin(&self) -> bool {
        matches!(self, Role::Permission(role) if role.is_system_admin())
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Role::Permission(role) => write!(f, "{role}"),
            Role::Legacy(role) => write!(f, "{role}"),
            Role::Region(region) => write!(f, "{region}"),
            Role::Basic(role) => write!(f, "{role}"),
        }
    }
}

impl FromStr for Role {
    type Err = AuthzError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with(REGION_ROLE_PREFIX) {
            return Region::from_str(s).map(Role::Region);
        }
        if let Ok(role) = BasicRole::from_str(s) {
            return Ok(Role::Basic(role));
        }
        if let Ok(role) = LegacyRole::from_str(s) {
            return Ok(Role::Legacy(role));
        }
        PermissionRole::from_str(s).map(Role::Permission)
    }
}

impl Serialize for Role {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ser.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(de: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(de)?;
        Role::from_str(&name).map_err(D::Error::custom)
    }
}
