//! Static role catalog: which abstract permissions each role grants.
//!
//! Every lookup is total. Unknown names yield an empty set, `false` or
//! `None`; use [`Role::from_str`](std::str::FromStr) for strict parsing.

use std::collections::BTreeSet;
use std::str::FromStr;

use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::types::{Capability, Domain, LegacyRole, PermissionRole, Region, Role};

/// Modern equivalent of a legacy `_All` role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LegacyMapping {
    pub permission_role: PermissionRole,
    pub implies_full_region: bool,
}

/// Read-only lookups over the role vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleCatalog;

impl RoleCatalog {
    /// Permissions granted by a permission role name; empty for anything else.
    pub fn permissions_of(role_name: &str) -> BTreeSet<&'static str> {
        match PermissionRole::from_str(role_name) {
            Ok(role) => granted_permissions(role).iter().copied().collect(),
            Err(_) => BTreeSet::new(),
        }
    }

    pub fn is_region_role(role_name: &str) -> bool {
        Region::from_str(role_name).is_ok()
    }

    /// `"all"` for `Regio_All`, otherwise the suffix after `Regio_`.
    pub fn region_name_of(role_name: &str) -> Option<String> {
        Region::from_str(role_name)
            .ok()
            .map(|region| region.name().to_string())
    }

    pub fn is_system_admin_role(role_name: &str) -> bool {
        PermissionRole::from_str(role_name).is_ok_and(|role| role.is_system_admin())
    }

    /// Translate a legacy `_All` role name into its canonical permission role.
    pub fn is_legacy_role(role_name: &str) -> Option<LegacyMapping> {
        LegacyRole::from_str(role_name)
            .ok()
            .map(|legacy| Self::legacy_mapping(&legacy))
    }

    pub fn legacy_mapping(legacy: &LegacyRole) -> LegacyMapping {
        LegacyMapping {
            permission_role: legacy.canonical(),
            implies_full_region: true,
        }
    }

    /// True for any name in the role vocabulary.
    pub fn is_known_role(role_name: &str) -> bool {
        Role::from_str(role_name).is_ok()
    }

    /// Every permission role in the catalog.
    pub fn all_permission_roles() -> Vec<PermissionRole> {
        Domain::iter()
            .cartesian_product(Capability::iter())
            .map(|(domain, capability)| PermissionRole::domain(domain, capability))
            .chain([
                PermissionRole::MembersStatusApprove,
                PermissionRole::SystemCrud,
                PermissionRole::SystemUserManagement,
                PermissionRole::SystemLogsRead,
            ])
            .collect()
    }

    /// Every abstract permission any catalog role can grant.
    pub fn all_permissions() -> BTreeSet<&'static str> {
        Self::all_permission_roles()
            .into_iter()
            .flat_map(|role| granted_permissions(role).iter().copied())
            .collect()
    }
}

/// The permission table.
pub(crate) fn granted_permissions(role: PermissionRole) -> &'static [&'static str] {
    use Capability::*;
    use Domain::*;

    match role {
        PermissionRole::Domain { domain, capability } => match (domain, capability) {
            (Members, Crud) => &[
                "members_create",
                "members_read",
                "members_update",
                "members_delete",
                "members_list",
            ],
            (Members, Read) => &["members_read", "members_list"],
            (Members, Export) => &["members_read", "members_list", "members_export"],
            (Events, Crud) => &[
                "events_create",
                "events_read",
                "events_update",
                "events_delete",
                "events_list",
            ],
            (Events, Read) => &["events_read", "events_list"],
            (Events, Export) => &["events_read", "events_list", "events_export"],
            (Products, Crud) => &[
                "products_create",
                "products_read",
                "products_update",
                "products_delete",
                "products_list",
            ],
            (Products, Read) => &["products_read", "products_list"],
            (Products, Export) => &["products_read", "products_list", "products_export"],
            (Communication, Crud) => &[
                "communication_create",
                "communication_read",
                "communication_update",
                "communication_delete",
                "communication_list",
            ],
            (Communication, Read) => &["communication_read", "communication_list"],
            (Communication, Export) => &[
                "communication_read",
                "communication_list",
                "communication_export",
            ],
        },
        PermissionRole::MembersStatusApprove => {
            &["members_read", "members_list", "members_status_approve"]
        }
        PermissionRole::SystemCrud => &[
            "system_create",
            "system_read",
            "system_update",
            "system_delete",
        ],
        PermissionRole::SystemUserManagement => &["users_manage", "roles_assign", "system_read"],
        PermissionRole::SystemLogsRead => &["system_logs_read"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        members_crud = { "Members_CRUD", &["members_create", "members_delete", "members_list", "members_read", "members_update"] },
        members_read = { "Members_Read", &["members_list", "members_read"] },
        events_export = { "Events_Export", &["events_export", "events_list", "events_read"] },
        status_approve = { "Members_Status_Approve", &["members_list", "members_read", "members_status_approve"] },
        logs = { "System_Logs_Read", &["system_logs_read"] },
        legacy_is_not_permission_role = { "Members_CRUD_All", &[] },
        region = { "Regio_All", &[] },
        basic = { "hdcnLeden", &[] },
        unknown = { "Webmasters", &[] },
    )]
    fn test_permissions_of(role: &str, expected: &[&str]) {
        let perms: Vec<&str> = RoleCatalog::permissions_of(role).into_iter().collect();
        assert_eq!(perms, expected);
    }

    #[test]
    fn test_domain_permissions_use_domain_prefix() {
        for role in RoleCatalog::all_permission_roles() {
            if let PermissionRole::Domain { domain, .. } = role {
                for perm in granted_permissions(role) {
                    assert!(
                        perm.starts_with(domain.permission_prefix()),
                        "{perm} does not belong to {domain}"
                    );
                }
            }
        }
    }

    #[parameterized(
        all = { "Regio_All", Some("all") },
        named = { "Regio_Groningen/Drenthe", Some("Groningen/Drenthe") },
        empty = { "Regio_", None },
        permission = { "Members_CRUD", None },
    )]
    fn test_region_name_of(role: &str, expected: Option<&str>) {
        assert_eq!(RoleCatalog::region_name_of(role).as_deref(), expected);
        assert_eq!(RoleCatalog::is_region_role(role), expected.is_some());
    }

    #[parameterized(
        system_crud = { "System_CRUD", true },
        system_users = { "System_User_Management", true },
        system_logs = { "System_Logs_Read", true },
        members_crud = { "Members_CRUD", false },
        regio_all = { "Regio_All", false },
        lookalike = { "System_CRUD_All", false },
    )]
    fn test_is_system_admin_role(role: &str, expected: bool) {
        assert_eq!(RoleCatalog::is_system_admin_role(role), expected);
    }

    #[parameterized(
        crud = { "Members_CRUD_All", Some("Members_CRUD") },
        read = { "Events_Read_All", Some("Events_Read") },
        export = { "Communication_Export_All", Some("Communication_Export") },
        modern = { "Members_CRUD", None },
        unknown_domain = { "Finance_CRUD_All", None },
    )]
    fn test_is_legacy_role(role: &str, expected: Option<&str>) {
        let mapping = RoleCatalog::is_legacy_role(role);
        assert_eq!(
            mapping.map(|m| m.permission_role.to_string()).as_deref(),
            expected
        );
        if let Some(mapping) = mapping {
            assert!(mapping.implies_full_region);
        }
    }

    #[test]
    fn test_catalog_enumeration() {
        assert_eq!(RoleCatalog::all_permission_roles().len(), 16);
        let all = RoleCatalog::all_permissions();
        assert!(all.contains("members_create"));
        assert!(all.contains("system_logs_read"));
        assert!(!all.contains("members_self_read"));
    }

    #[test]
    fn test_every_catalog_role_round_trips() {
        for role in RoleCatalog::all_permission_roles() {
            let name = role.to_string();
            assert_eq!(PermissionRole::from_str(&name), Ok(role));
            assert!(RoleCatalog::is_known_role(&name));
            assert!(!RoleCatalog::permissions_of(&name).is_empty());
        }
    }
}
