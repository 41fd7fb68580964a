//! Regional access resolution.

use tracing::debug;

use crate::types::{AccessScope, Region, RoleSet};

/// Compute the regional scope a role set grants. Total and pure.
///
/// First match wins:
/// 1. a system admin role gives full access;
/// 2. `Regio_All` gives full access, whatever other regions are present;
/// 3. a legacy `_All` role gives full access;
/// 4. otherwise the named `Regio_<x>` roles form the scope;
/// 5. no region role yields an empty scope.
///
/// An empty scope alongside a permission role is an incomplete role
/// structure; the permission evaluator denies that case.
pub fn resolve_access_scope(roles: &RoleSet) -> AccessScope {
    let scope = if roles.has_system_admin()
        || roles.regions().any(|r| *r == Region::All)
        || roles.has_legacy_role()
    {
        AccessScope::full()
    } else {
        AccessScope::regions(roles.regions().map(|r| r.name().to_string()))
    };

    debug!(
        event = "Scope",
        phase = "Resolved",
        roles = roles.to_string(),
        scope = scope.to_string()
    );
    scope
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        system_admin = { &["System_CRUD"], true, &["all"] },
        system_admin_with_region = { &["System_User_Management", "Regio_Utrecht"], true, &["all"] },
        regio_all = { &["Members_CRUD", "Regio_All"], true, &["all"] },
        regio_all_wins_over_named = { &["Members_Read", "Regio_Utrecht", "Regio_All"], true, &["all"] },
        legacy = { &["Members_CRUD_All"], true, &["all"] },
        legacy_with_named = { &["Events_Read_All", "Regio_Limburg"], true, &["all"] },
        named = { &["Members_CRUD", "Regio_Utrecht"], false, &["Utrecht"] },
        multiple_named = { &["Members_CRUD", "Regio_Utrecht", "Regio_Groningen/Drenthe"], false, &["Groningen/Drenthe", "Utrecht"] },
        region_only = { &["Regio_Limburg"], false, &["Limburg"] },
        no_region = { &["Members_CRUD"], false, &[] },
        nothing = { &[], false, &[] },
        basic_only = { &["hdcnLeden"], false, &[] },
    )]
    fn test_resolve_access_scope(roles: &[&str], full: bool, regions: &[&str]) {
        let scope = resolve_access_scope(&RoleSet::from_names(roles));
        assert_eq!(scope.has_full_access, full);
        assert_eq!(
            scope.allowed_regions.iter().map(String::as_str).collect::<Vec<_>>(),
            regions
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let roles = RoleSet::from_names(["Regio_Utrecht", "Members_CRUD", "Regio_Limburg"]);
        assert_eq!(resolve_access_scope(&roles), resolve_access_scope(&roles));
    }
}
