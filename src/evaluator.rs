//! Permission evaluation over a classified role set.

use std::collections::BTreeSet;

use itertools::Itertools;
use tracing::{debug, info};

use crate::catalog::granted_permissions;
use crate::config::{EngineConfig, SelfServiceTable};
use crate::resolver::resolve_access_scope;
use crate::types::{
    DeniedReason, GrantBasis, PermissionDecision, PermissionRole, RequiredPermissions,
    RequirementMode, RoleSet, StructureIssue, UserPermissions,
};

/// Diagnostic attached to `missing_region_role` denials.
pub const REGION_REQUIRED: &str = "region assignment required (e.g. Regio_All or Regio_<name>)";

/// Decides whether a role set satisfies a permission requirement.
///
/// Pure: the same roles and requirement always produce the same decision.
#[derive(Debug, Clone)]
pub struct PermissionEvaluator {
    self_service: SelfServiceTable,
    reject_unrecognized: bool,
}

impl Default for PermissionEvaluator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl PermissionEvaluator {
    pub fn new(config: &EngineConfig) -> Self {
        PermissionEvaluator {
            self_service: config.self_service.clone(),
            reject_unrecognized: config.reject_unrecognized_roles,
        }
    }

    /// Evaluate `roles` against `required`. `subject` is used for logging only.
    pub fn evaluate(
        &self,
        roles: &RoleSet,
        required: &RequiredPermissions,
        subject: &str,
    ) -> PermissionDecision {
        let decision = self.decide(roles, required);

        debug!(
            event = "Permission",
            phase = "Decision",
            subject = subject,
            roles = roles.to_string(),
            required = required.to_string(),
            decision = decision.to_string()
        );
        if !decision.authorized {
            info!(
                event = "Permission",
                phase = "Denied",
                subject = subject,
                reason = decision.denied_reason.map(|r| r.to_string()),
                missing = decision.missing_element.as_deref()
            );
        }
        decision
    }

    fn decide(&self, roles: &RoleSet, required: &RequiredPermissions) -> PermissionDecision {
        if roles.has_system_admin() {
            return PermissionDecision::allow(GrantBasis::SystemAdmin);
        }

        if self.reject_unrecognized && !roles.unrecognized().is_empty() {
            return PermissionDecision::deny(DeniedReason::UnrecognizedRole).with_missing(format!(
                "known role names only, found [{}]",
                roles.unrecognized().iter().join(", ")
            ));
        }

        let held = held_permission_roles(roles);
        if held.is_empty() {
            let self_service = self.self_service_permissions(roles);
            let own_record_only = !self_service.is_empty()
                && required
                    .permissions()
                    .iter()
                    .all(|p| self_service.contains(p.as_str()));
            return if own_record_only {
                PermissionDecision::allow(GrantBasis::SelfService)
            } else if roles.has_basic_role() {
                PermissionDecision::deny(DeniedReason::InsufficientBasicRole)
                    .with_missing(format!("a permission role granting {required}"))
            } else {
                PermissionDecision::deny(DeniedReason::NoValidPermissionRole)
                    .with_missing("permission role required (e.g. Members_Read)")
            };
        }

        let granted: BTreeSet<&str> = held
            .iter()
            .flat_map(|(role, _)| granted_permissions(*role).iter().copied())
            .collect();
        if !required.is_satisfied_by(granted.iter().copied()) {
            let missing = match required.mode() {
                RequirementMode::Any => format!("one of [{}]", required.permissions().iter().join(", ")),
                RequirementMode::All => {
                    format!("[{}]", required.missing_from(granted.iter().copied()).join(", "))
                }
            };
            return PermissionDecision::deny(DeniedReason::PermissionMismatch).with_missing(missing);
        }

        let has_legacy = held.iter().any(|(_, legacy)| *legacy);
        if !has_legacy && !roles.has_region_role() {
            return PermissionDecision::deny(DeniedReason::MissingRegionRole)
                .with_missing(REGION_REQUIRED);
        }

        PermissionDecision::allow(GrantBasis::PermissionRole)
    }

    /// Self-service permissions granted by the basic roles in `roles`.
    pub fn self_service_permissions(&self, roles: &RoleSet) -> BTreeSet<&str> {
        roles
            .basic_roles()
            .filter_map(|role| self.self_service.get(&role))
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Flattened view of what `roles` entitle `subject` to.
    ///
    /// Self-service permissions are listed only when no permission role is
    /// held, matching what [`PermissionEvaluator::evaluate`] honours.
    pub fn effective_permissions(&self, subject: &str, roles: &RoleSet) -> UserPermissions {
        let held = held_permission_roles(roles);
        let self_service = if held.is_empty() {
            self.self_service_permissions(roles)
                .into_iter()
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };
        let permissions = held
            .into_iter()
            .flat_map(|(role, _)| granted_permissions(role).iter().copied())
            .map(str::to_string)
            .sorted()
            .dedup()
            .collect();

        UserPermissions {
            subject: subject.to_string(),
            is_system_admin: roles.has_system_admin(),
            roles: roles.names(),
            permissions,
            self_service,
            scope: resolve_access_scope(roles),
        }
    }

    /// Report structural problems in a role set, for migration tooling.
    pub fn validate_structure(&self, roles: &RoleSet) -> Vec<StructureIssue> {
        let mut issues = Vec::new();
        let has_region = roles.has_region_role();
        let has_legacy = roles.has_legacy_role();
        let has_permission = roles.permission_roles().next().is_some();

        if !has_region && !has_legacy {
            issues.extend(
                roles
                    .permission_roles()
                    .filter(|role| !role.is_system_admin())
                    .map(|role| StructureIssue::PermissionWithoutRegion {
                        role: role.to_string(),
                    }),
            );
        }

        if !has_permission && !has_legacy {
            issues.extend(roles.regions().map(|region| {
                StructureIssue::RegionWithoutPermission {
                    region: region.to_string(),
                }
            }));
        }

        issues.extend(roles.legacy_roles().map(|legacy| StructureIssue::LegacyRole {
            role: legacy.to_string(),
            replacement: legacy.canonical().to_string(),
        }));

        issues.extend(
            roles
                .unrecognized()
                .iter()
                .map(|name| StructureIssue::UnrecognizedRole { role: name.clone() }),
        );

        if !issues.is_empty() {
            debug!(
                event = "Roles",
                phase = "Validated",
                roles = roles.to_string(),
                issues = issues.len()
            );
        }
        issues
    }
}

/// Permission roles in effect, legacy roles normalized. The flag marks legacy origin.
fn held_permission_roles(roles: &RoleSet) -> Vec<(PermissionRole, bool)> {
    roles
        .permission_roles()
        .map(|role| (role, false))
        .chain(roles.legacy_roles().map(|legacy| (legacy.canonical(), true)))
        .collect()
}
