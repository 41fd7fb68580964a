//! Engine configuration.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::types::BasicRole;

/// Permissions basic roles may exercise against the caller's own record.
pub type SelfServiceTable = BTreeMap<BasicRole, BTreeSet<String>>;

/// Tunables for [`crate::AccessEngine`].
///
/// ```json
/// {
///   "self_service": {
///     "hdcnLeden": ["members_self_read", "members_self_update"],
///     "verzoek_lid": ["members_self_read", "members_self_create", "members_self_update"]
///   },
///   "reject_unrecognized_roles": false,
///   "legacy_roles_enabled": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub self_service: SelfServiceTable,
    /// Deny credentials carrying group names outside the role vocabulary.
    pub reject_unrecognized_roles: bool,
    /// Honour deprecated `<Domain>_<Capability>_All` roles.
    pub legacy_roles_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            self_service: default_self_service(),
            reject_unrecognized_roles: false,
            legacy_roles_enabled: true,
        }
    }
}

pub fn default_self_service() -> SelfServiceTable {
    let table = |perms: &[&str]| -> BTreeSet<String> { perms.iter().map(|p| p.to_string()).collect() };
    BTreeMap::from([
        (
            BasicRole::HdcnLeden,
            table(&["members_self_read", "members_self_update"]),
        ),
        (
            BasicRole::VerzoekLid,
            table(&[
                "members_self_read",
                "members_self_create",
                "members_self_update",
            ]),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_self_service() {
        let config = EngineConfig::default();
        assert!(config.legacy_roles_enabled);
        assert!(!config.reject_unrecognized_roles);
        assert!(config.self_service[&BasicRole::HdcnLeden].contains("members_self_read"));
        assert!(!config.self_service[&BasicRole::HdcnLeden].contains("members_self_create"));
        assert!(config.self_service[&BasicRole::VerzoekLid].contains("members_self_create"));
    }

    #[test]
    fn test_config_serialization_uses_group_names() {
        let json = serde_json::to_value(EngineConfig::default()).unwrap();
        assert!(json["self_service"].get("hdcnLeden").is_some());
        assert!(json["self_service"].get("verzoek_lid").is_some());
    }
}
