use crate::catalog::RoleCatalog;
use crate::config::EngineConfig;
use crate::error::AuthzError;

/// Marker every self-service permission name must carry.
const SELF_SERVICE_MARKER: &str = "_self_";

/// Compile JSON configuration text into a validated [`EngineConfig`].
///
/// Missing fields take their defaults. Parse failures, unknown fields and
/// self-service entries that are not `*_self_*` permissions (or that clash
/// with the role catalog) map to `AuthzError::InvalidConfig`.
///
/// Example:
/// ```rust
/// use hdcn_authz::compile_config;
/// let config = compile_config(r#"{"reject_unrecognized_roles": true}"#).unwrap();
/// assert!(config.reject_unrecognized_roles);
/// assert!(config.legacy_roles_enabled);
/// ```
pub fn compile_config(text: &str) -> Result<EngineConfig, AuthzError> {
    let config: EngineConfig = serde_json::from_str(text)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &EngineConfig) -> Result<(), AuthzError> {
    let catalog = RoleCatalog::all_permissions();
    for (role, permissions) in &config.self_service {
        for permission in permissions {
            if !permission.contains(SELF_SERVICE_MARKER) {
                return Err(AuthzError::InvalidConfig(format!(
                    "self-service permission '{permission}' for {role} must contain '{SELF_SERVICE_MARKER}'"
                )));
            }
            if catalog.contains(permission.as_str()) {
                return Err(AuthzError::InvalidConfig(format!(
                    "self-service permission '{permission}' for {role} collides with the role catalog"
                )));
            }
        }
    }
    Ok(())
}
