//! Handler-facing authorization outcomes and error bodies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{CredentialError, CredentialErrorKind};

use super::access_scope::AccessScope;
use super::credential::Credential;
use super::decision::{DeniedReason, PermissionDecision};
use super::requirement::RequiredPermissions;
use super::scope_check::{ScopeCheck, ScopeDenial};

pub const STATUS_UNAUTHORIZED: u16 = 401;
pub const STATUS_FORBIDDEN: u16 = 403;

/// Error body a handler returns as-is.
///
/// Denials carry their diagnostics verbatim; operators of this internal tool
/// need to tell a missing region from a wrong permission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<CredentialErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denied_reason: Option<DeniedReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_denial: Option<ScopeDenial>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub user_roles: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_permissions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_region: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_regions: Vec<String>,
}

impl ErrorResponse {
    /// 401 for a credential that could not be parsed or was rejected.
    pub fn unauthenticated(err: &CredentialError) -> Self {
        ErrorResponse {
            status_code: STATUS_UNAUTHORIZED,
            message: format!("Authentication failed: {err}"),
            error_kind: Some(err.kind()),
            ..Default::default()
        }
    }

    /// 403 for a well-formed credential lacking the required rights.
    pub fn forbidden(
        credential: &Credential,
        required: &RequiredPermissions,
        decision: &PermissionDecision,
    ) -> Self {
        let message = match decision.denied_reason {
            Some(DeniedReason::NoValidPermissionRole) => {
                "Access denied: no valid permission role assigned".to_string()
            }
            Some(DeniedReason::PermissionMismatch) => {
                format!("Access denied: requires {required}")
            }
            Some(DeniedReason::MissingRegionRole) => {
                "Access denied: incomplete role structure, region assignment required".to_string()
            }
            Some(DeniedReason::InsufficientBasicRole) => {
                "Access denied: member roles only allow self-service access".to_string()
            }
            Some(DeniedReason::UnrecognizedRole) => {
                "Access denied: credential carries unrecognized roles".to_string()
            }
            None => "Access denied".to_string(),
        };

        ErrorResponse {
            status_code: STATUS_FORBIDDEN,
            message,
            denied_reason: decision.denied_reason,
            missing_element: decision.missing_element.clone(),
            user_email: Some(credential.subject_email().to_string()),
            user_roles: credential.roles().names(),
            required_permissions: required.permissions().iter().cloned().collect(),
            ..Default::default()
        }
    }

    /// 403 for a resource outside the caller's regional scope.
    pub fn out_of_scope(
        credential: &Credential,
        scope: &AccessScope,
        resource_region: &str,
        check: &ScopeCheck,
    ) -> Self {
        ErrorResponse {
            status_code: STATUS_FORBIDDEN,
            message: check
                .message
                .clone()
                .unwrap_or_else(|| "Access denied: resource out of scope".to_string()),
            scope_denial: check.denial,
            user_email: Some(credential.subject_email().to_string()),
            user_roles: credential.roles().names(),
            resource_region: Some(resource_region.to_string()),
            allowed_regions: scope.allowed_regions.iter().cloned().collect(),
            ..Default::default()
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.status_code == STATUS_UNAUTHORIZED
    }
}

/// Full outcome of authorizing one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Authorization {
    Granted {
        credential: Credential,
        decision: PermissionDecision,
        scope: AccessScope,
    },
    Denied {
        #[serde(skip_serializing_if = "Option::is_none")]
        credential: Option<Credential>,
        #[serde(skip_serializing_if = "Option::is_none")]
        scope: Option<AccessScope>,
        error: ErrorResponse,
    },
}

impl Authorization {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Authorization::Granted { .. })
    }

    pub fn credential(&self) -> Option<&Credential> {
        match self {
            Authorization::Granted { credential, .. } => Some(credential),
            Authorization::Denied { credential, .. } => credential.as_ref(),
        }
    }

    /// The regional scope, when a credential could be parsed.
    pub fn scope(&self) -> Option<&AccessScope> {
        match self {
            Authorization::Granted { scope, .. } => Some(scope),
            Authorization::Denied { scope, .. } => scope.as_ref(),
        }
    }

    pub fn error_response(&self) -> Option<&ErrorResponse> {
        match self {
            Authorization::Granted { .. } => None,
            Authorization::Denied { error, .. } => Some(error),
        }
    }

    /// Split into the granted credential and scope, or the error body.
    pub fn into_result(self) -> Result<(Credential, AccessScope), ErrorResponse> {
        match self {
            Authorization::Granted {
                credential, scope, ..
            } => Ok((credential, scope)),
            Authorization::Denied { error, .. } => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::decision::GrantBasis;
    use insta::assert_json_snapshot;

    #[test]
    fn test_unauthenticated_body() {
        let body = ErrorResponse::unauthenticated(&CredentialError::MissingHeader);
        assert!(body.is_unauthenticated());
        assert_json_snapshot!(body, @r#"
        {
          "status_code": 401,
          "message": "Authentication failed: authorization header is missing",
          "error_kind": "missing_header"
        }
        "#);
    }

    #[test]
    fn test_forbidden_body() {
        let credential = Credential::new("lid@h-dcn.nl", ["Members_CRUD"]);
        let required = RequiredPermissions::any_of(["members_read"]).unwrap();
        let decision = PermissionDecision::deny(DeniedReason::MissingRegionRole)
            .with_missing("region assignment required (e.g. Regio_All or Regio_<name>)");

        let body = ErrorResponse::forbidden(&credential, &required, &decision);
        assert_json_snapshot!(body, @r#"
        {
          "status_code": 403,
          "message": "Access denied: incomplete role structure, region assignment required",
          "denied_reason": "missing_region_role",
          "missing_element": "region assignment required (e.g. Regio_All or Regio_<name>)",
          "user_email": "lid@h-dcn.nl",
          "user_roles": [
            "Members_CRUD"
          ],
          "required_permissions": [
            "members_read"
          ]
        }
        "#);
    }

    #[test]
    fn test_authorization_accessors() {
        let credential = Credential::new("lid@h-dcn.nl", ["Members_Read", "Regio_All"]);
        let granted = Authorization::Granted {
            credential: credential.clone(),
            decision: PermissionDecision::allow(GrantBasis::PermissionRole),
            scope: AccessScope::full(),
        };
        assert!(granted.is_authorized());
        assert!(granted.error_response().is_none());
        assert_eq!(granted.scope(), Some(&AccessScope::full()));

        let denied = Authorization::Denied {
            credential: None,
            scope: None,
            error: ErrorResponse::unauthenticated(&CredentialError::MalformedBearer),
        };
        assert!(!denied.is_authorized());
        assert!(denied.credential().is_none());
        let err = denied.into_result().unwrap_err();
        assert_eq!(err.error_kind, Some(CredentialErrorKind::MalformedBearer));

        let (c, scope) = granted.into_result().unwrap();
        assert_eq!(c, credential);
        assert!(scope.has_full_access);
    }
}
