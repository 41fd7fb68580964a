use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;
use utoipa::ToSchema;

/// Errors raised for programming or configuration mistakes.
///
/// Expected request-time conditions (missing roles, region mismatch) are
/// reported through [`crate::PermissionDecision`] instead.
#[derive(Debug, Error, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub enum AuthzError {
    #[error("unrecognized role name: {0}")]
    UnrecognizedRole(String),

    #[error("invalid region role: {0}")]
    InvalidRegionRole(String),

    #[error("permission requirement must name at least one permission")]
    EmptyRequirement,

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for AuthzError {
    fn from(err: serde_json::Error) -> Self {
        AuthzError::InvalidConfig(err.to_string())
    }
}

/// Stable wire names for credential failures.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CredentialErrorKind {
    MissingHeader,
    MalformedBearer,
    MalformedTokenStructure,
    MalformedPayloadJson,
    MissingIdentity,
    Rejected,
}

/// Structural failures while turning an `Authorization` header into a credential.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("authorization header is missing")]
    MissingHeader,

    #[error("authorization header is not a bearer token")]
    MalformedBearer,

    #[error("token must have 3 dot-separated segments, found {segments}")]
    MalformedTokenStructure { segments: usize },

    #[error("token payload is not valid base64url JSON: {0}")]
    MalformedPayloadJson(String),

    #[error("token payload carries no email or username")]
    MissingIdentity,

    #[error("token rejected by verifier: {0}")]
    Rejected(String),
}

impl CredentialError {
    pub fn kind(&self) -> CredentialErrorKind {
        match self {
            CredentialError::MissingHeader => CredentialErrorKind::MissingHeader,
            CredentialError::MalformedBearer => CredentialErrorKind::MalformedBearer,
            CredentialError::MalformedTokenStructure { .. } => {
                CredentialErrorKind::MalformedTokenStructure
            }
            CredentialError::MalformedPayloadJson(_) => CredentialErrorKind::MalformedPayloadJson,
            CredentialError::MissingIdentity => CredentialErrorKind::MissingIdentity,
            CredentialError::Rejected(_) => CredentialErrorKind::Rejected,
        }
    }
}

impl From<base64::DecodeError> for CredentialError {
    fn from(err: base64::DecodeError) -> Self {
        CredentialError::MalformedPayloadJson(err.to_string())
    }
}

impl From<serde_json::Error> for CredentialError {
    fn from(err: serde_json::Error) -> Self {
        CredentialError::MalformedPayloadJson(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for CredentialError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        CredentialError::MalformedPayloadJson(err.to_string())
    }
}
