//! Bearer token parsing into a [`Credential`].
//!
//! Only the token's structure is checked here: `Bearer <h>.<p>.<s>`, where
//! the middle segment is base64url JSON carrying `email` (or `username`)
//! and optionally `cognito:groups`. Signature checks belong to the
//! injected [`ClaimsVerifier`].

use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CredentialError;
use crate::traits::{ClaimsVerifier, TrustUpstream};
use crate::types::Credential;

const BEARER_PREFIX: &str = "Bearer ";

const SUBJECT_CLAIMS: [&str; 3] = ["email", "username", "cognito:username"];
const GROUPS_CLAIM: &str = "cognito:groups";

/// The claims this crate reads from a Cognito ID or access token.
///
/// Claims are read leniently: a subject claim that is not a string is
/// skipped, and a null or absent groups claim means no groups.
#[derive(Debug)]
struct TokenClaims {
    subject: Option<String>,
    groups: Vec<String>,
}

impl TryFrom<Value> for TokenClaims {
    type Error = CredentialError;

    fn try_from(payload: Value) -> Result<Self, Self::Error> {
        let Value::Object(claims) = payload else {
            return Err(CredentialError::MalformedPayloadJson(
                "token payload is not a JSON object".to_string(),
            ));
        };

        let subject = SUBJECT_CLAIMS
            .iter()
            .filter_map(|key| claims.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string);

        let groups = match claims.get(GROUPS_CLAIM) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        CredentialError::MalformedPayloadJson(format!(
                            "{GROUPS_CLAIM} must contain only strings"
                        ))
                    })
                })
                .collect::<Result<_, _>>()?,
            Some(_) => {
                return Err(CredentialError::MalformedPayloadJson(format!(
                    "{GROUPS_CLAIM} must be a list"
                )));
            }
        };

        Ok(TokenClaims { subject, groups })
    }
}

/// Turns an `Authorization` header value into a [`Credential`].
#[derive(Clone)]
pub struct CredentialExtractor {
    verifier: Arc<dyn ClaimsVerifier>,
}

impl Default for CredentialExtractor {
    fn default() -> Self {
        CredentialExtractor {
            verifier: Arc::new(TrustUpstream),
        }
    }
}

impl fmt::Debug for CredentialExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialExtractor").finish_non_exhaustive()
    }
}

impl CredentialExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `verifier` to accept or refuse tokens before their claims are read.
    pub fn with_verifier(mut self, verifier: Arc<dyn ClaimsVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Parse a header value. Never panics on malformed input.
    pub fn extract(&self, header: Option<&str>) -> Result<Credential, CredentialError> {
        let result = self.extract_inner(header);
        match &result {
            Ok(credential) => debug!(
                event = "Credential",
                phase = "Parsed",
                subject = credential.subject_email(),
                roles = credential.roles().to_string()
            ),
            Err(err) => warn!(
                event = "Credential",
                phase = "Rejected",
                kind = err.kind().as_ref(),
                error = err.to_string()
            ),
        }
        result
    }

    fn extract_inner(&self, header: Option<&str>) -> Result<Credential, CredentialError> {
        let header = header
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(CredentialError::MissingHeader)?;

        let token = header
            .strip_prefix(BEARER_PREFIX)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(CredentialError::MalformedBearer)?;

        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 {
            return Err(CredentialError::MalformedTokenStructure {
                segments: segments.len(),
            });
        }

        let TokenClaims { subject, groups } = decode_claims(segments[1])?;
        let subject = subject.ok_or(CredentialError::MissingIdentity)?;

        self.verifier.verify(token)?;

        Ok(Credential::new(subject, &groups))
    }
}

/// Decode a base64url JSON segment, restoring stripped `=` padding.
fn decode_claims(segment: &str) -> Result<TokenClaims, CredentialError> {
    let mut padded = segment.to_string();
    let remainder = padded.len() % 4;
    if remainder != 0 {
        padded.push_str(&"=".repeat(4 - remainder));
    }

    let bytes = URL_SAFE.decode(padded.as_bytes())?;
    let json = String::from_utf8(bytes)?;
    let payload: Value = serde_json::from_str(&json)?;
    TokenClaims::try_from(payload)
}

/// Find the `Authorization` header in an API Gateway style header map.
///
/// Header names are matched case-insensitively.
pub fn authorization_header<'a, I, K, V>(headers: I) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a K, &'a V)>,
    K: AsRef<str> + ?Sized + 'a,
    V: AsRef<str> + ?Sized + 'a,
{
    headers
        .into_iter()
        .find(|(name, _)| name.as_ref().eq_ignore_ascii_case("authorization"))
        .map(|(_, value)| value.as_ref())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use std::collections::HashMap;
    use yare::parameterized;

    use crate::error::CredentialErrorKind;

    /// Build an unsigned `Bearer` header around `payload`.
    pub(crate) fn bearer(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","kid":"test"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("Bearer {header}.{body}.c2lnbmF0dXJl")
    }

    #[test]
    fn test_extract_email_and_groups() {
        let header = bearer(&serde_json::json!({
            "email": "secretaris@h-dcn.nl",
            "cognito:groups": ["Members_CRUD", "Regio_Utrecht"],
        }));
        let credential = CredentialExtractor::new().extract(Some(&header)).unwrap();
        assert_eq!(credential.subject_email(), "secretaris@h-dcn.nl");
        assert_eq!(credential.roles().names(), vec!["Members_CRUD", "Regio_Utrecht"]);
    }

    #[parameterized(
        absent = { serde_json::json!({"email": "lid@h-dcn.nl"}) },
        null = { serde_json::json!({"email": "lid@h-dcn.nl", "cognito:groups": null}) },
        empty = { serde_json::json!({"email": "lid@h-dcn.nl", "cognito:groups": []}) },
    )]
    fn test_missing_groups_is_unprivileged(payload: serde_json::Value) {
        let credential = CredentialExtractor::new()
            .extract(Some(&bearer(&payload)))
            .unwrap();
        assert_eq!(credential.subject_email(), "lid@h-dcn.nl");
        assert!(credential.roles().is_empty());
    }

    #[parameterized(
        username = { serde_json::json!({"username": "jan"}), "jan" },
        cognito_username = { serde_json::json!({"cognito:username": "piet"}), "piet" },
        email_wins = { serde_json::json!({"email": "a@b.nl", "username": "jan"}), "a@b.nl" },
        numeric_email_skipped = { serde_json::json!({"email": 42, "username": "jan"}), "jan" },
        blank_email_falls_back = { serde_json::json!({"email": " ", "username": "jan"}), "jan" },
    )]
    fn test_subject_fallbacks(payload: serde_json::Value, expected: &str) {
        let credential = CredentialExtractor::new()
            .extract(Some(&bearer(&payload)))
            .unwrap();
        assert_eq!(credential.subject_email(), expected);
    }

    #[parameterized(
        absent = { None, CredentialErrorKind::MissingHeader },
        empty = { Some(""), CredentialErrorKind::MissingHeader },
        basic_auth = { Some("Basic dXNlcjpwYXNz"), CredentialErrorKind::MalformedBearer },
        bearer_without_token = { Some("Bearer "), CredentialErrorKind::MalformedBearer },
        lowercase_bearer = { Some("bearer a.b.c"), CredentialErrorKind::MalformedBearer },
        two_segments = { Some("Bearer abc.def"), CredentialErrorKind::MalformedTokenStructure },
        four_segments = { Some("Bearer a.b.c.d"), CredentialErrorKind::MalformedTokenStructure },
        not_base64 = { Some("Bearer a.!!!.c"), CredentialErrorKind::MalformedPayloadJson },
        not_json = { Some("Bearer a.bm90IGpzb24.c"), CredentialErrorKind::MalformedPayloadJson },
    )]
    fn test_extract_failures(header: Option<&str>, expected: CredentialErrorKind) {
        let err = CredentialExtractor::new().extract(header).unwrap_err();
        assert_eq!(err.kind(), expected);
    }

    #[parameterized(
        no_subject_claims = { serde_json::json!({"cognito:groups": ["hdcnLeden"]}) },
        numeric_email = { serde_json::json!({"email": 42}) },
        null_email = { serde_json::json!({"email": null, "cognito:groups": ["hdcnLeden"]}) },
        blank_everything = { serde_json::json!({"email": " ", "username": ""}) },
    )]
    fn test_missing_identity(payload: serde_json::Value) {
        let err = CredentialExtractor::new()
            .extract(Some(&bearer(&payload)))
            .unwrap_err();
        assert_eq!(err, CredentialError::MissingIdentity);
    }

    #[parameterized(
        groups_as_string = { serde_json::json!({"email": "a@b.nl", "cognito:groups": "hdcnLeden"}) },
        groups_with_number = { serde_json::json!({"email": "a@b.nl", "cognito:groups": ["hdcnLeden", 7]}) },
        payload_is_array = { serde_json::json!(["a@b.nl"]) },
        payload_is_string = { serde_json::json!("a@b.nl") },
    )]
    fn test_unusable_payload_is_malformed(payload: serde_json::Value) {
        let err = CredentialExtractor::new()
            .extract(Some(&bearer(&payload)))
            .unwrap_err();
        assert_eq!(err.kind(), CredentialErrorKind::MalformedPayloadJson);
    }

    #[test]
    fn test_padding_is_restored() {
        // 1, 2 and 3 characters of stripped padding.
        for email in ["a@b.nl", "ab@b.nl", "abc@b.nl"] {
            let header = bearer(&serde_json::json!({ "email": email }));
            let credential = CredentialExtractor::new().extract(Some(&header)).unwrap();
            assert_eq!(credential.subject_email(), email);
        }
    }

    #[test]
    fn test_verifier_can_reject() {
        let verifier = |_: &str| -> Result<(), CredentialError> {
            Err(CredentialError::Rejected("token expired".into()))
        };
        let extractor = CredentialExtractor::new().with_verifier(Arc::new(verifier));
        let header = bearer(&serde_json::json!({"email": "a@b.nl"}));
        let err = extractor.extract(Some(&header)).unwrap_err();
        assert_eq!(err, CredentialError::Rejected("token expired".into()));
    }

    #[test]
    fn test_authorization_header_lookup() {
        let mut headers: HashMap<String, String> = HashMap::new();
        headers.insert("content-type".into(), "application/json".into());
        headers.insert("authorization".into(), "Bearer a.b.c".into());
        assert_eq!(authorization_header(&headers), Some("Bearer a.b.c"));

        let upper: HashMap<&str, &str> = HashMap::from([("Authorization", "Bearer x.y.z")]);
        assert_eq!(authorization_header(&upper), Some("Bearer x.y.z"));

        let none: HashMap<String, String> = HashMap::new();
        assert_eq!(authorization_header(&none), None);
    }
}
