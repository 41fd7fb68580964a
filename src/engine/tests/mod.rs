use super::*;
use crate::error::CredentialErrorKind;
use crate::extractor::tests::bearer;
use crate::types::{DeniedReason, GrantBasis, ScopeDenial, STATUS_FORBIDDEN, STATUS_UNAUTHORIZED};
use insta::assert_json_snapshot;
use serde_json::json;
use yare::parameterized;

const SECRETARIS: &str = "secretaris@h-dcn.nl";

fn token(groups: &[&str]) -> String {
    bearer(&json!({
        "email": SECRETARIS,
        "cognito:username": "secretaris",
        "cognito:groups": groups,
    }))
}

fn any_of(permissions: &[&str]) -> RequiredPermissions {
    RequiredPermissions::any_of(permissions.iter().copied()).unwrap()
}

fn denied_reason(outcome: &Authorization) -> Option<DeniedReason> {
    outcome.error_response().and_then(|e| e.denied_reason)
}

include!("evaluate.rs");
include!("scope.rs");
include!("authorize.rs");
