use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{AuthzError, CredentialError};
use crate::evaluator::PermissionEvaluator;
use crate::extractor::CredentialExtractor;
use crate::guard::check_resource_access;
use crate::loader;
use crate::resolver::resolve_access_scope;
use crate::timers::{PhaseTimer, PhaseTimings};
use crate::traits::ClaimsVerifier;
use crate::types::{
    AccessScope, Authorization, Credential, ErrorResponse, PermissionDecision, RequiredPermissions,
    RoleSet, ScopeCheck, StructureIssue, UserPermissions,
};

/// The main engine handle. Cloneable, thread-safe and immutable once built.
#[derive(Clone, Debug)]
pub struct AccessEngine {
    inner: Arc<EngineInner>,
}

#[derive(Debug)]
struct EngineInner {
    config: EngineConfig,
    evaluator: PermissionEvaluator,
    extractor: CredentialExtractor,
}

impl Default for AccessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessEngine {
    /// Engine with the default configuration, trusting upstream token verification.
    pub fn new() -> Self {
        Self::build(EngineConfig::default(), CredentialExtractor::new())
    }

    pub fn from_config(config: EngineConfig) -> Result<Self, AuthzError> {
        loader::validate_config(&config)?;
        Ok(Self::build(config, CredentialExtractor::new()))
    }

    pub fn from_config_str(text: &str) -> Result<Self, AuthzError> {
        let config = loader::compile_config(text)?;
        Ok(Self::build(config, CredentialExtractor::new()))
    }

    /// Replace the claims verifier run after a token has been decoded.
    pub fn with_verifier(self, verifier: impl ClaimsVerifier + 'static) -> Self {
        let config = self.inner.config.clone();
        let extractor = CredentialExtractor::new().with_verifier(Arc::new(verifier));
        Self::build(config, extractor)
    }

    fn build(config: EngineConfig, extractor: CredentialExtractor) -> Self {
        let evaluator = PermissionEvaluator::new(&config);
        AccessEngine {
            inner: Arc::new(EngineInner {
                config,
                evaluator,
                extractor,
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Parse the `Authorization` header value into a [`Credential`].
    ///
    /// With legacy roles disabled, `_All` roles are demoted to unrecognized
    /// names before anything else sees them.
    pub fn extract(&self, header: Option<&str>) -> Result<Credential, CredentialError> {
        let credential = self.inner.extractor.extract(header)?;
        if self.inner.config.legacy_roles_enabled {
            Ok(credential)
        } else {
            Ok(credential.map_roles(RoleSet::without_legacy))
        }
    }

    pub fn resolve_scope(&self, credential: &Credential) -> AccessScope {
        resolve_access_scope(credential.roles())
    }

    pub fn evaluate(
        &self,
        credential: &Credential,
        required: &RequiredPermissions,
    ) -> PermissionDecision {
        self.inner
            .evaluator
            .evaluate(credential.roles(), required, credential.subject_email())
    }

    pub fn check_resource(&self, scope: &AccessScope, resource_region: &str) -> ScopeCheck {
        check_resource_access(scope, resource_region)
    }

    /// Authenticate the header and check `required` against the caller's roles.
    ///
    /// The result carries the resolved scope on success, so callers can apply
    /// it to any resources they load afterwards.
    pub fn authorize(&self, header: Option<&str>, required: &RequiredPermissions) -> Authorization {
        self.run(header, required, None)
    }

    /// As [`AccessEngine::authorize`], then also require `resource_region` to
    /// lie within the caller's scope.
    pub fn authorize_resource(
        &self,
        header: Option<&str>,
        required: &RequiredPermissions,
        resource_region: &str,
    ) -> Authorization {
        self.run(header, required, Some(resource_region))
    }

    pub fn effective_permissions(&self, credential: &Credential) -> UserPermissions {
        self.inner
            .evaluator
            .effective_permissions(credential.subject_email(), credential.roles())
    }

    pub fn validate_structure(&self, credential: &Credential) -> Vec<StructureIssue> {
        self.inner.evaluator.validate_structure(credential.roles())
    }

    fn run(
        &self,
        header: Option<&str>,
        required: &RequiredPermissions,
        resource_region: Option<&str>,
    ) -> Authorization {
        let started = Instant::now();
        let mut timings = PhaseTimings::default();

        debug!(
            event = "Authorize",
            phase = "Start",
            required = required.to_string(),
            resource_region = resource_region
        );

        let outcome = self.authorize_phases(header, required, resource_region, &mut timings);
        let elapsed = started.elapsed();

        match &outcome {
            Authorization::Granted {
                credential, scope, ..
            } => debug!(
                event = "Authorize",
                phase = "Result",
                subject = credential.subject_email(),
                scope = scope.to_string(),
                authorized = true,
                elapsed_us = elapsed.as_micros() as u64,
                measured_us = timings.measured().as_micros() as u64
            ),
            Authorization::Denied { error, .. } => info!(
                event = "Authorize",
                phase = "Result",
                subject = outcome.credential().map(Credential::subject_email),
                status = error.status_code,
                reason = error.message.as_str(),
                authorized = false,
                elapsed_us = elapsed.as_micros() as u64
            ),
        }

        #[cfg(feature = "observability")]
        record_metrics(&outcome, required, elapsed, timings);

        outcome
    }

    fn authorize_phases(
        &self,
        header: Option<&str>,
        required: &RequiredPermissions,
        resource_region: Option<&str>,
        timings: &mut PhaseTimings,
    ) -> Authorization {
        let extracted = {
            let _timer = PhaseTimer::new(&mut timings.extract);
            self.extract(header)
        };
        let credential = match extracted {
            Ok(credential) => credential,
            Err(err) => {
                return Authorization::Denied {
                    credential: None,
                    scope: None,
                    error: ErrorResponse::unauthenticated(&err),
                };
            }
        };

        let decision = {
            let _timer = PhaseTimer::new(&mut timings.evaluate);
            self.evaluate(&credential, required)
        };
        if !decision.authorized {
            let error = ErrorResponse::forbidden(&credential, required, &decision);
            return Authorization::Denied {
                credential: Some(credential),
                scope: None,
                error,
            };
        }

        let scope = {
            let _timer = PhaseTimer::new(&mut timings.resolve_scope);
            self.resolve_scope(&credential)
        };

        if let Some(region) = resource_region {
            let check = {
                let _timer = PhaseTimer::new(&mut timings.check_resource);
                self.check_resource(&scope, region)
            };
            if !check.can_access {
                let error = ErrorResponse::out_of_scope(&credential, &scope, region, &check);
                return Authorization::Denied {
                    credential: Some(credential),
                    scope: Some(scope),
                    error,
                };
            }
        }

        Authorization::Granted {
            credential,
            decision,
            scope,
        }
    }
}

#[cfg(feature = "observability")]
fn record_metrics(
    outcome: &Authorization,
    required: &RequiredPermissions,
    elapsed: std::time::Duration,
    timings: PhaseTimings,
) {
    let error = outcome.error_response();
    let denial = error.and_then(|e| {
        e.denied_reason
            .map(|r| r.to_string())
            .or_else(|| e.scope_denial.map(|d| d.to_string()))
            .or_else(|| e.error_kind.map(|k| k.to_string()))
    });

    let stats = crate::metrics::AuthorizationStats {
        duration: elapsed,
        authorized: outcome.is_authorized(),
        status_code: error.map(|e| e.status_code).unwrap_or_default(),
        subject: outcome
            .credential()
            .map(|c| c.subject_email().to_string())
            .unwrap_or_default(),
        required: required.to_string(),
        denial,
    };
    crate::metrics::record_authorization(&stats, &timings.to_phases(elapsed));
}

#[cfg(test)]
mod tests;
