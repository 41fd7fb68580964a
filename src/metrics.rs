//! Vendor-agnostic authorization metrics via a pluggable sink.
//!
//! **Note:** This module is only available when the `observability` feature is enabled.
//!
//! Implement [`MetricsSink`] and install it once at startup with [`set_sink`]:
//!
//! ```ignore
//! use hdcn_authz::metrics::{AuthorizationStats, MetricsSink};
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! struct DenyCounter(AtomicU64);
//!
//! impl MetricsSink for DenyCounter {
//!     fn on_authorization(&self, stats: &AuthorizationStats) {
//!         if !stats.authorized {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//! }
//!
//! hdcn_authz::metrics::set_sink(Arc::new(DenyCounter(AtomicU64::new(0))));
//! ```

use serde::Serialize;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::warn;

/// Snapshot of one `authorize` call, passed to [`MetricsSink::on_authorization`].
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationStats {
    /// Wall-clock time for the whole call
    pub duration: Duration,
    pub authorized: bool,
    /// 0 when granted, otherwise 401 or 403
    pub status_code: u16,
    /// Caller email; empty when the credential could not be extracted
    pub subject: String,
    /// Canonical form of the requirement, e.g. `any of [members_read]`
    pub required: String,
    /// Deny reason or scope denial in snake_case, if any
    pub denial: Option<String>,
}

/// Per-phase breakdown of an `authorize` call. All times are in milliseconds.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationPhases {
    pub extract_ms: f64,
    pub evaluate_ms: f64,
    pub resolve_scope_ms: f64,
    pub check_resource_ms: f64,
    pub total_ms: f64,
}

impl AuthorizationPhases {
    /// Time not accounted for by the measured phases.
    pub fn overhead_ms(&self) -> f64 {
        self.total_ms
            - (self.extract_ms + self.evaluate_ms + self.resolve_scope_ms + self.check_resource_ms)
    }
}

/// Consumer of authorization metrics.
///
/// Called synchronously on the request path after every `authorize` and
/// `authorize_resource`, so implementations must be cheap and thread-safe.
pub trait MetricsSink: Send + Sync {
    fn on_authorization(&self, stats: &AuthorizationStats);

    /// Phase-level timings. Default ignores them.
    fn on_authorization_phases(&self, _stats: &AuthorizationStats, _phases: &AuthorizationPhases) {}
}

static SINK: OnceLock<Arc<dyn MetricsSink>> = OnceLock::new();

/// Install the global metrics sink.
///
/// The first call wins; later calls are logged and ignored. Until a sink is
/// installed, events are dropped.
pub fn set_sink(sink: Arc<dyn MetricsSink>) {
    if SINK.set(sink).is_err() {
        warn!(
            event = "Metrics",
            phase = "Init",
            problem = "metrics sink already initialized, ignoring set_sink"
        );
    }
}

pub(crate) fn record_authorization(stats: &AuthorizationStats, phases: &AuthorizationPhases) {
    if let Some(sink) = SINK.get() {
        sink.on_authorization(stats);
        sink.on_authorization_phases(stats, phases);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(authorized: bool) -> AuthorizationStats {
        AuthorizationStats {
            duration: Duration::from_micros(42),
            authorized,
            status_code: if authorized { 0 } else { 403 },
            subject: "lid@h-dcn.nl".to_string(),
            required: "any of [members_read]".to_string(),
            denial: (!authorized).then(|| "missing_region_role".to_string()),
        }
    }

    #[test]
    fn test_stats_serialization() {
        let json = serde_json::to_value(stats(false)).unwrap();
        assert_eq!(json["status_code"], 403);
        assert_eq!(json["denial"], "missing_region_role");
        assert_eq!(json["subject"], "lid@h-dcn.nl");
    }

    #[test]
    fn test_phase_overhead() {
        let phases = AuthorizationPhases {
            extract_ms: 0.5,
            evaluate_ms: 0.25,
            resolve_scope_ms: 0.125,
            check_resource_ms: 0.0,
            total_ms: 1.0,
        };
        assert_eq!(phases.overhead_ms(), 0.125);
    }
}
