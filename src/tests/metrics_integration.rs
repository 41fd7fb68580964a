#![cfg(feature = "observability")]

//! The global sink is process-wide and other tests authorize concurrently,
//! so assertions only look at events for this module's own subject.

use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::extractor::tests::bearer;
use crate::metrics::{AuthorizationPhases, AuthorizationStats, MetricsSink};
use crate::{AccessEngine, RequiredPermissions};

const SUBJECT: &str = "metrics-probe@h-dcn.nl";

#[derive(Clone, Default)]
struct RecordingSink {
    events: Arc<Mutex<Vec<AuthorizationStats>>>,
    phases: Arc<Mutex<Vec<AuthorizationPhases>>>,
}

impl RecordingSink {
    fn events_for(&self, subject: &str) -> Vec<AuthorizationStats> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.subject == subject)
            .cloned()
            .collect()
    }
}

impl MetricsSink for RecordingSink {
    fn on_authorization(&self, stats: &AuthorizationStats) {
        if let Ok(mut events) = self.events.lock() {
            events.push(stats.clone());
        }
    }

    fn on_authorization_phases(&self, stats: &AuthorizationStats, phases: &AuthorizationPhases) {
        if stats.subject != SUBJECT {
            return;
        }
        if let Ok(mut p) = self.phases.lock() {
            p.push(phases.clone());
        }
    }
}

#[test]
fn test_authorizations_reach_sink() {
    let sink = RecordingSink::default();
    crate::metrics::set_sink(Arc::new(sink.clone()));

    let engine = AccessEngine::new();
    let required = RequiredPermissions::any_of(["members_update"]).unwrap();
    let token = |groups: &[&str]| bearer(&json!({ "email": SUBJECT, "cognito:groups": groups }));

    assert!(engine
        .authorize_resource(Some(&token(&["Members_CRUD", "Regio_Utrecht"])), &required, "Utrecht")
        .is_authorized());
    assert!(!engine
        .authorize(Some(&token(&["Members_CRUD"])), &required)
        .is_authorized());
    assert!(!engine
        .authorize_resource(Some(&token(&["Members_CRUD", "Regio_Utrecht"])), &required, "Limburg")
        .is_authorized());

    let events = sink.events_for(SUBJECT);
    assert_eq!(events.len(), 3);
    assert!(events[0].authorized);
    assert_eq!(events[0].status_code, 0);
    assert_eq!(events[1].status_code, 403);
    assert_eq!(events[1].denial.as_deref(), Some("missing_region_role"));
    assert_eq!(events[2].denial.as_deref(), Some("region_mismatch"));
    assert!(events.iter().all(|e| e.required == "any of [members_update]"));

    let phases = sink.phases.lock().unwrap();
    assert_eq!(phases.len(), 3);
    assert!(phases.iter().all(|p| p.total_ms >= p.extract_ms));
}
