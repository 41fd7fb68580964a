//! Phase timing for the authorization pipeline.

use std::time::{Duration, Instant};

/// Adds the time between creation and drop to `slot`.
///
/// Early returns still record, so a phase that short-circuits a request is
/// measured like any other.
pub(crate) struct PhaseTimer<'a> {
    start: Instant,
    slot: &'a mut Duration,
}

impl<'a> PhaseTimer<'a> {
    pub(crate) fn new(slot: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            slot,
        }
    }
}

impl Drop for PhaseTimer<'_> {
    fn drop(&mut self) {
        *self.slot += self.start.elapsed();
    }
}

/// Accumulated time per phase of one `authorize` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PhaseTimings {
    pub extract: Duration,
    pub evaluate: Duration,
    pub resolve_scope: Duration,
    pub check_resource: Duration,
}

impl PhaseTimings {
    pub(crate) fn measured(&self) -> Duration {
        self.extract + self.evaluate + self.resolve_scope + self.check_resource
    }

    #[cfg(feature = "observability")]
    pub(crate) fn to_phases(self, total: Duration) -> crate::metrics::AuthorizationPhases {
        let ms = |d: Duration| d.as_secs_f64() * 1_000.0;
        crate::metrics::AuthorizationPhases {
            extract_ms: ms(self.extract),
            evaluate_ms: ms(self.evaluate),
            resolve_scope_ms: ms(self.resolve_scope),
            check_resource_ms: ms(self.check_resource),
            total_ms: ms(total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_phase_timer_records_on_drop() {
        let mut timings = PhaseTimings::default();
        {
            let _timer = PhaseTimer::new(&mut timings.extract);
            thread::sleep(Duration::from_millis(5));
        }
        assert!(timings.extract >= Duration::from_millis(5));
        assert_eq!(timings.evaluate, Duration::ZERO);
    }

    #[test]
    fn test_phase_timer_accumulates_and_sums() {
        let mut timings = PhaseTimings::default();
        for _ in 0..3 {
            let _timer = PhaseTimer::new(&mut timings.evaluate);
            thread::sleep(Duration::from_millis(2));
        }
        {
            let _timer = PhaseTimer::new(&mut timings.check_resource);
            thread::sleep(Duration::from_millis(2));
        }
        assert!(timings.evaluate >= Duration::from_millis(6));
        assert_eq!(timings.measured(), timings.evaluate + timings.check_resource);
    }
}
