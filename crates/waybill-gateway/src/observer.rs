use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, error, warn};
use waybill_core::{GenerationError, GenerationObserver, GenerationOutcome};

/// Counts generation events and reports them as tracing events.
#[derive(Debug, Default)]
pub struct TracingObserver {
    generated: AtomicU64,
    degraded: AtomicU64,
    failed: AtomicU64,
}

impl TracingObserver {
    pub fn generated_total(&self) -> u64 {
        self.generated.load(Ordering::Relaxed)
    }

    pub fn degraded_total(&self) -> u64 {
        self.degraded.load(Ordering::Relaxed)
    }

    pub fn failed_total(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

impl GenerationObserver for TracingObserver {
    fn on_generated(&self, outcome: &GenerationOutcome) {
        let total = self.generated.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(
            strategy = %outcome.strategy,
            latency_us = u64::try_from(outcome.elapsed.as_micros()).unwrap_or(u64::MAX),
            tracking_numbers_generated_total = total,
            "generation recorded"
        );
    }

    fn on_degraded(&self, reason: &GenerationError) {
        let total = self.degraded.fetch_add(1, Ordering::Relaxed) + 1;
        warn!(
            error = %reason,
            tracking_numbers_degraded_total = total,
            "generation degraded to fallback"
        );
    }

    fn on_failed(&self, error: &GenerationError) {
        let total = self.failed.fetch_add(1, Ordering::Relaxed) + 1;
        error!(
            error = %error,
            tracking_numbers_failed_total = total,
            "generation failure recorded"
        );
    }
}
