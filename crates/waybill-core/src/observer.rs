use crate::error::GenerationError;
use std::fmt::Display;
use std::time::Duration;

/// The process-wide choice of how tracking codes are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashStrategy {
    /// SHA-256 over the composite input, first 8 digest bytes as hex.
    Primary,
    /// Uppercased, alphanumeric-only composite input, padded with clock digits.
    Fallback,
}

impl HashStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashStrategy::Primary => "primary",
            HashStrategy::Fallback => "fallback",
        }
    }
}

impl Display for HashStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a successful generation reports to its observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationOutcome {
    /// The path that produced the code.
    pub strategy: HashStrategy,
    /// Wall time spent inside the generator.
    pub elapsed: Duration,
}

/// Sink for generation events.
///
/// Generators call into an observer instead of owning counters or timers,
/// so the caller decides how (and whether) outcomes are recorded.
pub trait GenerationObserver: Send + Sync + 'static {
    /// Called once per code handed back to the caller.
    fn on_generated(&self, _outcome: &GenerationOutcome) {}

    /// Called when the primary path failed and the fallback path was tried.
    fn on_degraded(&self, _reason: &GenerationError) {}

    /// Called when no path could produce a code.
    fn on_failed(&self, _error: &GenerationError) {}
}

/// An observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl GenerationObserver for NoopObserver {}
