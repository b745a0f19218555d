use jiff::Timestamp;
use rand::rngs::OsRng;
use rand::{Rng, TryRngCore};
use std::sync::OnceLock;
use std::time::Instant;
use waybill_core::GenerationError;

/// One fresh draw from every entropy input a generator mixes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entropy {
    /// Monotonic clock reading in nanoseconds.
    pub monotonic_nanos: u128,
    /// Wall clock reading in milliseconds since the Unix epoch.
    pub wall_millis: i64,
    /// Output of a fast, non-cryptographic generator.
    pub fast: i32,
    /// Output of a cryptographically secure generator.
    pub secure: u64,
}

/// Source of per-call entropy.
///
/// Implementations must be safe to call from many threads at once without
/// funnelling every caller through one lock.
pub trait EntropySource: Send + Sync + 'static {
    /// Samples all four entropy inputs. Nothing may be cached between calls.
    fn sample(&self) -> Result<Entropy, GenerationError>;

    /// A fresh monotonic clock reading in nanoseconds.
    fn monotonic_nanos(&self) -> u128;
}

/// Entropy drawn from the process clocks, the thread-local RNG and the OS RNG.
///
/// The thread-local RNG lives in each OS thread and `OsRng` holds no state on
/// the Rust side, so concurrent callers never contend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEntropy;

fn monotonic_anchor() -> Instant {
    static ANCHOR: OnceLock<Instant> = OnceLock::new();
    *ANCHOR.get_or_init(Instant::now)
}

impl EntropySource for SystemEntropy {
    fn sample(&self) -> Result<Entropy, GenerationError> {
        let secure = OsRng
            .try_next_u64()
            .map_err(|e| GenerationError::EntropyUnavailable(e.to_string()))?;

        Ok(Entropy {
            monotonic_nanos: self.monotonic_nanos(),
            wall_millis: Timestamp::now().as_millisecond(),
            fast: rand::rng().random(),
            secure,
        })
    }

    fn monotonic_nanos(&self) -> u128 {
        monotonic_anchor().elapsed().as_nanos()
    }
}
