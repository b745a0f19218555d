use parking_lot::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct BucketState {
    tokens: u32,
    last_refill: Instant,
    last_seen: Instant,
}

/// A token bucket with interval refill.
///
/// Tokens are not dripped in continuously: every time a full `refill_interval`
/// has passed since the last refill point, `refill_tokens` are added in one
/// batch, capped at `capacity`. Refill points stay aligned to the bucket's
/// creation time.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: u32,
    refill_tokens: u32,
    refill_interval: Duration,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Creates a full bucket.
    pub fn new(capacity: u32, refill_tokens: u32, refill_interval: Duration, now: Instant) -> Self {
        Self {
            capacity,
            refill_tokens,
            refill_interval,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: now,
                last_seen: now,
            }),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Takes one token if available.
    pub fn try_consume(&self, now: Instant) -> bool {
        let mut state = self.state.lock();
        self.refill(&mut state, now);
        state.last_seen = state.last_seen.max(now);

        if state.tokens == 0 {
            return false;
        }
        state.tokens -= 1;
        true
    }

    /// Tokens available at `now`, without consuming any.
    pub fn available(&self, now: Instant) -> u32 {
        let mut state = self.state.lock();
        self.refill(&mut state, now);
        state.tokens
    }

    /// The last instant a consumption was attempted.
    pub fn last_seen(&self) -> Instant {
        self.state.lock().last_seen
    }

    /// Whether the bucket has been untouched for `ttl` and is back at full
    /// capacity, i.e. dropping it is indistinguishable from keeping it.
    pub fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        let mut state = self.state.lock();
        self.refill(&mut state, now);
        now.saturating_duration_since(state.last_seen) >= ttl && state.tokens == self.capacity
    }

    fn refill(&self, state: &mut BucketState, now: Instant) {
        let elapsed = now.saturating_duration_since(state.last_refill);
        if self.refill_interval.is_zero() {
            state.tokens = self.capacity;
            state.last_refill = now;
            return;
        }
        if elapsed < self.refill_interval {
            return;
        }

        let periods = elapsed.as_nanos() / self.refill_interval.as_nanos();
        let added = periods.saturating_mul(u128::from(self.refill_tokens));
        let tokens = u128::from(state.tokens).saturating_add(added);
        state.tokens = tokens.min(u128::from(self.capacity)) as u32;

        state.last_refill = match u32::try_from(periods) {
            Ok(periods) => state.last_refill + self.refill_interval.saturating_mul(periods),
            Err(_) => now,
        };
    }
}
