use crate::bucket::TokenBucket;
use crate::clock::{Clock, SystemClock};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};
use typed_builder::TypedBuilder;

/// Configures an [`AdmissionController`].
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct LimiterSettings {
    /// Maximum tokens a client can hold.
    #[builder(default = 100)]
    pub capacity: u32,
    /// Tokens added at every refill point.
    #[builder(default = 100)]
    pub refill_tokens: u32,
    /// Time between refill points.
    #[builder(default = Duration::from_secs(60))]
    pub refill_interval: Duration,
    /// How long a full bucket may sit untouched before it is evicted.
    ///
    /// Raised to `refill_interval` if configured lower.
    #[builder(default = Duration::from_secs(600))]
    pub idle_ttl: Duration,
    /// Upper bound on tracked client identities.
    #[builder(default = 100_000)]
    pub max_clients: usize,
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Token bucket rate limiter keyed by client identity.
///
/// Buckets live in a sharded [`DashMap`]. A token is always taken while the
/// bucket's shard is locked, so eviction and consumption on the same identity
/// are ordered. A miss goes through the entry API, which holds the shard's
/// write lock while the bucket is inserted, so concurrent first requests from
/// one identity all end up sharing a single bucket.
///
/// Once the map grows past `max_clients`, a single capacity sweep shrinks it
/// to the low water mark (`max_clients` minus 10%), leaving headroom for new
/// identities before the next sweep.
pub struct AdmissionController<C: Clock = SystemClock> {
    buckets: DashMap<String, TokenBucket>,
    settings: LimiterSettings,
    clock: C,
    sweeping: AtomicBool,
    capacity_sweeps: AtomicU64,
}

impl AdmissionController<SystemClock> {
    /// Creates a limiter backed by the system monotonic clock.
    pub fn new(settings: LimiterSettings) -> Self {
        Self::with_clock(settings, SystemClock)
    }
}

impl Default for AdmissionController<SystemClock> {
    fn default() -> Self {
        Self::new(LimiterSettings::default())
    }
}

impl<C: Clock> AdmissionController<C> {
    pub fn with_clock(mut settings: LimiterSettings, clock: C) -> Self {
        settings.idle_ttl = settings.idle_ttl.max(settings.refill_interval);
        Self {
            buckets: DashMap::new(),
            settings,
            clock,
            sweeping: AtomicBool::new(false),
            capacity_sweeps: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> &LimiterSettings {
        &self.settings
    }

    /// Consumes one token for `identity`, returning whether the request is
    /// admitted. Never fails: an unseen identity starts with a full bucket.
    pub fn allow(&self, identity: &str) -> bool {
        let now = self.clock.now();

        if let Some(bucket) = self.buckets.get(identity) {
            return bucket.try_consume(now);
        }

        let allowed = match self.buckets.entry(identity.to_owned()) {
            Entry::Occupied(entry) => return entry.get().try_consume(now),
            Entry::Vacant(entry) => {
                let bucket = TokenBucket::new(
                    self.settings.capacity,
                    self.settings.refill_tokens,
                    self.settings.refill_interval,
                    now,
                );
                let allowed = bucket.try_consume(now);
                entry.insert(bucket);
                allowed
            }
        };

        // the shard guard is released here; sweeping iterates every shard
        if self.buckets.len() > self.settings.max_clients {
            self.enforce_capacity(now);
        }

        allowed
    }

    /// Tokens left for `identity`, or `None` if it has no bucket.
    pub fn remaining(&self, identity: &str) -> Option<u32> {
        let now = self.clock.now();
        self.buckets
            .get(identity)
            .map(|bucket| bucket.available(now))
    }

    /// Number of client identities currently tracked.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of capacity sweeps run since the limiter was created.
    pub fn capacity_sweeps(&self) -> u64 {
        self.capacity_sweeps.load(Ordering::Relaxed)
    }

    /// Drops every bucket that has been idle for the configured TTL.
    ///
    /// Returns the number of buckets removed.
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(self.clock.now())
    }

    /// Starts a background task that calls [`evict_idle`](Self::evict_idle)
    /// every `period`. The task stops once the limiter is dropped.
    pub fn spawn_eviction(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let limiter = Arc::downgrade(self);
        let period = period.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(limiter) = limiter.upgrade() else {
                    break;
                };
                let evicted = limiter.evict_idle();
                if evicted > 0 {
                    debug!(
                        evicted,
                        remaining = limiter.bucket_count(),
                        "evicted idle rate limit buckets"
                    );
                }
            }
        })
    }

    fn evict_idle_at(&self, now: Instant) -> usize {
        let before = self.buckets.len();
        let ttl = self.settings.idle_ttl;
        self.buckets.retain(|_, bucket| !bucket.is_idle(now, ttl));
        before.saturating_sub(self.buckets.len())
    }

    fn low_water_mark(&self) -> usize {
        let max = self.settings.max_clients;
        max - max / 10
    }

    fn enforce_capacity(&self, now: Instant) {
        // one sweeper at a time; other callers proceed without waiting
        if self
            .sweeping
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        let sweep = self.capacity_sweeps.fetch_add(1, Ordering::Relaxed) + 1;
        let idle = self.evict_idle_at(now);

        let mut lru_evicted = 0usize;
        let excess = self.buckets.len().saturating_sub(self.low_water_mark());
        if excess > 0 {
            let mut by_last_seen: Vec<(String, Instant)> = self
                .buckets
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().last_seen()))
                .collect();
            if excess < by_last_seen.len() {
                by_last_seen.select_nth_unstable_by_key(excess, |(_, last_seen)| *last_seen);
            }

            for (identity, _) in by_last_seen.into_iter().take(excess) {
                if self.buckets.remove(&identity).is_some() {
                    lru_evicted += 1;
                }
            }
        }

        self.sweeping.store(false, Ordering::Release);

        warn!(
            sweep,
            idle_evicted = idle,
            lru_evicted,
            remaining = self.buckets.len(),
            max_clients = self.settings.max_clients,
            "rate limit map over capacity, evicted least recently seen clients"
        );
    }
}
