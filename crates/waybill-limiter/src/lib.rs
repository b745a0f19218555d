//! Per-client admission control for the tracking code endpoint.
//!
//! Every client identity owns a [`TokenBucket`] that refills in one batch per
//! interval. Buckets are created lazily and atomically on first sight, and
//! idle buckets are evicted so the map stays bounded.

mod bucket;
mod clock;
mod identity;
mod limiter;

pub use bucket::TokenBucket;
pub use clock::{Clock, SystemClock};
pub use identity::{ClientIdentity, X_FORWARDED_FOR, X_REAL_IP};
pub use limiter::{AdmissionController, LimiterSettings};
