//! Tracking code generation.
//!
//! [`HashedGenerator`] mixes a shipment's fields with four fresh entropy
//! samples and derives a 16-character `[A-Z0-9]` code, either from a SHA-256
//! digest or, when the hash primitive is unavailable, from a cleaned-up copy
//! of the composite input.

pub mod entropy;
pub mod hashed;
pub mod hasher;

pub use entropy::{Entropy, EntropySource, SystemEntropy};
pub use hashed::HashedGenerator;
pub use hasher::{detect_strategy, Hasher, Sha256Hasher};
