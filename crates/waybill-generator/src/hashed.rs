use crate::entropy::{Entropy, EntropySource, SystemEntropy};
use crate::hasher::{detect_strategy, Hasher, Sha256Hasher};
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, warn};
use waybill_core::{
    GenerationError, GenerationObserver, GenerationOutcome, Generator, HashStrategy, NoopObserver,
    Shipment, TrackingCode,
};

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";
// 8 digest bytes rendered as two hex characters each.
const DIGEST_PREFIX_BYTES: usize = TrackingCode::LENGTH / 2;
const CUSTOMER_PREFIX_CHARS: usize = 8;

/// Generates tracking codes by hashing shipment fields together with fresh
/// entropy.
///
/// The strategy is fixed when the generator is built: the hasher's self test
/// decides between [`HashStrategy::Primary`] and [`HashStrategy::Fallback`].
/// A primary call that still fails at runtime degrades to the fallback path
/// for that call only.
pub struct HashedGenerator<H = Sha256Hasher, E = SystemEntropy> {
    hasher: H,
    entropy: E,
    strategy: HashStrategy,
    observer: Arc<dyn GenerationObserver>,
}

impl HashedGenerator<Sha256Hasher, SystemEntropy> {
    /// Creates a SHA-256 generator backed by the system entropy sources.
    pub fn new() -> Self {
        Self::with_parts(Sha256Hasher, SystemEntropy)
    }
}

impl Default for HashedGenerator<Sha256Hasher, SystemEntropy> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Hasher, E: EntropySource> HashedGenerator<H, E> {
    /// Creates a generator from a custom hasher and entropy source.
    pub fn with_parts(hasher: H, entropy: E) -> Self {
        let strategy = detect_strategy(&hasher);
        Self {
            hasher,
            entropy,
            strategy,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Replaces the observer generation events are reported to.
    pub fn with_observer(mut self, observer: Arc<dyn GenerationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Overrides the strategy picked by the self test.
    pub fn with_strategy(mut self, strategy: HashStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The strategy selected for this generator.
    pub fn strategy(&self) -> HashStrategy {
        self.strategy
    }

    fn primary(&self, shipment: &Shipment) -> Result<String, GenerationError> {
        let entropy = self.entropy.sample()?;
        let input = composite_input(shipment, &entropy);
        let digest = self.hasher.digest(input.as_bytes())?;

        let mut code = String::with_capacity(TrackingCode::LENGTH);
        for byte in digest.iter().take(DIGEST_PREFIX_BYTES) {
            code.push(HEX_DIGITS[usize::from(byte >> 4)] as char);
            code.push(HEX_DIGITS[usize::from(byte & 0x0F)] as char);
        }

        // Only reachable with a hasher narrower than 64 bits.
        if code.len() < TrackingCode::LENGTH {
            let mut rng = rand::rng();
            while code.len() < TrackingCode::LENGTH {
                code.push(HEX_DIGITS[rng.random_range(0..HEX_DIGITS.len())] as char);
            }
        }
        code.truncate(TrackingCode::LENGTH);

        Ok(code)
    }

    fn fallback(&self, shipment: &Shipment) -> Result<String, GenerationError> {
        let entropy = self.entropy.sample()?;
        let customer_prefix: String = shipment
            .customer_id
            .chars()
            .take(CUSTOMER_PREFIX_CHARS)
            .collect();

        let combined = format!(
            "{}{}{:.0}{}{}{}{}{}",
            shipment.origin,
            shipment.destination,
            shipment.weight * 1000.0,
            customer_prefix,
            entropy.monotonic_nanos,
            entropy.wall_millis,
            entropy.fast,
            entropy.secure,
        );

        let mut code: String = combined
            .chars()
            .map(|c| c.to_ascii_uppercase())
            .filter(|c| TrackingCode::is_valid_char(*c))
            .collect();

        while code.len() < TrackingCode::LENGTH {
            code.push_str(&self.entropy.monotonic_nanos().to_string());
        }
        code.truncate(TrackingCode::LENGTH);

        Ok(code)
    }

    fn run(&self, shipment: &Shipment) -> Result<(String, HashStrategy), GenerationError> {
        let primary_error = match self.strategy {
            HashStrategy::Primary => match self.primary(shipment) {
                Ok(code) => return Ok((code, HashStrategy::Primary)),
                Err(e) => {
                    warn!(error = %e, "primary tracking code path failed, using fallback");
                    self.observer.on_degraded(&e);
                    e
                }
            },
            HashStrategy::Fallback => GenerationError::HashUnavailable(format!(
                "{} disabled by startup self-test",
                self.hasher.name()
            )),
        };

        match self.fallback(shipment) {
            Ok(code) => Ok((code, HashStrategy::Fallback)),
            Err(fallback_error) => Err(GenerationError::Exhausted {
                primary: primary_error.to_string(),
                fallback: fallback_error.to_string(),
            }),
        }
    }
}

impl<H: Hasher, E: EntropySource> Generator for HashedGenerator<H, E> {
    fn generate(&self, shipment: &Shipment) -> Result<TrackingCode, GenerationError> {
        let started = Instant::now();

        match self.run(shipment) {
            Ok((code, strategy)) => {
                let outcome = GenerationOutcome {
                    strategy,
                    elapsed: started.elapsed(),
                };
                self.observer.on_generated(&outcome);
                debug!(
                    origin = %shipment.origin,
                    destination = %shipment.destination,
                    strategy = %strategy,
                    tracking_number = %code,
                    "generated tracking code"
                );
                Ok(TrackingCode::new_unchecked(code))
            }
            Err(e) => {
                error!(error = %e, "tracking code generation failed");
                self.observer.on_failed(&e);
                Err(e)
            }
        }
    }
}

/// Concatenates the shipment fields and entropy without separators.
fn composite_input(shipment: &Shipment, entropy: &Entropy) -> String {
    format!(
        "{}{}{:.3}{}{}{}{}{}",
        shipment.origin,
        shipment.destination,
        shipment.weight,
        shipment.customer_id,
        entropy.monotonic_nanos,
        entropy.wall_millis,
        entropy.fast,
        entropy.secure,
    )
}
