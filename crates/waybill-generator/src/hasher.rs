use sha2::{Digest, Sha256};
use tracing::{info, warn};
use waybill_core::{GenerationError, HashStrategy};

/// A hash primitive the primary generation path can use.
pub trait Hasher: Send + Sync + 'static {
    /// Human readable name, used in logs.
    fn name(&self) -> &'static str;

    /// Hashes `input`, or reports that the primitive is unavailable.
    fn digest(&self, input: &[u8]) -> Result<Vec<u8>, GenerationError>;

    /// Checks that the primitive works in this process.
    ///
    /// The default only checks that a non-empty digest comes back.
    fn self_test(&self) -> Result<(), GenerationError> {
        let digest = self.digest(b"waybill")?;
        if digest.is_empty() {
            return Err(GenerationError::HashUnavailable(format!(
                "{} produced an empty digest",
                self.name()
            )));
        }
        Ok(())
    }
}

/// SHA-256 from the `sha2` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

// SHA-256("abc"), FIPS 180-2 appendix B.1
const SHA256_ABC: [u8; 32] = [
    0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae, 0x22, 0x23,
    0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61, 0xf2, 0x00, 0x15, 0xad,
];

impl Hasher for Sha256Hasher {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn digest(&self, input: &[u8]) -> Result<Vec<u8>, GenerationError> {
        Ok(Sha256::digest(input).to_vec())
    }

    fn self_test(&self) -> Result<(), GenerationError> {
        let digest = self.digest(b"abc")?;
        if digest[..] != SHA256_ABC[..] {
            return Err(GenerationError::HashUnavailable(
                "sha256 known-answer test failed".to_string(),
            ));
        }
        Ok(())
    }
}

/// Picks the process-wide strategy by running the hasher's self test once.
pub fn detect_strategy<H: Hasher>(hasher: &H) -> HashStrategy {
    match hasher.self_test() {
        Ok(()) => {
            info!(hasher = hasher.name(), "hash self-test passed, using primary strategy");
            HashStrategy::Primary
        }
        Err(e) => {
            warn!(hasher = hasher.name(), error = %e, "hash self-test failed, using fallback strategy");
            HashStrategy::Fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenHasher;

    impl Hasher for BrokenHasher {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn digest(&self, _input: &[u8]) -> Result<Vec<u8>, GenerationError> {
            Err(GenerationError::HashUnavailable("no provider".to_string()))
        }
    }

    struct EmptyHasher;

    impl Hasher for EmptyHasher {
        fn name(&self) -> &'static str {
            "empty"
        }

        fn digest(&self, _input: &[u8]) -> Result<Vec<u8>, GenerationError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn sha256_passes_known_answer_test() {
        assert!(Sha256Hasher.self_test().is_ok());
        assert_eq!(detect_strategy(&Sha256Hasher), HashStrategy::Primary);
    }

    #[test]
    fn sha256_digest_is_32_bytes() {
        assert_eq!(Sha256Hasher.digest(b"").unwrap().len(), 32);
    }

    #[test]
    fn unavailable_hasher_selects_fallback() {
        assert_eq!(detect_strategy(&BrokenHasher), HashStrategy::Fallback);
    }

    #[test]
    fn empty_digest_fails_default_self_test() {
        assert!(matches!(
            EmptyHasher.self_test(),
            Err(GenerationError::HashUnavailable(_))
        ));
        assert_eq!(detect_strategy(&EmptyHasher), HashStrategy::Fallback);
    }
}
