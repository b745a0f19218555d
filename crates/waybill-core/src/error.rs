use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors related to the core value types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("invalid tracking code: {0}")]
    InvalidTrackingCode(String),
}

/// Errors raised while producing a tracking code.
///
/// Only [`GenerationError::Exhausted`] ever leaves a generator: the other
/// variants describe why a single path failed and are carried inside it or
/// handed to an observer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("entropy source unavailable: {0}")]
    EntropyUnavailable(String),
    #[error("hash primitive unavailable: {0}")]
    HashUnavailable(String),
    #[error("tracking code generation failed (primary: {primary}; fallback: {fallback})")]
    Exhausted { primary: String, fallback: String },
}
