use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::Display;

/// A validated public tracking code.
///
/// Tracking codes are exactly 16 characters drawn from `[A-Z0-9]`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TrackingCode(SmolStr);

impl TrackingCode {
    /// Number of characters in every tracking code.
    pub const LENGTH: usize = 16;

    /// Creates a new `TrackingCode` after validating the input.
    pub fn new(code: impl AsRef<str>) -> Result<Self, CoreError> {
        let code = code.as_ref();
        Self::validate(code)?;
        Ok(Self(SmolStr::new(code)))
    }

    /// Creates a `TrackingCode` without validation.
    ///
    /// Use this only for codes produced by generators that already
    /// guarantee the length and alphabet.
    pub fn new_unchecked(code: impl AsRef<str>) -> Self {
        debug_assert!(Self::validate(code.as_ref()).is_ok());
        Self(SmolStr::new(code))
    }

    /// Returns `true` if `c` belongs to the tracking code alphabet.
    pub fn is_valid_char(c: char) -> bool {
        c.is_ascii_uppercase() || c.is_ascii_digit()
    }

    /// Returns the tracking code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(code: &str) -> Result<(), CoreError> {
        if code.len() != Self::LENGTH {
            return Err(CoreError::InvalidTrackingCode(format!(
                "length must be {}, got {}",
                Self::LENGTH,
                code.len()
            )));
        }

        if !code.chars().all(Self::is_valid_char) {
            return Err(CoreError::InvalidTrackingCode(format!(
                "must contain only uppercase letters and digits: '{}'",
                code
            )));
        }

        Ok(())
    }
}

impl std::fmt::Debug for TrackingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TrackingCode").field(&self.0).finish()
    }
}

impl Display for TrackingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TrackingCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for TrackingCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TrackingCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = SmolStr::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}
