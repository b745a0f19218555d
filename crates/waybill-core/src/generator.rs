use crate::error::GenerationError;
use crate::shipment::Shipment;
use crate::tracking_code::TrackingCode;

/// Trait for generating tracking codes.
///
/// Implementations are pure generators that don't interact with storage.
/// Uniqueness is probabilistic and comes from the entropy an implementation
/// mixes in, not from any coordinated sequence.
pub trait Generator: Send + Sync + 'static {
    /// Generates a tracking code for the given shipment.
    ///
    /// Must not fail because of the shipment's content. An error means every
    /// generation path the implementation has was exhausted.
    fn generate(&self, shipment: &Shipment) -> Result<TrackingCode, GenerationError>;
}
