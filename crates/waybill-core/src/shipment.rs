/// The inputs a tracking code is derived from.
///
/// A shipment is transient: it exists for the duration of one generation
/// call. Fields are expected to be validated by the caller; generators must
/// still cope with empty or malformed values.
#[derive(Debug, Clone, PartialEq)]
pub struct Shipment {
    /// ISO 3166-1 alpha-2 code of the origin country.
    pub origin: String,
    /// ISO 3166-1 alpha-2 code of the destination country.
    pub destination: String,
    /// Parcel weight in kilograms.
    pub weight: f64,
    /// Customer identifier, usually a UUID.
    pub customer_id: String,
}

impl Shipment {
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        weight: f64,
        customer_id: impl Into<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            weight,
            customer_id: customer_id.into(),
        }
    }
}
