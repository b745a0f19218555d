use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use waybill_core::{Shipment, TrackingCode};

use crate::error::AppError;

/// Raw query string of `GET /next-tracking-number`.
///
/// Every field is optional here so that missing and malformed parameters can
/// be reported individually instead of as one opaque rejection.
#[derive(Debug, Default, Deserialize)]
pub struct TrackingNumberQuery {
    pub origin_country_id: Option<String>,
    pub destination_country_id: Option<String>,
    pub weight: Option<String>,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_slug: Option<String>,
    pub created_at: Option<String>,
}

/// A validated tracking number request.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingNumberRequest {
    pub origin_country_id: String,
    pub destination_country_id: String,
    pub weight: f64,
    pub customer_id: String,
    /// Accepted but not used for generation.
    pub customer_name: Option<String>,
    /// Accepted but not used for generation.
    pub customer_slug: Option<String>,
    /// Accepted but never echoed; responses carry the server's timestamp.
    pub created_at: Option<String>,
}

impl TrackingNumberRequest {
    pub fn shipment(&self) -> Shipment {
        Shipment::new(
            self.origin_country_id.as_str(),
            self.destination_country_id.as_str(),
            self.weight,
            self.customer_id.as_str(),
        )
    }
}

impl TryFrom<TrackingNumberQuery> for TrackingNumberRequest {
    type Error = AppError;

    fn try_from(query: TrackingNumberQuery) -> Result<Self, Self::Error> {
        let origin_country_id = required("origin_country_id", query.origin_country_id)?;
        let destination_country_id =
            required("destination_country_id", query.destination_country_id)?;
        let raw_weight = required("weight", query.weight)?;
        let customer_id = required("customer_id", query.customer_id)?;

        let weight: f64 = raw_weight
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidParameterType {
                parameter: "weight",
                expected: "double",
            })?;

        let mut field_errors = BTreeMap::new();
        if !is_country_code(&origin_country_id) {
            field_errors.insert(
                "origin_country_id",
                "Origin country code must be in ISO 3166-1 alpha-2 format".to_string(),
            );
        }
        if !is_country_code(&destination_country_id) {
            field_errors.insert(
                "destination_country_id",
                "Destination country code must be in ISO 3166-1 alpha-2 format".to_string(),
            );
        }
        if !(weight.is_finite() && weight > 0.0) {
            field_errors.insert("weight", "Weight must be positive".to_string());
        }
        if !is_lowercase_uuid(&customer_id) {
            field_errors.insert("customer_id", "Customer ID must be a valid UUID".to_string());
        }
        if let Some(slug) = &query.customer_slug {
            if !is_kebab_case(slug) {
                field_errors.insert(
                    "customer_slug",
                    "Customer slug must be kebab-case".to_string(),
                );
            }
        }

        if !field_errors.is_empty() {
            return Err(AppError::ValidationFailed(field_errors));
        }

        Ok(Self {
            origin_country_id,
            destination_country_id,
            weight,
            customer_id,
            customer_name: query.customer_name,
            customer_slug: query.customer_slug,
            created_at: query.created_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct TrackingNumberResponse {
    pub tracking_number: TrackingCode,
    pub created_at: Timestamp,
    pub origin_country_id: String,
    pub destination_country_id: String,
}

fn required(name: &'static str, value: Option<String>) -> Result<String, AppError> {
    value.ok_or(AppError::MissingParameter(name))
}

/// `[A-Z]{2}`
fn is_country_code(value: &str) -> bool {
    value.len() == 2 && value.bytes().all(|b| b.is_ascii_uppercase())
}

/// `[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}`
fn is_lowercase_uuid(value: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

    let groups: Vec<&str> = value.split('-').collect();
    groups.len() == GROUPS.len()
        && groups.iter().zip(GROUPS).all(|(group, len)| {
            group.len() == len
                && group
                    .bytes()
                    .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        })
}

/// Lowercase alphanumeric words joined by single hyphens.
fn is_kebab_case(value: &str) -> bool {
    !value.is_empty()
        && value.split('-').all(|word| {
            !word.is_empty()
                && word
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}
