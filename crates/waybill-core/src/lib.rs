//! Core types and traits for the Waybill tracking code service.
//!
//! This crate provides the shared vocabulary used by the generator, the
//! admission limiter and the HTTP gateway.

pub mod error;
pub mod generator;
pub mod observer;
pub mod shipment;
pub mod tracking_code;

pub use error::{CoreError, GenerationError};
pub use generator::Generator;
pub use observer::{GenerationObserver, GenerationOutcome, HashStrategy, NoopObserver};
pub use shipment::Shipment;
pub use tracking_code::TrackingCode;
