//! HTTP gateway for the Waybill tracking code service.
//!
//! Exposes `GET /next-tracking-number` behind per-client rate limiting and
//! HTTP basic authentication, plus an unauthenticated `GET /health`.

pub mod app;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod observer;
pub mod state;
pub mod telemetry;

pub use app::App;
pub use state::AppState;
