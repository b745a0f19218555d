use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{health_handler, next_tracking_number_handler};
use crate::middleware::{correlation_id, rate_limit, require_basic_auth};
use crate::state::AppState;

pub const TRACKING_NUMBER_PATH: &str = "/next-tracking-number";

pub struct App {}

impl App {
    /// Builds the gateway router.
    ///
    /// Only the tracking number route is rate limited and authenticated; the
    /// limiter runs before authentication so rejected clients never reach
    /// credential checks.
    pub fn router(state: AppState) -> Router {
        let tracking = Router::new()
            .route(TRACKING_NUMBER_PATH, get(next_tracking_number_handler))
            .route_layer(from_fn_with_state(state.clone(), require_basic_auth))
            .route_layer(from_fn_with_state(state.clone(), rate_limit));

        Router::new()
            .route("/health", get(health_handler))
            .merge(tracking)
            .layer(from_fn(correlation_id))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
