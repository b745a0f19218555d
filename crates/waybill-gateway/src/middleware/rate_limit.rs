use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;
use waybill_limiter::ClientIdentity;

use crate::error::{AppError, Result};
use crate::state::AppState;

pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let identity = ClientIdentity::resolve(request.headers(), peer);

    if !state.limiter().allow(identity.as_str()) {
        warn!(client = %identity, "rate limit exceeded");
        return Err(AppError::RateLimitExceeded {
            retry_after: state.retry_after_secs(),
        });
    }

    Ok(next.run(request).await)
}
