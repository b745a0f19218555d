use axum::extract::Request;
use axum::http::{HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info_span, Instrument};
use uuid::Uuid;

pub const X_CORRELATION_ID: HeaderName = HeaderName::from_static("x-correlation-id");

/// Tags every request with a correlation id and echoes it on the response.
///
/// A non-blank inbound `X-Correlation-ID` is reused; otherwise a fresh UUID v4
/// is minted.
pub async fn correlation_id(mut request: Request, next: Next) -> Response {
    let inbound = request
        .headers()
        .get(&X_CORRELATION_ID)
        .filter(|value| value.to_str().is_ok_and(|v| !v.trim().is_empty()))
        .cloned();

    let value = match inbound {
        Some(value) => value,
        None => {
            let generated = HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
            request
                .headers_mut()
                .insert(X_CORRELATION_ID, generated.clone());
            generated
        }
    };

    let span = info_span!(
        "request",
        correlation_id = value.to_str().unwrap_or_default(),
        method = %request.method(),
        path = %request.uri().path(),
    );

    let mut response = next.run(request).instrument(span).await;
    response.headers_mut().insert(X_CORRELATION_ID, value);
    response
}
