use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use tower::ServiceExt;
use waybill_core::{GenerationError, Generator, Shipment, TrackingCode};
use waybill_gateway::middleware::{Credentials, X_CORRELATION_ID};
use waybill_gateway::{App, AppState};
use waybill_generator::HashedGenerator;
use waybill_limiter::{AdmissionController, LimiterSettings};

const VALID_QUERY: &str = "origin_country_id=MY&destination_country_id=ID&weight=1.234\
&created_at=2018-11-20T19:29:32%2B08:00&customer_id=de619854-b59b-425e-9db4-943979e1bd49\
&customer_name=RedBox%20Logistics&customer_slug=redbox-logistics";

fn router_with(generator: Arc<dyn Generator>, settings: LimiterSettings) -> Router {
    let state = AppState::new(
        generator,
        Arc::new(AdmissionController::new(settings)),
        Credentials::new("developer", "test123"),
    );
    App::router(state)
}

fn router() -> Router {
    router_with(Arc::new(HashedGenerator::new()), LimiterSettings::default())
}

fn authorization(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

fn tracking_request(query: &str) -> axum::http::request::Builder {
    Request::builder()
        .uri(format!("/next-tracking-number?{query}"))
        .header(header::AUTHORIZATION, authorization("developer", "test123"))
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

async fn json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(router: &Router, query: &str) -> Response {
    send(router, tracking_request(query).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn valid_request_returns_tracking_number() {
    let router = router();
    let response = get(&router, VALID_QUERY).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    let code = body["tracking_number"].as_str().unwrap();
    assert!(TrackingCode::new(code).is_ok(), "{code} is not a tracking code");
    assert_eq!(body["origin_country_id"], "MY");
    assert_eq!(body["destination_country_id"], "ID");

    let created_at = body["created_at"].as_str().unwrap();
    assert_ne!(created_at, "2018-11-20T19:29:32+08:00");
    assert!(created_at.parse::<jiff::Timestamp>().is_ok());
}

#[tokio::test]
async fn consecutive_identical_requests_get_distinct_codes() {
    let router = router();
    let mut codes = HashSet::new();
    for _ in 0..20 {
        let body = json(get(&router, VALID_QUERY).await).await;
        codes.insert(body["tracking_number"].as_str().unwrap().to_string());
    }
    assert_eq!(codes.len(), 20);
}

#[tokio::test]
async fn invalid_origin_is_a_validation_failure() {
    let router = router();
    let query = VALID_QUERY.replace("origin_country_id=MY", "origin_country_id=INVALID");
    let response = get(&router, &query).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json(response).await;
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert_eq!(
        body["fieldErrors"]["origin_country_id"],
        "Origin country code must be in ISO 3166-1 alpha-2 format"
    );
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn negative_weight_is_rejected() {
    let router = router();
    let query = VALID_QUERY.replace("weight=1.234", "weight=-1.0");
    let response = get(&router, &query).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(response).await["fieldErrors"]["weight"], "Weight must be positive");
}

#[tokio::test]
async fn malformed_customer_id_is_rejected() {
    let router = router();
    let query = VALID_QUERY.replace(
        "customer_id=de619854-b59b-425e-9db4-943979e1bd49",
        "customer_id=invalid-uuid",
    );
    let body = json(get(&router, &query).await).await;
    assert_eq!(body["fieldErrors"]["customer_id"], "Customer ID must be a valid UUID");
}

#[tokio::test]
async fn bad_slug_is_rejected() {
    let router = router();
    let query = VALID_QUERY.replace("customer_slug=redbox-logistics", "customer_slug=RedBox");
    let body = json(get(&router, &query).await).await;
    assert_eq!(body["error"], "VALIDATION_FAILED");
    assert!(body["fieldErrors"]["customer_slug"].is_string());
}

#[tokio::test]
async fn missing_parameter_is_reported() {
    let router = router();
    let response = get(
        &router,
        "origin_country_id=MY&destination_country_id=ID&weight=1.234",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json(response).await;
    assert_eq!(body["error"], "MISSING_PARAMETER");
    assert_eq!(body["parameter"], "customer_id");
}

#[tokio::test]
async fn non_numeric_weight_is_a_type_error() {
    let router = router();
    let query = VALID_QUERY.replace("weight=1.234", "weight=abc");
    let response = get(&router, &query).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json(response).await;
    assert_eq!(body["error"], "INVALID_PARAMETER_TYPE");
    assert_eq!(body["parameter"], "weight");
    assert_eq!(body["expectedType"], "double");
}

#[tokio::test]
async fn missing_credentials_are_unauthorized() {
    let router = router();
    let request = Request::builder()
        .uri(format!("/next-tracking-number?{VALID_QUERY}"))
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers()[header::WWW_AUTHENTICATE]
        .to_str()
        .unwrap()
        .starts_with("Basic"));
    assert_eq!(json(response).await["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let router = router();
    let request = Request::builder()
        .uri(format!("/next-tracking-number?{VALID_QUERY}"))
        .header(header::AUTHORIZATION, authorization("developer", "nope"))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&router, request).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn hundred_and_first_request_is_rate_limited() {
    let router = router();
    for i in 0..100 {
        let response = get(&router, VALID_QUERY).await;
        assert_eq!(response.status(), StatusCode::OK, "request {}", i + 1);
    }

    let response = get(&router, VALID_QUERY).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[header::RETRY_AFTER], "60");

    let body = json(response).await;
    assert_eq!(body["error"], "RATE_LIMIT_EXCEEDED");
    assert_eq!(body["retryAfter"], 60);
}

#[tokio::test]
async fn rate_limit_applies_before_authentication() {
    let router = router_with(
        Arc::new(HashedGenerator::new()),
        LimiterSettings::builder().capacity(1).refill_tokens(1).build(),
    );
    let unauthenticated = || {
        Request::builder()
            .uri(format!("/next-tracking-number?{VALID_QUERY}"))
            .body(Body::empty())
            .unwrap()
    };

    assert_eq!(
        send(&router, unauthenticated()).await.status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        send(&router, unauthenticated()).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[tokio::test]
async fn forwarded_clients_have_separate_budgets() {
    let router = router_with(
        Arc::new(HashedGenerator::new()),
        LimiterSettings::builder().capacity(2).refill_tokens(2).build(),
    );
    let from = |client: &str| {
        tracking_request(VALID_QUERY)
            .header("x-forwarded-for", format!("{client}, 10.0.0.1"))
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..2 {
        assert_eq!(send(&router, from("203.0.113.5")).await.status(), StatusCode::OK);
    }
    assert_eq!(
        send(&router, from("203.0.113.5")).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(send(&router, from("198.51.100.2")).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn retry_after_follows_refill_interval() {
    let router = router_with(
        Arc::new(HashedGenerator::new()),
        LimiterSettings::builder()
            .capacity(1)
            .refill_tokens(1)
            .refill_interval(Duration::from_secs(30))
            .build(),
    );
    assert_eq!(get(&router, VALID_QUERY).await.status(), StatusCode::OK);

    let response = get(&router, VALID_QUERY).await;
    assert_eq!(response.headers()[header::RETRY_AFTER], "30");
    assert_eq!(json(response).await["retryAfter"], 30);
}

#[tokio::test]
async fn health_bypasses_auth_and_limits() {
    let router = router_with(
        Arc::new(HashedGenerator::new()),
        LimiterSettings::builder().capacity(1).refill_tokens(1).build(),
    );
    for _ in 0..5 {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = send(&router, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["status"], "ok");
    }
}

#[tokio::test]
async fn correlation_id_is_echoed() {
    let router = router();
    let request = Request::builder()
        .uri("/health")
        .header(&X_CORRELATION_ID, "order-42")
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;
    assert_eq!(response.headers()[&X_CORRELATION_ID], "order-42");
}

#[tokio::test]
async fn correlation_id_is_generated_when_absent() {
    let router = router();
    let response = get(&router, VALID_QUERY).await;
    let generated = response.headers()[&X_CORRELATION_ID].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());

    // error responses carry one too
    let request = Request::builder()
        .uri("/next-tracking-number")
        .header(&X_CORRELATION_ID, "   ")
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;
    let generated = response.headers()[&X_CORRELATION_ID].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());
}

struct FailingGenerator;

impl Generator for FailingGenerator {
    fn generate(&self, _shipment: &Shipment) -> Result<TrackingCode, GenerationError> {
        Err(GenerationError::Exhausted {
            primary: "hash unavailable".to_string(),
            fallback: "entropy unavailable".to_string(),
        })
    }
}

#[tokio::test]
async fn exhausted_generator_returns_server_error() {
    let router = router_with(Arc::new(FailingGenerator), LimiterSettings::default());
    let response = get(&router, VALID_QUERY).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json(response).await["error"],
        "TRACKING_NUMBER_GENERATION_FAILED"
    );
}
