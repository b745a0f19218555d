use std::collections::BTreeMap;

use axum::extract::rejection::QueryRejection;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use jiff::Timestamp;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use waybill_core::GenerationError;

pub type Result<T> = std::result::Result<T, AppError>;

pub const BASIC_REALM: &str = "Basic realm=\"waybill\"";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    ValidationFailed(BTreeMap<&'static str, String>),
    #[error("required parameter '{0}' is missing")]
    MissingParameter(&'static str),
    #[error("parameter '{parameter}' should be of type {expected}")]
    InvalidParameterType {
        parameter: &'static str,
        expected: &'static str,
    },
    #[error("invalid query string: {0}")]
    MalformedQuery(String),
    #[error("rate limit exceeded")]
    RateLimitExceeded { retry_after: u64 },
    #[error("authentication required")]
    Unauthenticated,
    #[error("failed to generate tracking number: {0}")]
    Generation(
        #[from]
        #[source]
        GenerationError,
    ),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::MalformedQuery(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: &'static str,
    message: String,
    timestamp: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_errors: Option<BTreeMap<&'static str, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameter: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl ErrorBody {
    fn new(error: &'static str, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
            timestamp: Timestamp::now(),
            field_errors: None,
            parameter: None,
            expected_type: None,
            retry_after: None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationFailed(_)
            | AppError::MissingParameter(_)
            | AppError::InvalidParameterType { .. }
            | AppError::MalformedQuery(_) => StatusCode::BAD_REQUEST,
            AppError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Generation(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine readable code carried in the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationFailed(_) | AppError::MalformedQuery(_) => "VALIDATION_FAILED",
            AppError::MissingParameter(_) => "MISSING_PARAMETER",
            AppError::InvalidParameterType { .. } => "INVALID_PARAMETER_TYPE",
            AppError::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            AppError::Unauthenticated => "UNAUTHORIZED",
            AppError::Generation(_) => "TRACKING_NUMBER_GENERATION_FAILED",
            AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn body(self) -> ErrorBody {
        let code = self.code();
        match self {
            AppError::ValidationFailed(field_errors) => ErrorBody {
                field_errors: Some(field_errors),
                ..ErrorBody::new(code, "Input validation failed")
            },
            AppError::MissingParameter(parameter) => ErrorBody {
                parameter: Some(parameter),
                ..ErrorBody::new(
                    code,
                    format!("Required parameter '{parameter}' is missing"),
                )
            },
            AppError::InvalidParameterType {
                parameter,
                expected,
            } => ErrorBody {
                parameter: Some(parameter),
                expected_type: Some(expected),
                ..ErrorBody::new(
                    code,
                    format!("Parameter '{parameter}' should be of type {expected}"),
                )
            },
            AppError::MalformedQuery(message) => ErrorBody::new(code, message),
            AppError::RateLimitExceeded { retry_after } => ErrorBody {
                retry_after: Some(retry_after),
                ..ErrorBody::new(code, "Too many requests. Please try again later.")
            },
            AppError::Unauthenticated => ErrorBody::new(code, "Authentication required"),
            // details stay in the logs
            AppError::Generation(_) => {
                ErrorBody::new(code, "Failed to generate tracking number")
            }
            AppError::Internal(_) => ErrorBody::new(code, "An unexpected error occurred"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, code = self.code(), "request failed");
        }

        let extra_header = match &self {
            AppError::RateLimitExceeded { retry_after } => {
                Some((header::RETRY_AFTER, HeaderValue::from(*retry_after)))
            }
            AppError::Unauthenticated => Some((
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(BASIC_REALM),
            )),
            _ => None,
        };

        let mut response = (status, Json(self.body())).into_response();
        if let Some((name, value)) = extra_header {
            response.headers_mut().insert(name, value);
        }
        response
    }
}
