//! Request-scoped errors and their HTTP mapping.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use crate::audit::AuditError;
use crate::scanner::ParseSensitivityError;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests. Please try again later.";

/// Everything a single request can fail with. None of these affect other requests.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Rate limit exceeded: {policy}")]
    RateLimited { retry_after_secs: u64, policy: String },

    #[error("Missing or invalid admin credentials")]
    Unauthorized,

    #[error("Scan log unavailable: {0}")]
    LogsUnavailable(#[from] AuditError),
}

impl From<ParseSensitivityError> for ScanError {
    fn from(err: ParseSensitivityError) -> Self {
        ScanError::InvalidInput(err.to_string())
    }
}

impl From<JsonRejection> for ScanError {
    fn from(rejection: JsonRejection) -> Self {
        ScanError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        match self {
            ScanError::InvalidInput(detail) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
            }
            ScanError::RateLimited { retry_after_secs, ref policy } => {
                let body = Json(json!({
                    "detail": format!("Rate limit exceeded: {}", policy),
                    "retry_after": retry_after_secs,
                    "message": RATE_LIMIT_MESSAGE,
                }));
                let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                response
            }
            ScanError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "detail": "Missing or invalid admin credentials" })),
            )
                .into_response(),
            ScanError::LogsUnavailable(err) => {
                tracing::error!(error = %err, "Failed to read scan log");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "detail": "Scan log unavailable" })),
                )
                    .into_response()
            }
        }
    }
}

/// `Json` whose rejection is a [`ScanError::InvalidInput`], so malformed
/// bodies get the same `{"detail": ...}` shape as every other error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ScanError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_rate_limited_shape() {
        let response = ScanError::RateLimited {
            retry_after_secs: 42,
            policy: "20 per minute".into(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");

        let body = body_json(response).await;
        assert_eq!(body["detail"], "Rate limit exceeded: 20 per minute");
        assert_eq!(body["retry_after"], 42);
        assert_eq!(body["message"], RATE_LIMIT_MESSAGE);
    }

    #[tokio::test]
    async fn test_invalid_sensitivity_is_bad_request() {
        let err: ScanError = ParseSensitivityError("Extreme".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["detail"].as_str().unwrap().contains("Extreme"));
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let response = ScanError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
