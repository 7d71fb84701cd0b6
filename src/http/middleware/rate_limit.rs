//! Rate limiting middleware.
//! Maps each route to its category and enforces the client's window.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::http::error::ScanError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::{client_id, RateCategory, RateDecision};

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ScanError> {
    let Some(category) = RateCategory::for_route(request.method(), request.uri().path()) else {
        return Ok(next.run(request).await);
    };

    let client = client_id(request.headers());
    match state.limiter.check(&client, category) {
        RateDecision::Allowed => Ok(next.run(request).await),
        RateDecision::Limited { retry_after_secs } => {
            tracing::warn!(
                client = %client,
                category = %category,
                retry_after_secs,
                "Rate limit exceeded"
            );
            metrics::record_rate_limited(category);
            Err(ScanError::RateLimited {
                retry_after_secs,
                policy: state.limiter.policy(category).describe(),
            })
        }
    }
}
