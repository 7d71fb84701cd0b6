use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::http::error::{ApiJson, ScanError};
use crate::http::server::AppState;
use crate::security::ClientId;

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitingStatus {
    pub rate_limiting_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn get_rate_limiting(State(state): State<AppState>) -> Json<RateLimitingStatus> {
    Json(RateLimitingStatus {
        rate_limiting_enabled: state.limiter.is_enabled(),
        message: None,
    })
}

pub async fn set_rate_limiting(
    State(state): State<AppState>,
    ClientId(client): ClientId,
    ApiJson(toggle): ApiJson<ToggleRequest>,
) -> Result<Json<RateLimitingStatus>, ScanError> {
    tracing::info!(client = %client, enabled = toggle.enabled, "Rate limiting toggle requested");
    state.limiter.set_enabled(toggle.enabled);

    let word = if toggle.enabled { "enabled" } else { "disabled" };
    Ok(Json(RateLimitingStatus {
        rate_limiting_enabled: state.limiter.is_enabled(),
        message: Some(format!("Rate limiting {}", word)),
    }))
}
