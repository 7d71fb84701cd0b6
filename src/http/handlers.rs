//! Public API handlers.

use std::collections::BTreeMap;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::audit::{LogEntry, ScanRecord};
use crate::http::error::{ApiJson, ScanError};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::scanner::ScanOutcome;
use crate::security::{ClientId, RateCategory};
use crate::settings::{Settings, SettingsUpdate};

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub payload: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RateLimitStats {
    pub message: &'static str,
    pub enabled: bool,
    pub limits: BTreeMap<&'static str, String>,
    pub tracked_windows: usize,
    pub note: &'static str,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn scan(
    State(state): State<AppState>,
    client: ClientId,
    ApiJson(request): ApiJson<ScanRequest>,
) -> Result<Json<ScanOutcome>, ScanError> {
    if request.payload.is_empty() {
        return Err(ScanError::InvalidInput("payload must not be empty".to_string()));
    }

    let settings = state.settings.read();
    let outcome = state.scanner.scan(&request.payload, settings);

    tracing::info!(
        client = %client,
        classification = %outcome.classification,
        hits = outcome.rule_hits.len(),
        action = %outcome.action,
        sensitivity = %outcome.sensitivity,
        "Payload scanned"
    );
    metrics::record_scan(outcome.classification, outcome.action);

    // Fire and forget: storage latency or failure never reaches the caller.
    let _ = state.audit.submit(ScanRecord::new(request.payload, &outcome));

    Ok(Json(outcome))
}

pub async fn get_config(State(state): State<AppState>) -> Json<Settings> {
    Json(state.settings.read())
}

pub async fn update_config(
    State(state): State<AppState>,
    client: ClientId,
    ApiJson(update): ApiJson<SettingsUpdate>,
) -> Result<Json<Settings>, ScanError> {
    let settings = state.settings.update(update)?;

    tracing::info!(
        client = %client,
        sensitivity = %settings.sensitivity,
        safe_mode = settings.safe_mode,
        "Scan settings updated"
    );
    metrics::record_config_update();

    Ok(Json(settings))
}

pub async fn logs(
    State(state): State<AppState>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> Result<Json<Vec<LogEntry>>, ScanError> {
    let Query(query) = query.map_err(|rejection| ScanError::InvalidInput(rejection.body_text()))?;
    let limit = query.limit.unwrap_or(state.log_page_size);
    Ok(Json(state.audit.recent(limit)?))
}

pub async fn rate_limit_stats(State(state): State<AppState>) -> Json<RateLimitStats> {
    let enabled = state.limiter.is_enabled();
    let limits = RateCategory::ALL
        .into_iter()
        .map(|category| (category.as_str(), state.limiter.policy(category).describe()))
        .collect();

    Json(RateLimitStats {
        message: "Rate limiting system status",
        enabled,
        limits,
        tracked_windows: state.limiter.tracked_windows(),
        note: if enabled {
            "Rate limiting is currently ACTIVE"
        } else {
            "Rate limiting is currently DISABLED"
        },
    })
}
