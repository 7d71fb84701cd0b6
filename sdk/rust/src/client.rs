use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    #[error("rate limited, retry after {retry_after}s: {detail}")]
    RateLimited { retry_after: u64, detail: String },

    #[error("server returned {status}: {detail}")]
    Api { status: u16, detail: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScanResult {
    pub classification: String,
    pub rule_hits: Vec<String>,
    pub ml_score: Option<f64>,
    pub sensitivity: String,
    pub safe_mode: bool,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScanSettings {
    pub sensitivity: String,
    pub safe_mode: bool,
}

/// Partial settings update; `None` fields are not sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safe_mode: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub timestamp: String,
    pub payload: String,
    pub classification: String,
    pub rule_hits: Vec<String>,
    pub ml_score: Option<f64>,
    pub sensitivity: String,
    pub safe_mode: bool,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitingStatus {
    pub rate_limiting_enabled: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RateLimitStats {
    pub enabled: bool,
    pub limits: BTreeMap<String, String>,
    pub tracked_windows: usize,
}

pub struct ShieldClient {
    client: Client,
    base_url: String,
    headers: HeaderMap,
}

impl ShieldClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: HeaderMap::new(),
        }
    }

    /// Send `Authorization: Bearer <key>` on every request.
    pub fn with_api_key(mut self, key: &str) -> Result<Self, SdkError> {
        let value = HeaderValue::from_str(&format!("Bearer {}", key))?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    /// Identify as `client` to the rate limiter, as a fronting proxy would.
    pub fn with_forwarded_for(mut self, client: &str) -> Result<Self, SdkError> {
        self.headers.insert("x-forwarded-for", HeaderValue::from_str(client)?);
        Ok(self)
    }

    pub async fn health(&self) -> Result<String, SdkError> {
        let body: Value = self.send(self.client.get(self.url("/health"))).await?;
        Ok(body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    pub async fn scan(&self, payload: &str) -> Result<ScanResult, SdkError> {
        let body = serde_json::json!({ "payload": payload });
        self.send(self.client.post(self.url("/scan")).json(&body)).await
    }

    pub async fn get_config(&self) -> Result<ScanSettings, SdkError> {
        self.send(self.client.get(self.url("/config"))).await
    }

    pub async fn update_config(&self, patch: &SettingsPatch) -> Result<ScanSettings, SdkError> {
        self.send(self.client.post(self.url("/config")).json(patch)).await
    }

    /// Newest-first scan records; the server picks the page size when `limit` is `None`.
    pub async fn logs(&self, limit: Option<usize>) -> Result<Vec<LogEntry>, SdkError> {
        let mut request = self.client.get(self.url("/logs"));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        self.send(request).await
    }

    pub async fn rate_limit_stats(&self) -> Result<RateLimitStats, SdkError> {
        self.send(self.client.get(self.url("/rate-limit-stats"))).await
    }

    pub async fn rate_limiting(&self) -> Result<RateLimitingStatus, SdkError> {
        self.send(self.client.get(self.url("/rate-limiting"))).await
    }

    pub async fn set_rate_limiting(&self, enabled: bool) -> Result<RateLimitingStatus, SdkError> {
        let body = serde_json::json!({ "enabled": enabled });
        self.send(self.client.post(self.url("/rate-limiting")).json(&body)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SdkError> {
        let response = request.headers(self.headers.clone()).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SdkError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let retry_header = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let body: Value = response.json().await.unwrap_or(Value::Null);
    let detail = body
        .get("detail")
        .and_then(Value::as_str)
        .or_else(|| status.canonical_reason())
        .unwrap_or("unknown error")
        .to_string();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = retry_header
            .or_else(|| body.get("retry_after").and_then(Value::as_u64))
            .unwrap_or(1);
        return Err(SdkError::RateLimited { retry_after, detail });
    }

    Err(SdkError::Api {
        status: status.as_u16(),
        detail,
    })
}
