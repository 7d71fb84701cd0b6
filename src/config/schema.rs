//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scanner::Sensitivity;
use crate::security::rate_limit::RateCategory;
use crate::settings::Settings;

/// Root configuration for the scanner service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WebShieldConfig {
    /// Listener configuration (bind address, request limits, CORS).
    pub listener: ListenerConfig,

    /// Initial scan policy.
    pub scanner: ScannerConfig,

    /// Rate limiting policies.
    pub rate_limit: RateLimitConfig,

    /// Scan record storage.
    pub audit: AuditConfig,

    /// Administrative endpoints.
    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Origins allowed to call the API from a browser dashboard.
    pub allowed_origins: Vec<String>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            request_timeout_secs: 30,
            max_body_bytes: 1024 * 1024, // 1MB
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

/// Scan policy in effect at startup. Changed at runtime through `POST /config`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Suppress forwarding of High Threat payloads.
    pub safe_mode: bool,

    /// Escalation level (Low, Medium, Paranoid; case-insensitive).
    pub sensitivity: Sensitivity,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        let settings = Settings::default();
        Self {
            safe_mode: settings.safe_mode,
            sensitivity: settings.sensitivity,
        }
    }
}

impl ScannerConfig {
    pub fn initial_settings(&self) -> Settings {
        Settings {
            safe_mode: self.safe_mode,
            sensitivity: self.sensitivity,
        }
    }
}

/// Longest accepted rate-limit window (one day).
pub const MAX_WINDOW_SECS: u64 = 86_400;

/// Fixed-window policy for one operation category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct WindowPolicy {
    /// Requests admitted per window.
    pub capacity: u32,

    /// Window length in seconds.
    pub window_secs: u64,
}

impl WindowPolicy {
    pub const fn per_minute(capacity: u32) -> Self {
        Self {
            capacity,
            window_secs: 60,
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Human-readable form, e.g. "20 per minute".
    pub fn describe(&self) -> String {
        let unit = match self.window_secs {
            1 => "second".to_string(),
            60 => "minute".to_string(),
            3600 => "hour".to_string(),
            secs => format!("{}s", secs),
        };
        format!("{} per {}", self.capacity, unit)
    }
}

/// Rate limiting configuration.
///
/// Policies are read once at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Initial state of the global toggle.
    pub enabled: bool,

    /// Upper bound on tracked (client, category) windows before the
    /// least recently seen is evicted.
    pub max_tracked_clients: usize,

    /// Interval between sweeps of expired windows, in seconds. 0 disables.
    pub sweep_interval_secs: u64,

    pub health: WindowPolicy,
    pub config_read: WindowPolicy,
    pub config_write: WindowPolicy,
    pub logs: WindowPolicy,
    pub scan: WindowPolicy,
    pub admin: WindowPolicy,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_tracked_clients: 10_000,
            sweep_interval_secs: 300,
            health: WindowPolicy::per_minute(100),
            config_read: WindowPolicy::per_minute(30),
            config_write: WindowPolicy::per_minute(10),
            logs: WindowPolicy::per_minute(50),
            scan: WindowPolicy::per_minute(20),
            admin: WindowPolicy::per_minute(30),
        }
    }
}

impl RateLimitConfig {
    pub fn policy(&self, category: RateCategory) -> WindowPolicy {
        match category {
            RateCategory::Health => self.health,
            RateCategory::ConfigRead => self.config_read,
            RateCategory::ConfigWrite => self.config_write,
            RateCategory::Logs => self.logs,
            RateCategory::Scan => self.scan,
            RateCategory::Admin => self.admin,
        }
    }
}

/// Where scan records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditBackend {
    /// JSON array on disk.
    File,
    /// Process memory only.
    Memory,
}

/// Scan record storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuditConfig {
    pub backend: AuditBackend,

    /// File path for the `file` backend.
    pub path: PathBuf,

    /// Most recent records retained.
    pub max_entries: usize,

    /// Default `limit` for `GET /logs`.
    pub default_page_size: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            backend: AuditBackend::File,
            path: PathBuf::from("data/logs.json"),
            max_entries: 1000,
            default_page_size: 200,
        }
    }
}

/// Admin endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AdminConfig {
    /// Bearer token required by admin routes. Unset leaves them open.
    pub api_key: Option<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policies() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.policy(RateCategory::Health).capacity, 100);
        assert_eq!(config.policy(RateCategory::ConfigRead).capacity, 30);
        assert_eq!(config.policy(RateCategory::ConfigWrite).capacity, 10);
        assert_eq!(config.policy(RateCategory::Logs).capacity, 50);
        assert_eq!(config.policy(RateCategory::Scan).capacity, 20);
        assert_eq!(config.policy(RateCategory::Scan).window(), Duration::from_secs(60));
    }

    #[test]
    fn test_policy_description() {
        assert_eq!(WindowPolicy::per_minute(30).describe(), "30 per minute");
        assert_eq!(WindowPolicy { capacity: 5, window_secs: 1 }.describe(), "5 per second");
        assert_eq!(WindowPolicy { capacity: 5, window_secs: 90 }.describe(), "5 per 90s");
    }

    #[test]
    fn test_scanner_defaults_match_settings() {
        let config = WebShieldConfig::default();
        assert_eq!(config.scanner.initial_settings(), Settings::default());
        assert_eq!(config.audit.backend, AuditBackend::File);
        assert!(config.admin.api_key.is_none());
    }
}
