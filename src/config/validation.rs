//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (capacities > 0, windows within 1..=1 day, retention > 0)
//! - Check that addresses and origins parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WebShieldConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use axum::http::HeaderValue;

use crate::config::schema::{AuditBackend, WebShieldConfig, MAX_WINDOW_SECS};
use crate::security::rate_limit::RateCategory;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &WebShieldConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new("listener.request_timeout_secs", "must be greater than 0"));
    }
    if config.listener.max_body_bytes == 0 {
        errors.push(ValidationError::new("listener.max_body_bytes", "must be greater than 0"));
    }
    for origin in &config.listener.allowed_origins {
        if HeaderValue::from_str(origin).is_err() {
            errors.push(ValidationError::new(
                "listener.allowed_origins",
                format!("'{}' is not a valid origin", origin),
            ));
        }
    }

    if config.rate_limit.sweep_interval_secs > MAX_WINDOW_SECS {
        errors.push(ValidationError::new(
            "rate_limit.sweep_interval_secs",
            format!("must be at most {}", MAX_WINDOW_SECS),
        ));
    }
    if config.rate_limit.max_tracked_clients == 0 {
        errors.push(ValidationError::new("rate_limit.max_tracked_clients", "must be greater than 0"));
    }
    for category in RateCategory::ALL {
        let policy = config.rate_limit.policy(category);
        if policy.capacity == 0 {
            errors.push(ValidationError::new(
                format!("rate_limit.{}.capacity", category.as_str()),
                "must be greater than 0",
            ));
        }
        if policy.window_secs == 0 {
            errors.push(ValidationError::new(
                format!("rate_limit.{}.window_secs", category.as_str()),
                "must be greater than 0",
            ));
        } else if policy.window_secs > MAX_WINDOW_SECS {
            errors.push(ValidationError::new(
                format!("rate_limit.{}.window_secs", category.as_str()),
                format!("must be at most {}", MAX_WINDOW_SECS),
            ));
        }
    }

    if config.audit.max_entries == 0 {
        errors.push(ValidationError::new("audit.max_entries", "must be greater than 0"));
    }
    if config.audit.default_page_size == 0 {
        errors.push(ValidationError::new("audit.default_page_size", "must be greater than 0"));
    }
    if config.audit.backend == AuditBackend::File && config.audit.path.as_os_str().is_empty() {
        errors.push(ValidationError::new("audit.path", "required for the file backend"));
    }

    if let Some(key) = &config.admin.api_key {
        if key.trim().is_empty() {
            errors.push(ValidationError::new("admin.api_key", "must not be blank when set"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::WindowPolicy;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&WebShieldConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = WebShieldConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.rate_limit.scan = WindowPolicy { capacity: 0, window_secs: 0 };
        config.audit.max_entries = 0;
        config.audit.path = PathBuf::new();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "rate_limit.scan.capacity",
                "rate_limit.scan.window_secs",
                "audit.max_entries",
                "audit.path",
            ]
        );
    }

    #[test]
    fn test_window_upper_bound() {
        let mut config = WebShieldConfig::default();
        config.rate_limit.logs = WindowPolicy { capacity: 5, window_secs: MAX_WINDOW_SECS };
        assert!(validate_config(&config).is_ok());

        config.rate_limit.logs.window_secs = MAX_WINDOW_SECS + 1;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "rate_limit.logs.window_secs");
    }

    #[test]
    fn test_memory_backend_needs_no_path() {
        let mut config = WebShieldConfig::default();
        config.audit.backend = AuditBackend::Memory;
        config.audit.path = PathBuf::new();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = WebShieldConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "observability.metrics_address");
    }

    #[test]
    fn test_blank_admin_key_rejected() {
        let mut config = WebShieldConfig::default();
        config.admin.api_key = Some("  ".into());
        assert_eq!(validate_config(&config).unwrap_err()[0].to_string(), "admin.api_key: must not be blank when set");
    }
}
