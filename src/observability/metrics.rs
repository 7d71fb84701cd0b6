//! Metrics collection and exposition.
//!
//! # Metrics
//! - `webshield_scans_total` (counter): scans by classification, action
//! - `webshield_rate_limited_total` (counter): rejected requests by category
//! - `webshield_audit_failures_total` (counter): scan records that failed to store
//! - `webshield_config_updates_total` (counter): accepted settings updates
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; with no exporter
//!   installed every call is a no-op
//! - Prometheus exporter serves its own HTTP listener

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::scanner::{Action, Verdict};
use crate::security::RateCategory;

pub const SCANS_TOTAL: &str = "webshield_scans_total";
pub const RATE_LIMITED_TOTAL: &str = "webshield_rate_limited_total";
pub const AUDIT_FAILURES_TOTAL: &str = "webshield_audit_failures_total";
pub const CONFIG_UPDATES_TOTAL: &str = "webshield_config_updates_total";

/// Install the Prometheus recorder and start its scrape listener.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    metrics::describe_counter!(SCANS_TOTAL, "Payload scans by classification and action");
    metrics::describe_counter!(RATE_LIMITED_TOTAL, "Requests rejected by the rate limiter");
    metrics::describe_counter!(AUDIT_FAILURES_TOTAL, "Scan records that could not be stored");
    metrics::describe_counter!(CONFIG_UPDATES_TOTAL, "Accepted scan settings updates");

    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_scan(classification: Verdict, action: Action) {
    metrics::counter!(
        SCANS_TOTAL,
        "classification" => classification.as_str(),
        "action" => action.as_str()
    )
    .increment(1);
}

pub fn record_rate_limited(category: RateCategory) {
    metrics::counter!(RATE_LIMITED_TOTAL, "category" => category.as_str()).increment(1);
}

pub fn record_audit_failure() {
    metrics::counter!(AUDIT_FAILURES_TOTAL).increment(1);
}

pub fn record_config_update() {
    metrics::counter!(CONFIG_UPDATES_TOTAL).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_render_with_labels() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_scan(Verdict::HighThreat, Action::LoggedOnly);
            record_scan(Verdict::HighThreat, Action::LoggedOnly);
            record_rate_limited(RateCategory::Scan);
            record_audit_failure();
        });

        let rendered = handle.render();
        let scans = rendered
            .lines()
            .find(|line| line.starts_with("webshield_scans_total{"))
            .unwrap();
        assert!(scans.contains(r#"classification="High Threat""#));
        assert!(scans.contains(r#"action="logged-only""#));
        assert!(scans.ends_with(" 2"));
        assert!(rendered.contains(r#"webshield_rate_limited_total{category="scan"} 1"#));
        assert!(rendered.contains("webshield_audit_failures_total 1"));
    }
}
