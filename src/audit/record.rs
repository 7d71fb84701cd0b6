//! Scan record types.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::scanner::{Action, ScanOutcome, Sensitivity, Verdict};

/// One completed scan, as handed to the audit sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub payload: String,
    pub classification: Verdict,
    pub rule_hits: Vec<String>,
    pub ml_score: Option<f64>,
    pub sensitivity: Sensitivity,
    pub safe_mode: bool,
    pub action: Action,
}

impl ScanRecord {
    /// Stamp an outcome with the current time.
    pub fn new(payload: impl Into<String>, outcome: &ScanOutcome) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            payload: payload.into(),
            classification: outcome.classification,
            rule_hits: outcome.rule_hits.clone(),
            ml_score: outcome.ml_score,
            sensitivity: outcome.sensitivity,
            safe_mode: outcome.safe_mode,
            action: outcome.action,
        }
    }
}

/// A stored record with its sink-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    #[serde(flatten)]
    pub record: ScanRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Scanner;
    use crate::settings::Settings;

    #[test]
    fn test_record_copies_outcome() {
        let outcome = Scanner::new().scan("<script>alert(1)</script>", Settings::default());
        let record = ScanRecord::new("<script>alert(1)</script>", &outcome);

        assert_eq!(record.classification, outcome.classification);
        assert_eq!(record.rule_hits, outcome.rule_hits);
        assert!(record.timestamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&record.timestamp).is_ok());
    }

    #[test]
    fn test_entry_is_flat_json() {
        let outcome = Scanner::new().scan("hello", Settings::default());
        let entry = LogEntry {
            id: 7,
            record: ScanRecord::new("hello", &outcome),
        };
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["id"], 7);
        assert_eq!(value["payload"], "hello");
        assert_eq!(value["classification"], "Clean");
        assert_eq!(value["sensitivity"], "Medium");
        assert_eq!(value["action"], "allowed");
        assert!(value["ml_score"].is_null());

        let back: LogEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }
}
