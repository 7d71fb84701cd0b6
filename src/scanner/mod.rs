//! Payload scanning subsystem.
//!
//! # Data Flow
//! ```text
//! payload + Settings snapshot
//!     → patterns.rs (fixed catalog, compiled once)
//!     → classifier.rs (hit list + sensitivity-tiered verdict)
//!     → secondary.rs (optional second opinion; abstains today)
//!     → combiner.rs (max-merge, safe-mode action)
//!     → ScanOutcome (returned to caller, recorded by audit)
//! ```
//!
//! # Design Decisions
//! - Everything here is pure and lock-free; callers pass a settings snapshot
//! - Pattern matching only, no parsing of payload structure
//! - The secondary signal is an `Option` so a real scorer slots in later

pub mod classifier;
pub mod combiner;
pub mod patterns;
pub mod secondary;
pub mod types;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use self::classifier::classify;
use self::combiner::decide;
use self::secondary::{AbstainingScorer, SecondaryScorer};

pub use self::types::{Action, ParseSensitivityError, Sensitivity, Verdict};

/// Everything a scan produces, in response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub classification: Verdict,
    pub rule_hits: Vec<String>,
    pub ml_score: Option<f64>,
    pub sensitivity: Sensitivity,
    pub safe_mode: bool,
    pub action: Action,
}

/// Classifier plus secondary scorer, shared across requests.
#[derive(Clone)]
pub struct Scanner {
    scorer: Arc<dyn SecondaryScorer>,
}

impl Scanner {
    /// A scanner whose secondary signal always abstains.
    pub fn new() -> Self {
        Self::with_scorer(Arc::new(AbstainingScorer))
    }

    pub fn with_scorer(scorer: Arc<dyn SecondaryScorer>) -> Self {
        Self { scorer }
    }

    /// Classify `payload` under the given settings snapshot.
    pub fn scan(&self, payload: &str, settings: Settings) -> ScanOutcome {
        let classification = classify(payload, settings.sensitivity);
        let secondary = self.scorer.score(payload);
        let decision = decide(
            classification.verdict,
            secondary.map(|s| s.verdict),
            settings.safe_mode,
        );

        ScanOutcome {
            classification: decision.verdict,
            rule_hits: classification.hits,
            ml_score: secondary.map(|s| s.score),
            sensitivity: settings.sensitivity,
            safe_mode: settings.safe_mode,
            action: decision.action,
        }
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::secondary::SecondaryScore;

    struct FixedScorer(SecondaryScore);

    impl SecondaryScorer for FixedScorer {
        fn score(&self, _payload: &str) -> Option<SecondaryScore> {
            Some(self.0)
        }
    }

    fn settings(safe_mode: bool, sensitivity: Sensitivity) -> Settings {
        Settings { safe_mode, sensitivity }
    }

    #[test]
    fn test_tautology_in_safe_mode_is_logged_only() {
        let outcome = Scanner::new().scan("' OR 1=1 -- ", settings(true, Sensitivity::Medium));
        assert_eq!(outcome.classification, Verdict::HighThreat);
        assert_eq!(outcome.action, Action::LoggedOnly);
        assert!(outcome.rule_hits.iter().any(|h| h.starts_with("SQLi:")));
        assert_eq!(outcome.ml_score, None);
        assert_eq!(outcome.sensitivity, Sensitivity::Medium);
        assert!(outcome.safe_mode);
    }

    #[test]
    fn test_high_threat_allowed_without_safe_mode() {
        let outcome = Scanner::new().scan("1; DROP TABLE users", settings(false, Sensitivity::Low));
        assert_eq!(outcome.classification, Verdict::HighThreat);
        assert_eq!(outcome.action, Action::Allowed);
    }

    #[test]
    fn test_clean_payload_allowed_everywhere() {
        for level in Sensitivity::ALL {
            for safe_mode in [true, false] {
                let outcome = Scanner::new().scan("hello world", settings(safe_mode, level));
                assert_eq!(outcome.classification, Verdict::Clean);
                assert_eq!(outcome.action, Action::Allowed);
            }
        }
    }

    #[test]
    fn test_secondary_score_is_merged() {
        let scanner = Scanner::with_scorer(Arc::new(FixedScorer(SecondaryScore {
            score: 0.97,
            verdict: Verdict::HighThreat,
        })));
        let outcome = scanner.scan("hello world", settings(true, Sensitivity::Medium));
        assert_eq!(outcome.classification, Verdict::HighThreat);
        assert_eq!(outcome.action, Action::LoggedOnly);
        assert_eq!(outcome.ml_score, Some(0.97));
        assert!(outcome.rule_hits.is_empty());
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = Scanner::new().scan("hello world", Settings::default());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "classification": "Clean",
                "rule_hits": [],
                "ml_score": null,
                "sensitivity": "Medium",
                "safe_mode": true,
                "action": "allowed",
            })
        );
    }
}
