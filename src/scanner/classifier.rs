//! Rule-based payload classification.
//!
//! # Responsibilities
//! - Run every catalog pattern against the payload, recording each match
//! - Fold sensitivity and hit count into a verdict
//!
//! # Decision table
//! ```text
//! hits == 0                          → Clean (any sensitivity)
//! Low:      SQLi hit or <script hit  → High Threat, else Suspicious
//! Medium:   SQLi hit                 → High Threat, else Suspicious
//! Paranoid: SQLi hit                 → High Threat, else Suspicious
//! ```
//! Only the injection/other split matters; categories are not weighted.

use crate::scanner::patterns::{catalog, Category, CompiledPattern, SCRIPT_OPEN};
use crate::scanner::types::{Sensitivity, Verdict};

/// Result of running the catalog over one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// `"<category>:<signature>"` per matching pattern, in catalog order.
    pub hits: Vec<String>,
    pub verdict: Verdict,
}

/// Classify a payload. Pure: depends only on the payload, the sensitivity and
/// the built-in catalog. Any text is accepted, including the empty string.
pub fn classify(payload: &str, sensitivity: Sensitivity) -> Classification {
    let matched: Vec<&CompiledPattern> = catalog().iter().filter(|p| p.matches(payload)).collect();

    Classification {
        hits: matched.iter().map(|p| p.hit_label()).collect(),
        verdict: tiered_verdict(&matched, sensitivity),
    }
}

fn tiered_verdict(matched: &[&CompiledPattern], sensitivity: Sensitivity) -> Verdict {
    if matched.is_empty() {
        return Verdict::Clean;
    }

    let injection = matched.iter().any(|p| p.category() == Category::Injection);

    let escalates = match sensitivity {
        Sensitivity::Low => injection || matched.iter().any(|p| p.name() == SCRIPT_OPEN),
        // Medium treats one hit and several hits alike.
        Sensitivity::Medium | Sensitivity::Paranoid => injection,
    };

    if escalates {
        Verdict::HighThreat
    } else {
        Verdict::Suspicious
    }
}
