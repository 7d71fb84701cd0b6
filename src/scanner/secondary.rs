//! Secondary scoring signal.
//!
//! A second opinion merged with the rule verdict by the combiner. The shipped
//! scorer abstains on every payload; a model-backed scorer can be plugged in
//! through [`SecondaryScorer`] without touching the combiner.

use crate::scanner::types::Verdict;

/// A score plus the tier it maps to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondaryScore {
    pub score: f64,
    pub verdict: Verdict,
}

/// Source of a secondary verdict. `None` means abstain.
pub trait SecondaryScorer: Send + Sync {
    fn score(&self, payload: &str) -> Option<SecondaryScore>;
}

/// Always abstains.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbstainingScorer;

impl SecondaryScorer for AbstainingScorer {
    fn score(&self, _payload: &str) -> Option<SecondaryScore> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abstains() {
        assert!(AbstainingScorer.score("<script>").is_none());
        assert!(AbstainingScorer.score("").is_none());
    }
}
