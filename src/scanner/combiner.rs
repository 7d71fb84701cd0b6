//! Verdict merging and enforcement action.

use crate::scanner::types::{Action, Verdict};

/// Final verdict and the action the caller owes the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub verdict: Verdict,
    pub action: Action,
}

/// Merge the rule verdict with an optional secondary verdict.
///
/// The more severe of the two wins. With safe mode on, a High Threat is
/// recorded but not forwarded.
pub fn decide(primary: Verdict, secondary: Option<Verdict>, safe_mode: bool) -> Decision {
    let verdict = match secondary {
        Some(other) => primary.max(other),
        None => primary,
    };

    let action = if safe_mode && verdict == Verdict::HighThreat {
        Action::LoggedOnly
    } else {
        Action::Allowed
    };

    Decision { verdict, action }
}
