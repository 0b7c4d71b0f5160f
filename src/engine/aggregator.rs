//! Cross-source consensus.
//!
//! Each outcome is averaged independently over the sources that quoted
//! it. A source silent on an outcome does not pull that outcome's
//! average towards zero. Because the contributing set can differ per
//! outcome, the three averages are not renormalized and need not sum to 1.

use crate::types::{Outcome, OutcomeTriple, SourceQuote};

/// Per-outcome arithmetic mean over the sources that report it.
pub fn consensus(sources: &[SourceQuote]) -> OutcomeTriple {
    let mut averages = OutcomeTriple::empty();
    for outcome in Outcome::ALL {
        averages.set(outcome, mean(sources.iter().filter_map(|s| s.probabilities.get(outcome))));
    }
    averages
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
