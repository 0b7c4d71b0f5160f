//! Recommendation selection.
//!
//! Picks the outcome with the highest consensus probability. Confidence
//! is the raw probability gap to the runner-up; a gap near zero means
//! "no clear edge" and is for the presentation layer to flag.

use std::cmp::Ordering;

use crate::types::{OutcomeTriple, Recommendation};

/// Select the leading outcome from the consensus averages.
///
/// - no present average: `None`
/// - exactly one: that outcome, confidence absent
/// - two or more: the highest, confidence = top − second
///
/// Exact ties resolve by fixed priority home > draw > away.
pub fn recommend(consensus: &OutcomeTriple) -> Option<Recommendation> {
    let mut ranked: Vec<_> = consensus.present().collect();
    // Stable sort over priority order keeps home > draw > away on ties.
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    match ranked.as_slice() {
        [] => None,
        [(outcome, _)] => Some(Recommendation { outcome: *outcome, confidence: None }),
        [(outcome, best), (_, second), ..] => Some(Recommendation {
            outcome: *outcome,
            confidence: Some(best - second),
        }),
    }
}
