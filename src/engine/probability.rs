//! Price → probability conversion and overround removal.

use crate::types::OutcomeTriple;

/// Implied probability of a decimal price: `1 / price`.
///
/// Absent, non-positive and non-finite prices yield `None`; bad input is
/// missing data, not an error. A price so small that its reciprocal
/// overflows is treated the same way.
pub fn implied_probability(price: Option<f64>) -> Option<f64> {
    price
        .filter(|p| p.is_finite() && *p > 0.0)
        .map(|p| 1.0 / p)
        .filter(|q| q.is_finite())
}

/// Rescale one source's triple so its present values sum to 1.
///
/// Works within a single bookmaker's quote only. Absent slots stay
/// absent; an empty triple or a non-positive sum is returned unchanged.
pub fn normalize(triple: OutcomeTriple) -> OutcomeTriple {
    match triple.present_sum() {
        Some(total) if total > 0.0 => triple.map_present(|v| v / total),
        _ => triple,
    }
}
