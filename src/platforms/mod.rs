//! Secondary-market integrations.
//!
//! - Polymarket — flags fixtures that are also listed as prediction markets

pub mod polymarket;
