//! Consensus engine — raw prices → de-vigged consensus → recommendation.
//!
//! `probability`, `aggregator`, `selector` and `builder` are pure and
//! infallible; `league` wires them to an odds provider.

pub mod probability;
pub mod aggregator;
pub mod selector;
pub mod builder;
pub mod league;

pub use builder::{BuilderConfig, ReportBuilder};
pub use league::LeagueAggregator;
