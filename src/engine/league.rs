//! League-level fetch and build.
//!
//! Resolves a league key to its upstream sport key, asks the odds
//! provider for raw events with the configured bookmakers, and hands
//! them to the report builder.

use anyhow::Result;
use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use super::builder::ReportBuilder;
use crate::config::AppConfig;
use crate::data::OddsProvider;
use crate::types::{MatchReport, OddsError};

/// Fetches and builds reports for configured leagues.
pub struct LeagueAggregator {
    provider: Arc<dyn OddsProvider>,
    /// League key → sport key.
    leagues: BTreeMap<String, String>,
    bookmakers: Vec<String>,
    builder: ReportBuilder,
}

impl LeagueAggregator {
    pub fn new(
        provider: Arc<dyn OddsProvider>,
        leagues: BTreeMap<String, String>,
        bookmakers: Vec<String>,
        builder: ReportBuilder,
    ) -> Self {
        Self { provider, leagues, bookmakers, builder }
    }

    /// Build from application config: league map, bookmaker list and
    /// market key all come from there.
    pub fn from_config(provider: Arc<dyn OddsProvider>, cfg: &AppConfig) -> Self {
        let builder = ReportBuilder::new(super::builder::BuilderConfig {
            market_key: cfg.aggregation.market_key.clone(),
        });
        Self::new(
            provider,
            cfg.leagues.0.clone(),
            cfg.aggregation.bookmakers.clone(),
            builder,
        )
    }

    /// Supported league keys, sorted.
    pub fn leagues(&self) -> impl Iterator<Item = &str> {
        self.leagues.keys().map(String::as_str)
    }

    pub fn bookmakers(&self) -> &[String] {
        &self.bookmakers
    }

    /// Sport key for `league`, or `UnsupportedLeague`.
    pub fn sport_key(&self, league: &str) -> Result<&str, OddsError> {
        self.leagues
            .get(league)
            .map(String::as_str)
            .ok_or_else(|| OddsError::UnsupportedLeague {
                league: league.to_string(),
                supported: self.leagues().collect::<Vec<_>>().join(", "),
            })
    }

    /// Fetch one league and build its reports.
    pub async fn fetch_league(&self, league: &str) -> Result<Vec<MatchReport>> {
        let sport_key = self.sport_key(league)?;
        let events = self.provider.fetch_events(sport_key, &self.bookmakers).await?;
        info!(
            league,
            sport_key,
            provider = self.provider.name(),
            events = events.len(),
            "Fetched league events"
        );
        Ok(self.builder.build_reports(league, sport_key, &events))
    }

    /// Fetch several leagues concurrently; reports keep the league order
    /// given. Any league failing fails the whole call.
    pub async fn fetch_many(&self, leagues: &[String]) -> Result<Vec<MatchReport>> {
        let per_league = try_join_all(leagues.iter().map(|l| self.fetch_league(l))).await?;
        Ok(per_league.into_iter().flatten().collect())
    }
}
