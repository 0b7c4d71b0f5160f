//! Report builder.
//!
//! Turns raw upstream events into `MatchReport`s: validates the event
//! identity, extracts one normalized quote per bookmaker from its
//! head-to-head market, then aggregates and selects a recommendation.
//! Events are independent; a malformed event is dropped without
//! affecting its siblings.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use super::aggregator::consensus;
use super::probability::{implied_probability, normalize};
use super::selector::recommend;
use crate::data::{RawBookmaker, RawEvent, RawMarket};
use crate::types::{MatchReport, Outcome, OutcomeTriple, SourceQuote};

/// Outcome names (compared case-insensitively) that mean a draw.
const DRAW_LABELS: &[&str] = &["draw", "tie"];

/// Bookmaker key used when an entry carries none.
const UNKNOWN_SOURCE: &str = "unknown";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Market type prices are read from; every other market is ignored.
    pub market_key: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self { market_key: "h2h".to_string() }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builds consensus reports from raw event payloads.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    config: BuilderConfig,
}

impl ReportBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Build one report per usable event, preserving input order.
    pub fn build_reports(&self, league: &str, sport_key: &str, events: &[RawEvent]) -> Vec<MatchReport> {
        let reports: Vec<MatchReport> = events
            .iter()
            .filter_map(|event| self.build_report(league, sport_key, event))
            .collect();

        info!(
            league,
            sport_key,
            events = events.len(),
            reports = reports.len(),
            "Built match reports"
        );
        reports
    }

    /// Build the report for a single event, or `None` if the event lacks
    /// an id, either team name, or a parseable kickoff time.
    pub fn build_report(&self, league: &str, sport_key: &str, event: &RawEvent) -> Option<MatchReport> {
        let (Some(match_id), Some(home_team), Some(away_team), Some(raw_start)) = (
            non_empty(&event.id),
            non_empty(&event.home_team),
            non_empty(&event.away_team),
            non_empty(&event.commence_time),
        ) else {
            debug!(id = ?event.id, "Dropping event with missing identity fields");
            return None;
        };

        let Some(commence_time) = parse_timestamp(raw_start) else {
            debug!(match_id, raw_start, "Dropping event with unparseable commence_time");
            return None;
        };

        let sources: Vec<SourceQuote> = event
            .bookmakers
            .iter()
            .filter_map(|bm| self.source_quote(bm, home_team, away_team))
            .collect();

        let consensus = consensus(&sources);
        let recommendation = recommend(&consensus);

        Some(MatchReport {
            league: league.to_string(),
            sport_key: sport_key.to_string(),
            match_id: match_id.to_string(),
            commence_time,
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            sources,
            consensus,
            recommendation,
        })
    }

    /// One normalized quote from a bookmaker's head-to-head market, or
    /// `None` when the bookmaker has no such market.
    pub fn source_quote(&self, bookmaker: &RawBookmaker, home_team: &str, away_team: &str) -> Option<SourceQuote> {
        let source = bookmaker.key.as_deref().unwrap_or(UNKNOWN_SOURCE);
        let Some(market) = self.find_market(bookmaker) else {
            debug!(source, market_key = %self.config.market_key, "Bookmaker has no matching market");
            return None;
        };

        let mut implied = OutcomeTriple::empty();
        for outcome in &market.outcomes {
            let Some(name) = outcome.name.as_deref() else {
                continue;
            };
            if let Some(slot) = classify_outcome(name, home_team, away_team) {
                implied.set(slot, implied_probability(outcome.price));
            }
        }

        Some(SourceQuote {
            source: source.to_string(),
            probabilities: normalize(implied),
            last_update: market.last_update.as_deref().and_then(parse_timestamp),
        })
    }

    fn find_market<'a>(&self, bookmaker: &'a RawBookmaker) -> Option<&'a RawMarket> {
        bookmaker
            .markets
            .iter()
            .find(|m| m.key.as_deref() == Some(self.config.market_key.as_str()))
    }
}

/// Map an outcome name to its slot: exact team-name match, or a
/// case-insensitive draw label. Anything else is ignored.
fn classify_outcome(name: &str, home_team: &str, away_team: &str) -> Option<Outcome> {
    if name == home_team {
        Some(Outcome::Home)
    } else if name == away_team {
        Some(Outcome::Away)
    } else if DRAW_LABELS.iter().any(|label| name.eq_ignore_ascii_case(label)) {
        Some(Outcome::Draw)
    } else {
        None
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Offset-bearing layouts tried after RFC 3339. A trailing `Z` has been
/// rewritten to `+00:00` by then.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y%m%dT%H%M%S%z",
    "%Y%m%dT%H%M%S%:z",
    "%Y%m%dT%H%M%z",
    "%Y%m%dT%H%M%:z",
];

/// Layouts without an offset; these are taken as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y%m%dT%H%M%S",
    "%Y%m%dT%H%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// Parse an ISO-8601 timestamp, keeping its offset. Timestamps without
/// an offset are taken as UTC; a bare date is midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }

    let zulu = match raw.strip_suffix(['Z', 'z']) {
        Some(stem) => format!("{stem}+00:00"),
        None => raw.to_string(),
    };
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(&zulu, fmt).ok())
    {
        return Some(dt);
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
