//! Shared types for ODDSBOARD.
//!
//! These types form the data model used across all modules: the
//! per-source probability triple, the bookmaker quote built from it,
//! and the per-fixture consensus report.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// One leg of a three-way (home/draw/away) market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    /// All outcomes in fixed priority order (home > draw > away).
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Home => "home",
            Outcome::Draw => "draw",
            Outcome::Away => "away",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Outcome triple
// ---------------------------------------------------------------------------

/// Three optional probabilities for one event, one per outcome.
///
/// An absent slot means "no usable data", never zero. Before
/// normalization the present values usually sum to more than 1
/// (the bookmaker's overround).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OutcomeTriple {
    pub home: Option<f64>,
    pub draw: Option<f64>,
    pub away: Option<f64>,
}

impl OutcomeTriple {
    pub fn new(home: Option<f64>, draw: Option<f64>, away: Option<f64>) -> Self {
        Self { home, draw, away }
    }

    /// A triple with every slot absent.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, outcome: Outcome) -> Option<f64> {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    pub fn set(&mut self, outcome: Outcome, value: Option<f64>) {
        match outcome {
            Outcome::Home => self.home = value,
            Outcome::Draw => self.draw = value,
            Outcome::Away => self.away = value,
        }
    }

    /// Iterate over `(outcome, value)` in priority order, absent slots included.
    pub fn iter(&self) -> impl Iterator<Item = (Outcome, Option<f64>)> + '_ {
        Outcome::ALL.iter().map(move |&o| (o, self.get(o)))
    }

    /// Iterate over the present slots only.
    pub fn present(&self) -> impl Iterator<Item = (Outcome, f64)> + '_ {
        self.iter().filter_map(|(o, v)| v.map(|v| (o, v)))
    }

    /// Number of present slots.
    pub fn present_count(&self) -> usize {
        self.present().count()
    }

    pub fn is_empty(&self) -> bool {
        self.present_count() == 0
    }

    /// Sum of the present values, or `None` if nothing is present.
    pub fn present_sum(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.present().map(|(_, v)| v).sum())
        }
    }

    /// Apply `f` to every present value; absent slots stay absent.
    pub fn map_present(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            home: self.home.map(&f),
            draw: self.draw.map(&f),
            away: self.away.map(&f),
        }
    }
}

impl fmt::Display for OutcomeTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(o, v)| format!("{o}={}", format_percent(v)))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// Render a probability as `xx.xx%`, or `N/A` when absent.
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "N/A".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Source quote
// ---------------------------------------------------------------------------

/// One bookmaker's normalized view of one fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceQuote {
    /// Bookmaker key, e.g. "bet365".
    pub source: String,
    pub probabilities: OutcomeTriple,
    /// Last-update timestamp of the bookmaker's head-to-head market.
    pub last_update: Option<DateTime<FixedOffset>>,
}

impl SourceQuote {
    pub fn home(&self) -> Option<f64> {
        self.probabilities.home
    }

    pub fn draw(&self) -> Option<f64> {
        self.probabilities.draw
    }

    pub fn away(&self) -> Option<f64> {
        self.probabilities.away
    }
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

/// The leading consensus outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub outcome: Outcome,
    /// Gap between the top and second-highest consensus probability.
    /// Absent when only one outcome had a consensus value.
    pub confidence: Option<f64>,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Δ {})",
            self.outcome.as_str().to_uppercase(),
            format_percent(self.confidence)
        )
    }
}

// ---------------------------------------------------------------------------
// Match report
// ---------------------------------------------------------------------------

/// Consensus artifact for one fixture, built once per fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    /// League key, e.g. "epl".
    pub league: String,
    /// Upstream sport/competition key, e.g. "soccer_epl".
    pub sport_key: String,
    pub match_id: String,
    /// Kickoff in the timezone the upstream reported it in.
    pub commence_time: DateTime<FixedOffset>,
    pub home_team: String,
    pub away_team: String,
    /// Contributing quotes, in bookmaker order as encountered.
    pub sources: Vec<SourceQuote>,
    /// Per-outcome averages over the sources that quoted that outcome.
    pub consensus: OutcomeTriple,
    pub recommendation: Option<Recommendation>,
}

impl MatchReport {
    pub fn average_home(&self) -> Option<f64> {
        self.consensus.home
    }

    pub fn average_draw(&self) -> Option<f64> {
        self.consensus.draw
    }

    pub fn average_away(&self) -> Option<f64> {
        self.consensus.away
    }

    pub fn recommended_outcome(&self) -> Option<Outcome> {
        self.recommendation.map(|r| r.outcome)
    }

    pub fn recommendation_confidence(&self) -> Option<f64> {
        self.recommendation.and_then(|r| r.confidence)
    }

    /// Whether no bookmaker contributed a quote.
    pub fn has_no_data(&self) -> bool {
        self.sources.is_empty()
    }
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} vs {} @ {} | {} | sources={}",
            self.league,
            self.home_team,
            self.away_team,
            self.commence_time.to_rfc3339(),
            self.consensus,
            self.sources.len(),
        )?;
        if let Some(rec) = &self.recommendation {
            write!(f, " | {rec}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures raised by the collaborators around the consensus engine.
///
/// The engine itself never fails: missing data is threaded through as
/// `None` and malformed events are dropped.
#[derive(Debug, thiserror::Error)]
pub enum OddsError {
    #[error("Unsupported league '{league}'. Supported: {supported}")]
    UnsupportedLeague { league: String, supported: String },

    #[error("The Odds API request failed ({status}): {body}")]
    Http { status: u16, body: String },

    #[error("API key is required")]
    MissingApiKey,

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
