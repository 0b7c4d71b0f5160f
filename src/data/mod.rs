//! Raw odds payloads and the providers that fetch them.
//!
//! Defines the `OddsProvider` trait and the explicit schema for the
//! nested event → bookmaker → market → outcome structure returned by
//! upstream odds feeds. Deserialization is lenient at every level: a
//! field of the wrong type becomes `None`, and a list entry that cannot
//! be parsed is dropped, so one malformed node never sinks its siblings.

pub mod odds_api;

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

/// Abstraction over upstream odds feeds.
///
/// Implementors return the raw events for one sport/competition key;
/// turning them into reports is the engine's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OddsProvider: Send + Sync {
    /// Fetch upcoming events with head-to-head prices for `sport_key`,
    /// restricted to `bookmakers` when the list is non-empty.
    async fn fetch_events(&self, sport_key: &str, bookmakers: &[String]) -> Result<Vec<RawEvent>>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Payload schema
// ---------------------------------------------------------------------------

/// One fixture as reported upstream.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawEvent {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub home_team: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub away_team: Option<String>,
    /// ISO-8601 kickoff time.
    #[serde(default, deserialize_with = "lenient")]
    pub commence_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub bookmakers: Vec<RawBookmaker>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawBookmaker {
    #[serde(default, deserialize_with = "lenient")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub markets: Vec<RawMarket>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawMarket {
    /// Market type, e.g. "h2h", "spreads", "totals".
    #[serde(default, deserialize_with = "lenient")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_update: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub outcomes: Vec<RawOutcome>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawOutcome {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// Decimal payout multiplier.
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<f64>,
}

impl RawEvent {
    /// Parse a top-level JSON array of events, dropping entries that are
    /// not objects. Anything other than an array yields no events.
    pub fn parse_batch(value: Value) -> Vec<RawEvent> {
        let Value::Array(items) = value else {
            debug!("Odds payload is not a list; treating as empty");
            return Vec::new();
        };
        let total = items.len();
        let events: Vec<RawEvent> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();
        if events.len() < total {
            debug!(total, kept = events.len(), "Dropped non-conforming event nodes");
        }
        events
    }
}

// ---------------------------------------------------------------------------
// Lenient field helpers
// ---------------------------------------------------------------------------

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Identifiers may arrive as strings or numbers.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect(),
        _ => Vec::new(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
