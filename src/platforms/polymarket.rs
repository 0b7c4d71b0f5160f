//! Polymarket cross-listing.
//!
//! Fetches active markets so fixtures that also trade on Polymarket can
//! be flagged. Only discovery is needed; no auth.
//!
//! Gamma API: https://gamma-api.polymarket.com/markets
//! The older `polymarket.com/api/markets` endpoint wraps the list in
//! `{ "markets": [...] }` and uses different field names; both shapes
//! are accepted.

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::PolymarketConfig;
use crate::text::normalize_text;
use crate::types::MatchReport;

// ---------------------------------------------------------------------------
// Market
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PolymarketMarket {
    pub id: String,
    pub question: String,
    pub slug: String,
    pub active: bool,
    pub closed: bool,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl PolymarketMarket {
    /// Parse one listing entry. Entries with an empty question are rejected.
    pub fn from_value(item: &Value) -> Option<Self> {
        let obj = item.as_object()?;
        let field = |names: &[&str]| -> Option<String> {
            names.iter().find_map(|name| match obj.get(*name) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
        };

        let question = field(&["question", "title"]).unwrap_or_default();
        if question.is_empty() {
            return None;
        }

        Some(Self {
            id: field(&["id", "_id", "market_id"]).unwrap_or_default(),
            question,
            slug: field(&["slug"]).unwrap_or_default(),
            active: obj.get("active").and_then(Value::as_bool).unwrap_or(true),
            closed: obj.get("closed").and_then(Value::as_bool).unwrap_or(false),
            start_time: field(&["startDate", "start_time"]),
            end_time: field(&["endDate", "end_time"]),
        })
    }

    pub fn normalized_question(&self) -> String {
        normalize_text(&self.question)
    }

    pub fn is_open(&self) -> bool {
        self.active && !self.closed
    }
}

/// Parse a listing payload (bare list or `{ "markets": [...] }`).
pub fn parse_markets(data: &Value, include_closed: bool) -> Vec<PolymarketMarket> {
    let items: &[Value] = match data.get("markets").unwrap_or(data) {
        Value::Array(items) => items.as_slice(),
        _ => &[],
    };

    items
        .iter()
        .filter_map(|item| {
            let market = PolymarketMarket::from_value(item);
            if market.is_none() {
                debug!("Skipping malformed Polymarket entry");
            }
            market
        })
        .filter(|m| include_closed || m.is_open())
        .collect()
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct PolymarketClient {
    http: Client,
    endpoint: String,
    limit: u32,
}

impl PolymarketClient {
    pub fn new(cfg: &PolymarketConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("Failed to build Polymarket HTTP client")?;

        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            limit: cfg.limit,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch active (or, with `include_closed`, all) markets.
    pub async fn get_active_markets(&self, include_closed: bool) -> Result<Vec<PolymarketMarket>> {
        debug!(endpoint = %self.endpoint, "Fetching Polymarket markets");

        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("limit", self.limit.to_string()),
                ("closed", include_closed.to_string()),
            ])
            .send()
            .await
            .context("Polymarket request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Polymarket API error {status}: {body}");
        }

        let data: Value = resp
            .json()
            .await
            .context("Failed to parse Polymarket markets response")?;
        let markets = parse_markets(&data, include_closed);

        info!(count = markets.len(), "Fetched Polymarket markets");
        Ok(markets)
    }
}

// ---------------------------------------------------------------------------
// Fixture matching
// ---------------------------------------------------------------------------

/// Map match id → the first market whose normalized question mentions
/// both normalized team names.
pub fn match_reports_to_polymarket<'a>(
    reports: &[MatchReport],
    markets: &'a [PolymarketMarket],
) -> HashMap<String, &'a PolymarketMarket> {
    let questions: Vec<(String, &PolymarketMarket)> = markets
        .iter()
        .map(|m| (m.normalized_question(), m))
        .collect();

    let mut mapping = HashMap::new();
    for report in reports {
        let home = normalize_text(&report.home_team);
        let away = normalize_text(&report.away_team);
        if home.is_empty() || away.is_empty() {
            continue;
        }
        if let Some((_, market)) = questions
            .iter()
            .find(|(q, _)| q.contains(&home) && q.contains(&away))
        {
            mapping.insert(report.match_id.clone(), *market);
        }
    }
    mapping
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
