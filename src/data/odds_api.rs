//! The Odds API client.
//!
//! Fetches upcoming fixtures with bookmaker prices for one sport key.
//!
//! API docs: https://the-odds-api.com/liveapi/guides/v4/
//! Base URL: https://api.the-odds-api.com/v4
//! Auth: `apiKey` query parameter. Quota is charged per region × market.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{OddsProvider, RawEvent};
use crate::config::{AppConfig, OddsApiConfig};
use crate::types::OddsError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const PROVIDER_NAME: &str = "the-odds-api";

/// Statuses worth retrying; everything else fails immediately.
const RETRYABLE_STATUSES: &[StatusCode] = &[
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Authenticated client for The Odds API v4.
pub struct OddsApiClient {
    http: Client,
    api_key: SecretString,
    base_url: String,
    regions: String,
    markets: String,
    odds_format: String,
    date_format: String,
    max_retries: u32,
    backoff: Duration,
}

impl OddsApiClient {
    /// Create a client with an explicit key. An empty key is rejected.
    pub fn new(api_key: SecretString, cfg: &OddsApiConfig) -> Result<Self> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(OddsError::MissingApiKey.into());
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent("ODDSBOARD/0.1.0")
            .build()
            .context("Failed to build HTTP client for The Odds API")?;

        Ok(Self {
            http,
            api_key,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            regions: cfg.regions.clone(),
            markets: cfg.markets.clone(),
            odds_format: cfg.odds_format.clone(),
            date_format: cfg.date_format.clone(),
            max_retries: cfg.max_retries,
            backoff: Duration::from_millis(cfg.backoff_ms),
        })
    }

    /// Create a client, reading the key from the env var named in config.
    pub fn from_config(cfg: &OddsApiConfig) -> Result<Self> {
        let key = AppConfig::resolve_env(&cfg.api_key_env)
            .with_context(|| format!("Export your API key in {} first", cfg.api_key_env))?;
        Self::new(SecretString::new(key), cfg)
    }

    /// Fetch `/sports/{sport_key}/odds/` for the configured regions and markets.
    pub async fn get_odds(&self, sport_key: &str, bookmakers: &[String]) -> Result<Vec<RawEvent>> {
        let mut params: Vec<(&str, String)> = vec![
            ("regions", self.regions.clone()),
            ("markets", self.markets.clone()),
            ("oddsFormat", self.odds_format.clone()),
            ("dateFormat", self.date_format.clone()),
        ];
        if !bookmakers.is_empty() {
            params.push(("bookmakers", bookmakers.join(",")));
        }

        let body = self
            .request(&format!("/sports/{sport_key}/odds/"), &params)
            .await?;
        let events = RawEvent::parse_batch(body);

        info!(sport_key, count = events.len(), "Fetched odds events");
        Ok(events)
    }

    /// GET with retry on transport errors and retryable statuses.
    async fn request(&self, path: &str, params: &[(&str, String)]) -> Result<serde_json::Value> {
        let url = format!("{}{path}", self.base_url);
        let mut attempt: u32 = 0;

        loop {
            debug!(url = %url, attempt, "Requesting The Odds API");

            let result = self
                .http
                .get(&url)
                .query(params)
                .query(&[("apiKey", self.api_key.expose_secret().as_str())])
                .send()
                .await;

            let retry_reason = match result {
                Ok(resp) if resp.status() == StatusCode::OK => {
                    if let Some(remaining) = resp
                        .headers()
                        .get("x-requests-remaining")
                        .and_then(|v| v.to_str().ok())
                    {
                        debug!(remaining, "Odds API quota");
                    }
                    return resp
                        .json()
                        .await
                        .context("Failed to parse The Odds API response");
                }
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    if !RETRYABLE_STATUSES.contains(&status) || attempt >= self.max_retries {
                        return Err(OddsError::Http { status: status.as_u16(), body }.into());
                    }
                    format!("status {status}")
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(e).context("The Odds API request failed");
                    }
                    e.to_string()
                }
            };

            let delay = self.backoff * 2u32.saturating_pow(attempt);
            warn!(attempt, reason = %retry_reason, delay_ms = delay.as_millis() as u64, "Retrying The Odds API request");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[async_trait]
impl OddsProvider for OddsApiClient {
    async fn fetch_events(&self, sport_key: &str, bookmakers: &[String]) -> Result<Vec<RawEvent>> {
        self.get_odds(sport_key, bookmakers).await
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
