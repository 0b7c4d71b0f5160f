//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section has documented defaults, so a partial file (or no file
//! at all) still yields a working configuration. Secrets (API keys) are
//! referenced by env-var name in the config and resolved at runtime via
//! `std::env::var`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::types::OddsError;

/// Bookmakers requested from the odds feed unless overridden.
pub const DEFAULT_BOOKMAKERS: &[&str] = &[
    "bet365",
    "paddypower",
    "williamhill",
    "ladbrokes",
    "betfair",
    "skybet",
    "marathonbet",
    "unibet",
    "betvictor",
    "pinnacle",
];

/// League key → upstream sport key.
pub const DEFAULT_LEAGUES: &[(&str, &str)] = &[
    ("epl", "soccer_epl"),
    ("la_liga", "soccer_spain_la_liga"),
    ("bundesliga", "soccer_germany_bundesliga"),
];

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub odds_api: OddsApiConfig,
    pub aggregation: AggregationConfig,
    /// League key → sport key.
    pub leagues: LeaguesConfig,
    pub cache: CacheConfig,
    pub polymarket: PolymarketConfig,
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OddsApiConfig {
    pub api_key_env: String,
    pub base_url: String,
    pub regions: String,
    pub markets: String,
    pub odds_format: String,
    pub date_format: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Initial retry delay; doubles per attempt.
    pub backoff_ms: u64,
}

impl Default for OddsApiConfig {
    fn default() -> Self {
        Self {
            api_key_env: "THE_ODDS_API_KEY".to_string(),
            base_url: "https://api.the-odds-api.com/v4".to_string(),
            regions: "uk,eu".to_string(),
            markets: "h2h".to_string(),
            odds_format: "decimal".to_string(),
            date_format: "iso".to_string(),
            timeout_secs: 10,
            max_retries: 3,
            backoff_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AggregationConfig {
    pub bookmakers: Vec<String>,
    /// Market type the report builder reads prices from.
    pub market_key: String,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            bookmakers: DEFAULT_BOOKMAKERS.iter().map(|s| s.to_string()).collect(),
            market_key: "h2h".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(transparent)]
pub struct LeaguesConfig(pub BTreeMap<String, String>);

impl Default for LeaguesConfig {
    fn default() -> Self {
        Self(
            DEFAULT_LEAGUES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 6 * 3600 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PolymarketConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub limit: u32,
    pub timeout_secs: u64,
}

impl Default for PolymarketConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://gamma-api.polymarket.com/markets".to_string(),
            limit: 1000,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self { enabled: false, port: 8080 }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no request could be built from. Run again after
    /// command-line overrides are applied.
    pub fn validate(&self) -> Result<(), OddsError> {
        if self.leagues.0.is_empty() {
            return Err(OddsError::Config("at least one league must be configured".into()));
        }
        if let Some((league, _)) = self.leagues.0.iter().find(|(_, sport)| sport.trim().is_empty()) {
            return Err(OddsError::Config(format!("league '{league}' has an empty sport key")));
        }
        if self.odds_api.regions.trim().is_empty() {
            return Err(OddsError::Config("odds_api.regions must not be empty".into()));
        }
        if self.aggregation.market_key.trim().is_empty() {
            return Err(OddsError::Config("aggregation.market_key must not be empty".into()));
        }
        if self.aggregation.bookmakers.iter().any(|b| b.trim().is_empty()) {
            return Err(OddsError::Config("bookmaker keys must not be blank".into()));
        }
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    /// Useful for loading secrets referenced in the config.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
