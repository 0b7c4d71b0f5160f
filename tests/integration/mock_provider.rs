//! Fixture-backed odds provider for integration testing.
//!
//! Serves canned event payloads per sport key, counts calls and can be
//! told to fail, all in-memory.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use oddsboard::data::{OddsProvider, RawEvent};

pub const EPL_FIXTURE: &str = include_str!("../fixtures/epl_odds.json");

pub struct FixtureProvider {
    events: HashMap<String, Vec<RawEvent>>,
    calls: AtomicUsize,
    /// Bookmaker filters seen, one entry per call.
    seen_bookmakers: Mutex<Vec<Vec<String>>>,
    /// If set, every fetch returns this error.
    force_error: Mutex<Option<String>>,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self {
            events: HashMap::new(),
            calls: AtomicUsize::new(0),
            seen_bookmakers: Mutex::new(Vec::new()),
            force_error: Mutex::new(None),
        }
    }

    /// Serve `payload` (a JSON array of events) for `sport_key`.
    pub fn with_payload(mut self, sport_key: &str, payload: &str) -> Self {
        let value: serde_json::Value = serde_json::from_str(payload).expect("fixture is valid JSON");
        self.events.insert(sport_key.to_string(), RawEvent::parse_batch(value));
        self
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_bookmakers(&self) -> Vec<Vec<String>> {
        self.seen_bookmakers.lock().unwrap().clone()
    }
}

#[async_trait]
impl OddsProvider for FixtureProvider {
    async fn fetch_events(&self, sport_key: &str, bookmakers: &[String]) -> Result<Vec<RawEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_bookmakers.lock().unwrap().push(bookmakers.to_vec());
        if let Some(msg) = self.force_error.lock().unwrap().clone() {
            return Err(anyhow!(msg));
        }
        Ok(self.events.get(sport_key).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "fixture"
    }
}
