//! Cached league schedules.
//!
//! Holds one schedule per league for a bounded time window. A refresh
//! of a league runs behind that league's own lock, so concurrent callers
//! for the same league wait for the single in-flight fetch instead of
//! issuing their own, while other leagues proceed independently.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::engine::LeagueAggregator;
use crate::schedule::{LeagueSchedule, MatchSummary};

struct CachedSchedule {
    fetched_at: Instant,
    schedule: Arc<LeagueSchedule>,
}

type LeagueSlot = Arc<Mutex<Option<CachedSchedule>>>;

/// TTL cache of league schedules in front of a `LeagueAggregator`.
pub struct ScheduleService {
    aggregator: LeagueAggregator,
    ttl: Duration,
    slots: Mutex<HashMap<String, LeagueSlot>>,
}

impl ScheduleService {
    pub fn new(aggregator: LeagueAggregator, ttl: Duration) -> Self {
        Self {
            aggregator,
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn aggregator(&self) -> &LeagueAggregator {
        &self.aggregator
    }

    /// The league's schedule, refreshed if missing or older than the TTL.
    pub async fn get_league_schedule(&self, league: &str) -> Result<Arc<LeagueSchedule>> {
        // Reject unknown leagues before allocating a slot for them.
        self.aggregator.sport_key(league)?;

        let slot = self.slot(league).await;
        let mut cached = slot.lock().await;

        if let Some(entry) = cached.as_ref() {
            if entry.fetched_at.elapsed() < self.ttl {
                debug!(league, "Schedule cache hit");
                return Ok(Arc::clone(&entry.schedule));
            }
        }

        let reports = self.aggregator.fetch_league(league).await?;
        let schedule = Arc::new(LeagueSchedule::build(league, reports));
        info!(
            league,
            days = schedule.match_days.len(),
            matches = schedule.match_count(),
            "Refreshed league schedule"
        );

        *cached = Some(CachedSchedule {
            fetched_at: Instant::now(),
            schedule: Arc::clone(&schedule),
        });
        Ok(schedule)
    }

    /// Look up one match in the (possibly refreshed) league schedule.
    pub async fn get_match_summary(&self, league: &str, match_id: &str) -> Result<Option<Arc<MatchSummary>>> {
        let schedule = self.get_league_schedule(league).await?;
        Ok(schedule.get(match_id).cloned())
    }

    /// Drop the cached schedule for `league`; the next read refetches.
    pub async fn invalidate(&self, league: &str) {
        let slot = self.slots.lock().await.get(league).cloned();
        if let Some(slot) = slot {
            *slot.lock().await = None;
        }
    }

    async fn slot(&self, league: &str) -> LeagueSlot {
        let mut slots = self.slots.lock().await;
        Arc::clone(slots.entry(league.to_string()).or_default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
