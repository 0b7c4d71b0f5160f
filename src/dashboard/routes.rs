//! Dashboard API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<ScheduleService>`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::schedule::{LeagueSchedule, MatchSummary};
use crate::service::ScheduleService;
use crate::types::{MatchReport, OddsError};

/// Shared state accessible by all route handlers.
pub type AppState = Arc<ScheduleService>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LeaguesResponse {
    pub leagues: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchListing {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    pub home_code: String,
    pub away_code: String,
    pub kickoff: String,
    pub recommendation: Option<String>,
    pub confidence: Option<f64>,
    pub sources: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayListing {
    pub date: NaiveDate,
    pub matches: Vec<MatchListing>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResponse {
    pub league: String,
    pub days: Vec<DayListing>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchResponse {
    pub report: MatchReport,
    pub summary_text: String,
    pub sources_text: String,
}

#[derive(Debug, Clone, Serialize)]
struct ErrorBody {
    error: String,
}

impl From<&MatchSummary> for MatchListing {
    fn from(m: &MatchSummary) -> Self {
        Self {
            match_id: m.match_id().to_string(),
            home_team: m.home_team().to_string(),
            away_team: m.away_team().to_string(),
            home_code: m.home_code(),
            away_code: m.away_code(),
            kickoff: m.kickoff_time().to_rfc3339(),
            recommendation: m.recommendation().map(|o| o.to_string()),
            confidence: m.report.recommendation_confidence(),
            sources: m.report.sources.len(),
        }
    }
}

impl From<&LeagueSchedule> for ScheduleResponse {
    fn from(s: &LeagueSchedule) -> Self {
        Self {
            league: s.league.clone(),
            days: s
                .match_days
                .iter()
                .map(|d| DayListing {
                    date: d.date,
                    matches: d.matches.iter().map(|m| MatchListing::from(m.as_ref())).collect(),
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Maps service failures onto HTTP statuses.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self { status: StatusCode::NOT_FOUND, message: message.into() }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        let status = match err.downcast_ref::<OddsError>() {
            Some(OddsError::UnsupportedLeague { .. }) => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        };
        if status == StatusCode::BAD_GATEWAY {
            warn!(error = %err, "Upstream fetch failed");
        }
        Self { status, message: err.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn get_leagues(State(state): State<AppState>) -> Json<LeaguesResponse> {
    Json(LeaguesResponse {
        leagues: state.aggregator().leagues().map(String::from).collect(),
    })
}

pub async fn get_league_days(
    State(state): State<AppState>,
    Path(league): Path<String>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let schedule = state.get_league_schedule(&league).await?;
    Ok(Json(ScheduleResponse::from(schedule.as_ref())))
}

pub async fn get_match(
    State(state): State<AppState>,
    Path((league, match_id)): Path<(String, String)>,
) -> Result<Json<MatchResponse>, ApiError> {
    let summary = state
        .get_match_summary(&league, &match_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Match not found: {match_id}")))?;

    Ok(Json(MatchResponse {
        report: summary.report.clone(),
        summary_text: summary.format_summary(),
        sources_text: summary.format_sources(),
    }))
}
