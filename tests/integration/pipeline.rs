//! Full pipeline: provider payload → reports → consensus → schedule → cache.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use oddsboard::engine::{LeagueAggregator, ReportBuilder};
use oddsboard::schedule::LeagueSchedule;
use oddsboard::service::ScheduleService;
use oddsboard::types::{OddsError, Outcome};

use crate::mock_provider::{FixtureProvider, EPL_FIXTURE};

fn leagues() -> BTreeMap<String, String> {
    [("epl", "soccer_epl"), ("la_liga", "soccer_spain_la_liga")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn aggregator(provider: Arc<FixtureProvider>, bookmakers: Vec<String>) -> LeagueAggregator {
    LeagueAggregator::new(provider, leagues(), bookmakers, ReportBuilder::default())
}

fn epl_provider() -> Arc<FixtureProvider> {
    Arc::new(FixtureProvider::new().with_payload("soccer_epl", EPL_FIXTURE))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_fixture_builds_expected_reports() {
    let provider = epl_provider();
    let reports = aggregator(provider.clone(), vec![]).fetch_league("epl").await.unwrap();

    // The event without a kickoff and the non-object entry are dropped.
    let ids: Vec<&str> = reports.iter().map(|r| r.match_id.as_str()).collect();
    assert_eq!(ids, vec!["evt-ars-che", "evt-liv-mci", "evt-tot-new"]);
    assert!(reports.iter().all(|r| r.league == "epl" && r.sport_key == "soccer_epl"));

    let ars = &reports[0];
    assert_eq!(ars.sources.len(), 2);
    assert!(ars.sources[0].last_update.is_some());
    assert!(ars.sources[1].last_update.is_none());
    assert!((ars.average_home().unwrap() - 6.0 / 13.0).abs() < 1e-9);
    assert!((ars.average_draw().unwrap() - 4.0 / 13.0).abs() < 1e-9);
    assert!((ars.average_away().unwrap() - 3.0 / 13.0).abs() < 1e-9);
    assert_eq!(ars.recommended_outcome(), Some(Outcome::Home));
    assert!((ars.recommendation_confidence().unwrap() - 2.0 / 13.0).abs() < 1e-9);

    // "tie" counts as the draw outcome.
    let liv = &reports[1];
    assert!(liv.consensus.draw.is_some());
    assert_eq!(liv.recommended_outcome(), Some(Outcome::Away));

    let tot = &reports[2];
    assert!(tot.has_no_data());
    assert!(tot.recommendation.is_none());

    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_bookmaker_filter_is_forwarded() {
    let provider = epl_provider();
    let agg = aggregator(provider.clone(), vec!["bet365".into(), "unibet".into()]);
    agg.fetch_league("epl").await.unwrap();
    assert_eq!(provider.seen_bookmakers(), vec![vec!["bet365".to_string(), "unibet".to_string()]]);
}

#[tokio::test]
async fn test_schedule_groups_by_day_and_kickoff() {
    let reports = aggregator(epl_provider(), vec![]).fetch_league("epl").await.unwrap();
    let schedule = LeagueSchedule::build("epl", reports);

    assert_eq!(schedule.match_count(), 3);
    let dates: Vec<NaiveDate> = schedule.match_days.iter().map(|d| d.date).collect();
    assert_eq!(dates, vec![date(2024, 5, 1), date(2024, 5, 2)]);

    let first_day = schedule.day(date(2024, 5, 1)).unwrap();
    let order: Vec<&str> = first_day.matches.iter().map(|m| m.match_id()).collect();
    assert_eq!(order, vec!["evt-tot-new", "evt-ars-che"]);

    let summary = schedule.get("evt-ars-che").unwrap();
    assert_eq!(summary.home_code(), "ARS");
    assert!(summary.format_summary().contains("Kick-off: 2024-05-01 19:00 UTC"));
    assert!(summary.format_sources().contains("bet365"));

    let empty = schedule.get("evt-tot-new").unwrap();
    assert_eq!(empty.format_sources(), "No bookmaker data to display.");
}

#[tokio::test]
async fn test_fetch_many_keeps_league_order() {
    let provider = Arc::new(
        FixtureProvider::new()
            .with_payload("soccer_epl", EPL_FIXTURE)
            .with_payload(
                "soccer_spain_la_liga",
                r#"[{"id": "liga-1", "commence_time": "2024-05-04T19:00:00Z",
                     "home_team": "Girona", "away_team": "Barcelona", "bookmakers": []}]"#,
            ),
    );
    let agg = aggregator(provider.clone(), vec![]);
    let reports = agg
        .fetch_many(&["la_liga".to_string(), "epl".to_string()])
        .await
        .unwrap();

    assert_eq!(reports.len(), 4);
    assert_eq!(reports[0].match_id, "liga-1");
    assert_eq!(reports[0].league, "la_liga");
    assert_eq!(reports[1].league, "epl");
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_unsupported_league_never_reaches_provider() {
    let provider = epl_provider();
    let err = aggregator(provider.clone(), vec![]).fetch_league("mls").await.unwrap_err();
    match err.downcast_ref::<OddsError>() {
        Some(OddsError::UnsupportedLeague { league, supported }) => {
            assert_eq!(league, "mls");
            assert_eq!(supported, "epl, la_liga");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_service_caches_and_recovers_from_errors() {
    let provider = epl_provider();
    let service = ScheduleService::new(aggregator(provider.clone(), vec![]), Duration::from_secs(300));

    provider.set_error("quota exhausted");
    let err = service.get_league_schedule("epl").await.unwrap_err();
    assert!(err.to_string().contains("quota exhausted"));

    provider.clear_error();
    let first = service.get_league_schedule("epl").await.unwrap();
    let second = service.get_league_schedule("epl").await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(provider.calls(), 2);

    let summary = service.get_match_summary("epl", "evt-liv-mci").await.unwrap().unwrap();
    assert_eq!(summary.away_team(), "Manchester City");
    assert!(service.get_match_summary("epl", "nope").await.unwrap().is_none());
    assert_eq!(provider.calls(), 2);

    service.invalidate("epl").await;
    service.get_league_schedule("epl").await.unwrap();
    assert_eq!(provider.calls(), 3);
}

#[test]
fn test_unknown_sport_key_yields_empty_schedule() {
    let provider = Arc::new(FixtureProvider::new());
    let service = ScheduleService::new(aggregator(provider, vec![]), Duration::from_secs(300));
    let schedule = tokio_test::block_on(service.get_league_schedule("la_liga")).unwrap();
    assert!(schedule.is_empty());
    assert!(schedule.match_days.is_empty());
}
