//! League schedules.
//!
//! Groups a league's reports by kickoff date for the presentation layer
//! and indexes them by match id. A schedule is built wholesale from a
//! batch of reports and never patched afterwards.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use crate::text::short_team_code;
use crate::types::{format_percent, MatchReport, Outcome};

// ---------------------------------------------------------------------------
// Match summary
// ---------------------------------------------------------------------------

/// A report wrapped with display helpers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub report: MatchReport,
}

impl MatchSummary {
    pub fn new(report: MatchReport) -> Self {
        Self { report }
    }

    pub fn match_id(&self) -> &str {
        &self.report.match_id
    }

    pub fn home_team(&self) -> &str {
        &self.report.home_team
    }

    pub fn away_team(&self) -> &str {
        &self.report.away_team
    }

    pub fn kickoff_time(&self) -> DateTime<FixedOffset> {
        self.report.commence_time
    }

    pub fn home_code(&self) -> String {
        short_team_code(self.home_team())
    }

    pub fn away_code(&self) -> String {
        short_team_code(self.away_team())
    }

    pub fn recommendation(&self) -> Option<Outcome> {
        self.report.recommended_outcome()
    }

    /// Chat-ready consensus block (Telegram HTML subset). Kick-off is shown
    /// in the report's own offset, the same one its schedule day uses.
    pub fn format_summary(&self) -> String {
        let rec = self.recommendation();
        let (home_code, away_code) = (self.home_code(), self.away_code());
        let mut lines = vec![
            format!("<b>{home_code} vs {away_code}</b>"),
            format!("{} vs {}", self.home_team(), self.away_team()),
            format!(
                "Kick-off: {}",
                format_kickoff(&self.kickoff_time())
            ),
            String::new(),
            "<b>Consensus</b>".to_string(),
        ];
        for outcome in Outcome::ALL {
            lines.push(consensus_line(
                outcome,
                &self.outcome_label(outcome),
                self.report.consensus.get(outcome),
                rec,
            ));
        }

        lines.push(String::new());
        lines.push("<b>Recommendation</b>".to_string());
        match rec {
            Some(outcome) => {
                let confidence = format_percent(self.report.recommendation_confidence());
                lines.push(format!("🏁 <b>{}</b> (Δ {confidence})", self.outcome_label(outcome)));
            }
            None => lines.push("No clear edge".to_string()),
        }
        lines.join("\n")
    }

    /// Per-bookmaker breakdown, sorted by bookmaker key.
    pub fn format_sources(&self) -> String {
        if self.report.sources.is_empty() {
            return "No bookmaker data to display.".to_string();
        }
        let rec = self.recommendation();
        let mut sources: Vec<_> = self.report.sources.iter().collect();
        sources.sort_by(|a, b| a.source.cmp(&b.source));

        let mut lines = vec!["<b>Bookmakers</b>".to_string()];
        for src in sources {
            let parts: Vec<String> = Outcome::ALL
                .iter()
                .map(|&o| {
                    let formatted = format!("{} {}", self.outcome_label(o), format_percent(src.probabilities.get(o)));
                    if rec == Some(o) {
                        format!("<b>{formatted}</b>")
                    } else {
                        formatted
                    }
                })
                .collect();
            lines.push(format!("{}: {}", src.source, parts.join(" · ")));
        }
        lines.join("\n")
    }

    fn outcome_label(&self, outcome: Outcome) -> String {
        match outcome {
            Outcome::Home => self.home_code(),
            Outcome::Away => self.away_code(),
            Outcome::Draw => "Draw".to_string(),
        }
    }
}

/// Kick-off in its own offset: `2024-05-01 19:00 UTC`, or
/// `2024-05-02 00:30 UTC+02:00` away from UTC. The date always matches
/// the schedule day the match is grouped under.
pub fn format_kickoff(kickoff: &DateTime<FixedOffset>) -> String {
    let stamp = kickoff.format("%Y-%m-%d %H:%M");
    if kickoff.offset().local_minus_utc() == 0 {
        format!("{stamp} UTC")
    } else {
        format!("{stamp} UTC{}", kickoff.format("%:z"))
    }
}

fn consensus_line(outcome: Outcome, label: &str, value: Option<f64>, rec: Option<Outcome>) -> String {
    let body = format!("{label} {}", format_percent(value));
    if rec == Some(outcome) {
        format!("🏁 <b>{body}</b>")
    } else {
        format!("• {body}")
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// All matches kicking off on one calendar date, earliest first.
#[derive(Debug, Clone)]
pub struct MatchDay {
    pub date: NaiveDate,
    pub matches: Vec<Arc<MatchSummary>>,
}

/// A league's matches by day, plus a match-id index.
#[derive(Debug, Clone)]
pub struct LeagueSchedule {
    pub league: String,
    /// Ascending by date.
    pub match_days: Vec<MatchDay>,
    pub match_index: HashMap<String, Arc<MatchSummary>>,
}

impl LeagueSchedule {
    /// Group `reports` by the kickoff date in each report's own offset.
    /// Reports without both team names are left out entirely.
    pub fn build(league: &str, reports: Vec<MatchReport>) -> Self {
        let mut days: BTreeMap<NaiveDate, Vec<Arc<MatchSummary>>> = BTreeMap::new();
        let mut match_index = HashMap::new();
        let mut skipped = 0usize;

        for report in reports {
            if report.home_team.is_empty() || report.away_team.is_empty() {
                skipped += 1;
                continue;
            }
            let date = report.commence_time.date_naive();
            let summary = Arc::new(MatchSummary::new(report));
            match_index.insert(summary.match_id().to_string(), Arc::clone(&summary));
            days.entry(date).or_default().push(summary);
        }

        let match_days: Vec<MatchDay> = days
            .into_iter()
            .map(|(date, mut matches)| {
                matches.sort_by_key(|m| m.kickoff_time());
                MatchDay { date, matches }
            })
            .collect();

        debug!(
            league,
            days = match_days.len(),
            matches = match_index.len(),
            skipped,
            "Built league schedule"
        );

        Self { league: league.to_string(), match_days, match_index }
    }

    pub fn get(&self, match_id: &str) -> Option<&Arc<MatchSummary>> {
        self.match_index.get(match_id)
    }

    pub fn day(&self, date: NaiveDate) -> Option<&MatchDay> {
        self.match_days.iter().find(|d| d.date == date)
    }

    pub fn match_count(&self) -> usize {
        self.match_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.match_index.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::builder::parse_timestamp;
    use crate::types::{OutcomeTriple, Recommendation, SourceQuote};

    fn report(id: &str, kickoff: &str, home: &str, away: &str) -> MatchReport {
        MatchReport {
            league: "epl".into(),
            sport_key: "soccer_epl".into(),
            match_id: id.into(),
            commence_time: parse_timestamp(kickoff).unwrap(),
            home_team: home.into(),
            away_team: away.into(),
            sources: vec![],
            consensus: OutcomeTriple::empty(),
            recommendation: None,
        }
    }

    #[test]
    fn test_groups_by_date_ascending() {
        let reports = vec![
            report("c", "2024-05-02T12:00:00Z", "Everton", "Fulham"),
            report("b", "2024-05-01T19:45:00Z", "Arsenal", "Chelsea"),
            report("a", "2024-05-01T12:30:00Z", "Luton Town", "Brentford"),
        ];
        let schedule = LeagueSchedule::build("epl", reports);

        assert_eq!(schedule.match_days.len(), 2);
        assert_eq!(schedule.match_days[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(schedule.match_days[1].date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());

        let first_day: Vec<&str> = schedule.match_days[0].matches.iter().map(|m| m.match_id()).collect();
        assert_eq!(first_day, vec!["a", "b"]);
        assert_eq!(schedule.match_count(), 3);
    }

    #[test]
    fn test_missing_team_excluded_everywhere() {
        let reports = vec![
            report("ok", "2024-05-01T12:00:00Z", "Arsenal", "Chelsea"),
            report("bad", "2024-05-01T15:00:00Z", "", "Chelsea"),
        ];
        let schedule = LeagueSchedule::build("epl", reports);
        assert!(schedule.get("bad").is_none());
        assert!(schedule
            .match_days
            .iter()
            .all(|d| d.matches.iter().all(|m| m.match_id() != "bad")));
        assert_eq!(schedule.match_count(), 1);
    }

    #[test]
    fn test_date_uses_report_offset() {
        // 23:30 at +02:00 is 21:30 UTC on the same day; 00:30 at +02:00 is the previous UTC day.
        let reports = vec![
            report("late", "2024-05-01T23:30:00+02:00", "Real Madrid", "Getafe"),
            report("early", "2024-05-02T00:30:00+02:00", "Girona", "Cadiz"),
        ];
        let schedule = LeagueSchedule::build("la_liga", reports);
        assert_eq!(schedule.match_days.len(), 2);
        assert_eq!(schedule.match_days[1].matches[0].match_id(), "early");
    }

    #[test]
    fn test_index_and_days_share_summaries() {
        let schedule = LeagueSchedule::build("epl", vec![report("x", "2024-05-01T12:00:00Z", "A FC", "B FC")]);
        let from_index = schedule.get("x").unwrap();
        let from_day = &schedule.day(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()).unwrap().matches[0];
        assert!(Arc::ptr_eq(from_index, from_day));
    }

    #[test]
    fn test_empty_schedule() {
        let schedule = LeagueSchedule::build("epl", vec![]);
        assert!(schedule.is_empty());
        assert!(schedule.match_days.is_empty());
    }

    #[test]
    fn test_format_summary_with_recommendation() {
        let mut r = report("m", "2024-05-01T19:00:00Z", "Manchester United", "Aston Villa");
        r.consensus = OutcomeTriple::new(Some(0.5), Some(0.3), Some(0.2));
        r.recommendation = Some(Recommendation { outcome: Outcome::Home, confidence: Some(0.2) });
        let text = MatchSummary::new(r).format_summary();

        assert!(text.starts_with("<b>MU vs AV</b>"));
        assert!(text.contains("Kick-off: 2024-05-01 19:00 UTC"));
        assert!(text.contains("🏁 <b>MU 50.00%</b>"));
        assert!(text.contains("• Draw 30.00%"));
        assert!(text.contains("• AV 20.00%"));
        assert!(text.ends_with("🏁 <b>MU</b> (Δ 20.00%)"));
    }

    #[test]
    fn test_kickoff_text_matches_schedule_day() {
        let schedule = LeagueSchedule::build(
            "epl",
            vec![report("late", "2024-05-02T00:30:00+02:00", "Arsenal", "Chelsea")],
        );
        let day = &schedule.match_days[0];
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        let text = day.matches[0].format_summary();
        assert!(text.contains("Kick-off: 2024-05-02 00:30 UTC+02:00"));

        let west = parse_timestamp("2024-05-01T21:00:00-03:00").unwrap();
        assert_eq!(format_kickoff(&west), "2024-05-01 21:00 UTC-03:00");
    }

    #[test]
    fn test_format_summary_no_edge() {
        let text = MatchSummary::new(report("m", "2024-05-01T19:00:00Z", "Arsenal", "Chelsea")).format_summary();
        assert!(text.contains("• ARS N/A"));
        assert!(text.ends_with("No clear edge"));
    }

    #[test]
    fn test_format_sources_sorted_and_highlighted() {
        let mut r = report("m", "2024-05-01T19:00:00Z", "Arsenal", "Chelsea");
        r.sources = vec![
            SourceQuote {
                source: "unibet".into(),
                probabilities: OutcomeTriple::new(Some(0.5), Some(0.3), Some(0.2)),
                last_update: None,
            },
            SourceQuote {
                source: "bet365".into(),
                probabilities: OutcomeTriple::new(Some(0.6), None, Some(0.4)),
                last_update: None,
            },
        ];
        r.recommendation = Some(Recommendation { outcome: Outcome::Home, confidence: Some(0.25) });
        let text = MatchSummary::new(r).format_sources();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "<b>Bookmakers</b>");
        assert_eq!(lines[1], "bet365: <b>ARS 60.00%</b> · Draw N/A · CHE 40.00%");
        assert!(lines[2].starts_with("unibet:"));
    }

    #[test]
    fn test_format_sources_empty() {
        let text = MatchSummary::new(report("m", "2024-05-01T19:00:00Z", "Arsenal", "Chelsea")).format_sources();
        assert_eq!(text, "No bookmaker data to display.");
    }
}
