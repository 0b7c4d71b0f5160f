//! ODDSBOARD — bookmaker consensus for football fixtures
//!
//! Entry point. Loads configuration, initialises structured logging,
//! fetches the requested leagues and prints per-fixture consensus
//! tables, or serves the dashboard API with `--serve`.

use anyhow::Result;
use clap::Parser;
use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::{info, warn};

use oddsboard::config::AppConfig;
use oddsboard::dashboard;
use oddsboard::data::odds_api::OddsApiClient;
use oddsboard::engine::LeagueAggregator;
use oddsboard::schedule::format_kickoff;
use oddsboard::platforms::polymarket::{match_reports_to_polymarket, PolymarketClient};
use oddsboard::service::ScheduleService;
use oddsboard::types::{format_percent, MatchReport};

#[derive(Debug, Parser)]
#[command(name = "oddsboard", about = "Fetch and aggregate football odds from The Odds API.")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// League keys to fetch (default: all configured leagues).
    #[arg(long, num_args = 1.., value_name = "LEAGUE")]
    leagues: Vec<String>,

    /// Comma-separated regions to request (overrides config).
    #[arg(long)]
    regions: Option<String>,

    /// Bookmaker keys to restrict responses to (overrides config).
    #[arg(long, num_args = 1..)]
    bookmakers: Vec<String>,

    /// Only display matches that exist as active markets on Polymarket.
    #[arg(long)]
    polymarket_only: bool,

    /// Override the Polymarket markets endpoint.
    #[arg(long)]
    polymarket_endpoint: Option<String>,

    /// Serve the dashboard API instead of printing once.
    #[arg(long)]
    serve: bool,
}

#[derive(Tabled)]
struct SourceRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Home")]
    home: String,
    #[tabled(rename = "Draw")]
    draw: String,
    #[tabled(rename = "Away")]
    away: String,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "")]
    label: String,
    #[tabled(rename = "")]
    value: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();
    let mut cfg = AppConfig::load_or_default(&cli.config)?;
    init_logging();

    if let Some(regions) = &cli.regions {
        cfg.odds_api.regions = regions.clone();
    }
    if !cli.bookmakers.is_empty() {
        cfg.aggregation.bookmakers = cli.bookmakers.clone();
    }
    if let Some(endpoint) = &cli.polymarket_endpoint {
        cfg.polymarket.endpoint = endpoint.clone();
    }
    if let Err(e) = cfg.validate() {
        eprintln!("{e}");
        return Ok(ExitCode::from(2));
    }

    let leagues: Vec<String> = if cli.leagues.is_empty() {
        cfg.leagues.0.keys().cloned().collect()
    } else {
        cli.leagues.iter().map(|l| l.to_lowercase()).collect()
    };
    let unknown: Vec<&str> = leagues
        .iter()
        .filter(|l| !cfg.leagues.0.contains_key(*l))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        let supported: Vec<&str> = cfg.leagues.0.keys().map(String::as_str).collect();
        eprintln!(
            "Unsupported league key(s): {}. Supported: {}",
            unknown.join(", "),
            supported.join(", ")
        );
        return Ok(ExitCode::from(2));
    }

    let client = OddsApiClient::from_config(&cfg.odds_api)?;
    let aggregator = LeagueAggregator::from_config(Arc::new(client), &cfg);

    info!(
        leagues = ?leagues,
        bookmakers = aggregator.bookmakers().len(),
        regions = %cfg.odds_api.regions,
        "ODDSBOARD starting up"
    );

    if cli.serve || cfg.dashboard.enabled {
        let service = Arc::new(ScheduleService::new(aggregator, Duration::from_secs(cfg.cache.ttl_secs)));
        tokio::select! {
            result = dashboard::serve(service, cfg.dashboard.port) => result?,
            _ = tokio::signal::ctrl_c() => info!("Shutdown signal received."),
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut reports = aggregator.fetch_many(&leagues).await?;

    let mut cross_listed: HashMap<String, String> = HashMap::new();
    if !reports.is_empty() && cfg.polymarket.enabled {
        match fetch_polymarket_mapping(&cfg, &reports).await {
            Ok(mapping) => cross_listed = mapping,
            Err(e) => warn!(error = %e, "Failed to fetch Polymarket markets"),
        }
    }

    if cli.polymarket_only {
        reports.retain(|r| cross_listed.contains_key(&r.match_id));
    }

    if reports.is_empty() {
        println!("No upcoming matches returned by The Odds API.");
        return Ok(ExitCode::SUCCESS);
    }

    for report in &reports {
        print_report(report, cross_listed.contains_key(&report.match_id));
    }

    Ok(ExitCode::SUCCESS)
}

/// Match id → Polymarket market id for fixtures listed there.
async fn fetch_polymarket_mapping(cfg: &AppConfig, reports: &[MatchReport]) -> Result<HashMap<String, String>> {
    let client = PolymarketClient::new(&cfg.polymarket)?;
    let markets = client.get_active_markets(false).await?;
    Ok(match_reports_to_polymarket(reports, &markets)
        .into_iter()
        .map(|(match_id, market)| (match_id, market.id.clone()))
        .collect())
}

fn print_report(report: &MatchReport, on_polymarket: bool) {
    let mut header = format!(
        "{} | {} vs {} | {}",
        report.league.to_uppercase(),
        report.home_team,
        report.away_team,
        format_kickoff(&report.commence_time),
    );
    if on_polymarket {
        header = format!("[Polymarket] {header}");
    }
    let rule = "=".repeat(header.chars().count());

    println!("{rule}");
    println!("{header}");
    println!("{rule}");
    println!("Per-source probabilities:");
    println!("{}", render_sources(report));
    println!();
    println!("Aggregated summary:");
    println!("{}", render_summary(report));
    println!("\n");
}

fn render_sources(report: &MatchReport) -> String {
    let mut sources: Vec<_> = report.sources.iter().collect();
    sources.sort_by(|a, b| a.source.cmp(&b.source));
    let rows = sources.into_iter().map(|s| SourceRow {
        source: s.source.clone(),
        home: format_percent(s.home()),
        draw: format_percent(s.draw()),
        away: format_percent(s.away()),
    });
    Table::new(rows).with(Style::blank()).to_string()
}

fn render_summary(report: &MatchReport) -> String {
    let mut rows = vec![
        SummaryRow { label: "Home".into(), value: format_percent(report.average_home()) },
        SummaryRow { label: "Draw".into(), value: format_percent(report.average_draw()) },
        SummaryRow { label: "Away".into(), value: format_percent(report.average_away()) },
    ];
    if let Some(rec) = &report.recommendation {
        rows.push(SummaryRow { label: "Recommendation".into(), value: rec.to_string() });
    }
    let mut table = Table::new(rows);
    table.with(Style::blank());
    table.to_string()
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("oddsboard=info"));

    let json_logging = std::env::var("ODDSBOARD_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
