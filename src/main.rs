use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hotel_analytics::adapters::memory_source::InMemoryRecordSource;
use hotel_analytics::config::load_config;
use hotel_analytics::dashboard::service::{DashboardSettings, KpiDashboard};
use hotel_analytics::domain::period::PeriodKind;
use hotel_analytics::ports::record_source::Scope;

/// Period-over-period occupancy and revenue KPIs for a hotel.
#[derive(Debug, Parser)]
#[command(name = "hotel-analytics", version, about)]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file holding reservations and invoices.
    #[arg(long)]
    records: Option<PathBuf>,

    /// Period granularity: day, week or month.
    #[arg(long)]
    period: Option<PeriodKind>,

    /// Reference instant (RFC 3339); defaults to now.
    #[arg(long)]
    at: Option<DateTime<Utc>>,

    /// Restrict the report to one room.
    #[arg(long)]
    room: Option<String>,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn find_config_path() -> PathBuf {
    let candidates = [
        PathBuf::from("config.yaml"),
        binary_dir().join("config.yaml"),
    ];

    for path in &candidates {
        if path.exists() {
            return path.clone();
        }
    }

    candidates[0].clone()
}

fn binary_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(find_config_path);
    let config = load_config(&config_path)?;

    let records_path = args.records.unwrap_or(config.source.records_path);
    let source = InMemoryRecordSource::from_json_file(&records_path)
        .with_context(|| format!("loading records from {}", records_path.display()))?;

    let settings = DashboardSettings::from_config(&config.analytics)?;
    let dashboard = KpiDashboard::new(Arc::new(source), settings);

    let kind = args.period.unwrap_or(config.analytics.period_kind);
    let reference = args.at.or(config.analytics.reference_instant);
    let scope = args.room.map_or(Scope::Hotel, Scope::Room);

    tracing::info!(scope = %scope, kind = %kind, "computing KPIs");
    let report = dashboard
        .refresh(scope, kind, reference)
        .await?
        .context("report superseded by a newer refresh")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }

    Ok(())
}
