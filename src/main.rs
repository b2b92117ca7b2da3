//! ELD trip worker - plans HOS-compliant trips and prints daily duty logs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::{debug, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eld_trip_worker::cli::{Cli, Command};
use eld_trip_worker::config::Config;
use eld_trip_worker::services::duty_log::DutyLogPartitioner;
use eld_trip_worker::services::geocoding::create_geocoding;
use eld_trip_worker::services::route_planner::RoutePlanner;
use eld_trip_worker::services::trip::TripPlanner;
use eld_trip_worker::types::{RouteEvent, TripRequest};

#[tokio::main]
async fn main() -> Result<()> {
    let logs_dir = std::env::var("LOGS_DIR").unwrap_or_else(|_| "./logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &logs_dir, "eld-trip-worker.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // stdout carries the JSON result, so console logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,eld_trip_worker=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!("Configuration loaded (geocoder backend: {})", config.geocoder_backend);

    match cli.command {
        Command::Plan {
            current,
            pickup,
            dropoff,
            cycle_hours,
            start,
            output,
        } => {
            let request = TripRequest {
                current_location: current,
                pickup_location: pickup,
                dropoff_location: dropoff,
                current_cycle_hours: cycle_hours,
            };
            run_plan(&config, request, start.unwrap_or_else(Utc::now), output).await
        }
        Command::Logs { events } => run_logs(&config, &events),
    }
}

async fn run_plan(
    config: &Config,
    request: TripRequest,
    start_time: DateTime<Utc>,
    output: Option<PathBuf>,
) -> Result<()> {
    let geocoding = create_geocoding(config)?;
    let planner = TripPlanner::new(
        RoutePlanner::new(geocoding).with_timeout(config.geocoder_timeout),
        DutyLogPartitioner::new(config.log_utc_offset),
    );

    let plan = planner
        .plan_trip(request, start_time)
        .await
        .context("Failed to plan trip")?;

    let json = serde_json::to_string_pretty(&plan)?;
    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write plan to {}", path.display()))?;
            info!("Trip plan written to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn run_logs(config: &Config, events_path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(events_path)
        .with_context(|| format!("Failed to read {}", events_path.display()))?;
    let events: Vec<RouteEvent> = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid route events in {}", events_path.display()))?;
    debug!("Loaded {} route events", events.len());

    let logs = DutyLogPartitioner::new(config.log_utc_offset).partition(&events);
    info!("Generated {} daily logs", logs.len());

    println!("{}", serde_json::to_string_pretty(&logs)?);
    Ok(())
}
