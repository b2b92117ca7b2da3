//! CLI argument parsing for the eld-trip-worker binary.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use crate::types::parse_timestamp;

#[derive(Parser)]
#[command(name = "eld-trip-worker", about = "HOS trip planner and ELD log generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Plan a trip and print the route events, duty logs and summary as JSON
    Plan {
        /// Where the driver is now
        #[arg(long)]
        current: String,
        #[arg(long)]
        pickup: String,
        #[arg(long)]
        dropoff: String,
        /// Hours already used toward the driving limit
        #[arg(long, default_value_t = 0.0)]
        cycle_hours: f64,
        /// Departure time (RFC 3339; naive values are read as UTC). Defaults to now.
        #[arg(long, value_parser = parse_timestamp)]
        start: Option<DateTime<Utc>>,
        /// Write the plan to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Build duty logs from a JSON array of route events
    Logs {
        #[arg(long)]
        events: PathBuf,
    },
}
