//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "questlog",
    about = "Track a game session by polling emulator memory",
    after_help = "\
EXAMPLES:
    questlog --catalog catalog.json                         Track via RetroArch on localhost
    questlog --catalog catalog.json --export run.json       Write the report when done
    questlog --catalog catalog.json --record run.jsonl      Keep every sample for later
    questlog --catalog catalog.json --replay run.jsonl      Re-run a recording offline"
)]
pub struct Args {
    /// Catalog file with the game's lookup tables
    #[arg(short, long, value_name = "FILE")]
    pub catalog: PathBuf,

    /// Host running RetroArch with network commands enabled
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// RetroArch network command port
    #[arg(long, default_value = "55355")]
    pub port: u16,

    /// Fast tick interval in milliseconds
    #[arg(long, default_value = "50", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_ms: u64,

    /// Read the slow signals every N ticks
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
    pub slow_every: u32,

    /// Per-read timeout in milliseconds
    #[arg(long, default_value = "250")]
    pub read_timeout_ms: u64,

    /// Retries per read before the tick is skipped
    #[arg(long, default_value = "5")]
    pub retries: u32,

    /// Write the run report to file
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,

    /// Record every sample to a JSON-lines file
    #[arg(long, value_name = "FILE", conflicts_with = "replay")]
    pub record: Option<PathBuf>,

    /// Replay a recording instead of connecting
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// Stop after N seconds (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub duration: u64,

    /// Suppress per-event output
    #[arg(short, long)]
    pub quiet: bool,
}
