//! # questlog - Main Entry Point
//!
//! Supports two operational modes:
//! - **Live** (`--catalog catalog.json`): poll RetroArch until the session finishes
//! - **Replay** (`--replay run.jsonl`): run a recording through a fresh session

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::{Duration, Instant};

use questlog::catalog::Catalog;
use questlog::cli::Args;
use questlog::display::{display_events, display_statistics, display_summary};
use questlog::domain::Timestamp;
use questlog::driver::{replay, run_live, Cadence, RunOutcome, Tracker};
use questlog::export::RunSummary;
use questlog::recording::{read_recording, SampleRecorder};
use questlog::session::{Session, SessionEvent};
use questlog::source::{ExponentialBackoff, RetroArchSource, RetryingSource};

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_UNAVAILABLE: i32 = 69;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let msg = err.to_string().to_lowercase();
    if msg.contains("failed to reach host") {
        EXIT_UNAVAILABLE
    } else if msg.contains("catalog") {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn write_report(summary: &RunSummary, path: &Path, quiet: bool) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    summary.write_json(BufWriter::new(file)).context("Failed to write report")?;
    if !quiet {
        println!("saved: {}", path.display());
    }
    Ok(())
}

fn printer(quiet: bool) -> impl FnMut(&[SessionEvent], &Session) {
    move |events, session| {
        if !quiet {
            display_events(events, session);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn run() -> Result<()> {
    let args = Args::parse();
    let quiet = args.quiet;

    let catalog = Catalog::from_file(&args.catalog)
        .with_context(|| format!("Failed to load catalog {}", args.catalog.display()))?;

    if let Some(path) = &args.replay {
        let file = File::open(path)
            .with_context(|| format!("Failed to open recording {}", path.display()))?;
        let ticks = read_recording(BufReader::new(file)).context("Failed to read recording")?;
        info!("Replaying {} ticks from {}", ticks.len(), path.display());

        let session = replay(&catalog, ticks, printer(quiet));
        let summary = session.summary(&catalog);
        display_summary(&summary);
        if let Some(export) = &args.export {
            write_report(&summary, export, quiet)?;
        }
        return Ok(());
    }

    let transport = RetroArchSource::connect(
        &args.host,
        args.port,
        Duration::from_millis(args.read_timeout_ms),
    )?;
    let backoff = ExponentialBackoff { max_retries: args.retries, ..ExponentialBackoff::default() };
    let source = RetryingSource::new(transport, backoff);

    let cadence = Cadence {
        interval: questlog::domain::Duration::from_millis(args.interval_ms),
        slow_every: args.slow_every,
    };
    let mut tracker = Tracker::new(source, catalog, cadence, Timestamp(0));
    if let Some(path) = &args.record {
        let recorder = SampleRecorder::create(path)
            .with_context(|| format!("Failed to create recording {}", path.display()))?;
        tracker = tracker.with_recorder(recorder);
    }

    if !quiet {
        println!("questlog v{}", env!("CARGO_PKG_VERSION"));
        println!("host: {}:{}", args.host, args.port);
        println!("cadence: {}ms, slow every {} ticks", args.interval_ms, args.slow_every);
        println!("{}", SessionEvent::Started);
    }

    let origin = Instant::now();
    let duration_limit = if args.duration > 0 { Some(Duration::from_secs(args.duration)) } else { None };
    let outcome = run_live(&mut tracker, duration_limit, origin, printer(quiet)).await;

    let exit_reason = match outcome {
        RunOutcome::Finished => "finished",
        RunOutcome::Interrupted => "interrupted",
        RunOutcome::DurationLimit => "duration limit reached",
    };
    display_statistics(exit_reason, tracker.ticks(), tracker.short_reads());

    let now = Timestamp(u64::try_from(origin.elapsed().as_millis()).unwrap_or(u64::MAX));
    let summary = if outcome == RunOutcome::Finished {
        tracker.finalize(now).unwrap_or_else(|e| {
            warn!("{e}; writing best-effort report");
            tracker.session().summary(tracker.catalog())
        })
    } else {
        tracker.session().summary(tracker.catalog())
    };

    display_summary(&summary);
    if let Some(export) = &args.export {
        write_report(&summary, export, quiet)?;
    }
    Ok(())
}
