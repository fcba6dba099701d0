//! Headless, line-oriented output

use crate::export::RunSummary;
use crate::session::{Session, SessionEvent};

/// Print a tick's events, one per line, prefixed with session time
pub fn display_events(events: &[SessionEvent], session: &Session) {
    let elapsed = session.state().elapsed_at(session.state().last_tick);
    for event in events {
        match event {
            // Entries carry their own time
            SessionEvent::EntryAppended(entry) => println!("[{}] + {}", entry.at, entry.label),
            _ => println!("[{elapsed}] {event}"),
        }
    }
}

/// Print the end-of-run summary
pub fn display_summary(summary: &RunSummary) {
    let status = if summary.finished { "finished" } else { "unfinished" };
    println!("\n{status}: {}", summary.total_elapsed);
    for report in &summary.activities {
        println!("  {:<10} {} ({}x)", report.activity.to_string(), report.elapsed, report.count);
    }
    println!("  currency   spent={} earned={}", summary.currency.spent, summary.currency.earned);
    println!("  resets     {}", summary.resets);
    println!("  locations  {}", summary.locations_visited);
    if !summary.completed.is_empty() {
        println!("  completed  {}", summary.completed.join(", "));
    }
    if !summary.peeked.is_empty() {
        println!("  peeked     {}", summary.peeked.join(", "));
    }
    if let Some(challenge) = summary.challenge {
        println!("  challenge  visited={} won={}", challenge.visited, challenge.won);
    }
}

/// Print the end-of-run statistics line
pub fn display_statistics(outcome: &str, ticks: u64, short_reads: u64) {
    eprintln!("{outcome}: {ticks} ticks, {short_reads} short reads");
}
