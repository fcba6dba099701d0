//! Domain events emitted by a tick.
//!
//! Detectors push events into the tick's list; the caller drains it after the
//! tick completes. Observers receive events and `&RunState` only, so nothing
//! downstream can mutate the session.

use std::fmt;

use super::state::Activity;
use super::timeline::TimelineEntry;
use crate::domain::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new session began (start of tracking, or after an abandonment)
    Started,
    TimerStarted {
        activity: Activity,
        /// Elapsed session time at the rising edge
        at: Duration,
        /// Transport resumed after an encounter interrupted it; not a new use
        resumed: bool,
    },
    TimerStopped {
        activity: Activity,
        elapsed: Duration,
        /// Closed out because a higher-priority timer started
        interrupted: bool,
    },
    EntryAppended(TimelineEntry),
    EntriesRetracted(Vec<TimelineEntry>),
    MilestonePeeked { name: String },
    MilestoneCompleted { name: String },
    ResetConfirmed,
    /// Seed or save file changed; the session must be abandoned
    SeedChanged { previous: u32, current: u32 },
    Abandoned,
    Finished { final_elapsed: Duration },
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::Started => write!(f, "session started"),
            SessionEvent::TimerStarted { activity, at, resumed } => {
                let verb = if *resumed { "resumed" } else { "started" };
                write!(f, "{activity} {verb} at {at}")
            }
            SessionEvent::TimerStopped { activity, elapsed, interrupted } => {
                write!(f, "{activity} stopped after {elapsed}")?;
                if *interrupted {
                    write!(f, " (interrupted)")?;
                }
                Ok(())
            }
            SessionEvent::EntryAppended(entry) => write!(f, "{entry}"),
            SessionEvent::EntriesRetracted(entries) => {
                let labels: Vec<&str> = entries.iter().map(|e| e.label.as_str()).collect();
                write!(f, "retracted: {}", labels.join(" | "))
            }
            SessionEvent::MilestonePeeked { name } => write!(f, "peeked: {name}"),
            SessionEvent::MilestoneCompleted { name } => write!(f, "completed: {name}"),
            SessionEvent::ResetConfirmed => write!(f, "reset confirmed"),
            SessionEvent::SeedChanged { previous, current } => {
                write!(f, "seed changed {previous:08x} -> {current:08x}")
            }
            SessionEvent::Abandoned => write!(f, "session abandoned"),
            SessionEvent::Finished { final_elapsed } => write!(f, "finished in {final_elapsed}"),
        }
    }
}
