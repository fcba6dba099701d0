//! The per-session aggregate.
//!
//! [`RunState`] is a plain value owned by whoever drives the session. Every
//! detector receives it by `&mut` for the duration of one tick; nothing else
//! holds a reference across ticks.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use super::timeline::Timeline;
use crate::detect::formation::FormationLog;
use crate::detect::ledger::Ledger;
use crate::detect::milestones::MilestoneBook;
use crate::detect::reset::ResetState;
use crate::detect::timers::Timer;
use crate::domain::{Duration, LocationId, Timestamp};
use crate::sampling::DialogState;

/// Timed activities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Menu,
    Shop,
    Encounter,
    Transport,
}

impl Activity {
    pub const ALL: [Activity; 4] =
        [Activity::Menu, Activity::Shop, Activity::Encounter, Activity::Transport];
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Activity::Menu => "menu",
            Activity::Shop => "shop",
            Activity::Encounter => "encounter",
            Activity::Transport => "transport",
        };
        f.write_str(name)
    }
}

/// Accumulated time and start count for one activity. Never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActivityTotals {
    pub elapsed: Duration,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub menu: ActivityTotals,
    pub shop: ActivityTotals,
    pub encounter: ActivityTotals,
    pub transport: ActivityTotals,
}

impl Totals {
    #[must_use]
    pub fn get(&self, activity: Activity) -> ActivityTotals {
        match activity {
            Activity::Menu => self.menu,
            Activity::Shop => self.shop,
            Activity::Encounter => self.encounter,
            Activity::Transport => self.transport,
        }
    }

    pub fn get_mut(&mut self, activity: Activity) -> &mut ActivityTotals {
        match activity {
            Activity::Menu => &mut self.menu,
            Activity::Shop => &mut self.shop,
            Activity::Encounter => &mut self.encounter,
            Activity::Transport => &mut self.transport,
        }
    }
}

/// Previous-tick copies of raw signals used for edge detection
#[derive(Debug, Clone, Default)]
pub struct Shadow {
    pub frame_counter: Option<u8>,
    pub dialog: Option<DialogState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Running,
    /// Frozen; no tick mutates the state any more
    Finished { final_elapsed: Duration },
}

#[derive(Debug, Clone)]
pub struct RunState {
    pub started_at: Timestamp,
    /// Time of the most recent tick
    pub last_tick: Timestamp,
    pub status: SessionStatus,

    /// Shared menu/shop timer; `menu_kind` says which totals it feeds
    pub menu: Timer,
    pub menu_kind: Activity,
    pub encounter: Timer,
    pub transport: Timer,
    /// Transport was closed out by an encounter and has not been left since
    pub transport_interrupted: bool,
    pub totals: Totals,

    pub shadow: Shadow,
    /// Location of the last appended location entry
    pub last_location: Option<LocationId>,
    pub visited: BTreeSet<LocationId>,

    pub formation: FormationLog,
    pub milestones: MilestoneBook,
    pub ledger: Ledger,
    pub reset: ResetState,

    pub inventory: Option<Vec<u8>>,
    pub seed: Option<u32>,

    pub timeline: Timeline,
}

impl RunState {
    #[must_use]
    pub fn new(started_at: Timestamp) -> Self {
        Self {
            started_at,
            last_tick: started_at,
            status: SessionStatus::Running,
            menu: Timer::default(),
            menu_kind: Activity::Menu,
            encounter: Timer::default(),
            transport: Timer::default(),
            transport_interrupted: false,
            totals: Totals::default(),
            shadow: Shadow::default(),
            last_location: None,
            visited: BTreeSet::new(),
            formation: FormationLog::default(),
            milestones: MilestoneBook::default(),
            ledger: Ledger::default(),
            reset: ResetState::default(),
            inventory: None,
            seed: None,
            timeline: Timeline::new(),
        }
    }

    /// Session time at `now`
    #[must_use]
    pub fn elapsed_at(&self, now: Timestamp) -> Duration {
        now.since(self.started_at)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.status, SessionStatus::Finished { .. })
    }

    /// Final time if finished, otherwise time up to the latest tick
    #[must_use]
    pub fn total_elapsed(&self) -> Duration {
        match self.status {
            SessionStatus::Finished { final_elapsed } => final_elapsed,
            SessionStatus::Running => self.elapsed_at(self.last_tick),
        }
    }
}
