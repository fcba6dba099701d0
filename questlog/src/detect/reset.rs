//! Reset confirm/cancel and the terminal condition.
//!
//! Entering the title/reset location logs a `Reset` entry and leaves it
//! pending. A warp item used from the menu passes through the same location
//! id, so the decision waits for the next slow tick: if the menu is still up
//! the trigger was false and both entries are retracted, otherwise the reset
//! stands.

use log::{debug, info};

use super::timers;
use crate::catalog::ActivityCode;
use crate::domain::{Duration, LocationId, Timestamp};
use crate::sampling::FastSample;
use crate::session::{EntryKind, RunState, SessionEvent, SessionStatus};

/// Scripted delay between the ending signals and the true end of the run.
pub const FINISH_SCRIPT_DELAY: Duration = Duration::from_millis(8_250);

#[derive(Debug, Clone, Default)]
pub struct ResetState {
    pending: bool,
    /// Location logged before the reset entry, restored on a false trigger
    location_before: Option<LocationId>,
    confirmed: u32,
}

impl ResetState {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Resets that survived their follow-up check
    #[must_use]
    pub fn confirmed(&self) -> u32 {
        self.confirmed
    }
}

/// Called by the location tracker right after it logs the reset location.
pub fn on_location_entered(
    state: &mut RunState,
    previous: Option<LocationId>,
    now: Timestamp,
    events: &mut Vec<SessionEvent>,
) {
    state.reset.pending = true;
    state.reset.location_before = previous;
    let at = state.elapsed_at(now);
    let entry = state.timeline.append(EntryKind::Reset, "Reset", at).clone();
    events.push(SessionEvent::EntryAppended(entry));
}

/// Settle a pending reset using this slow tick's menu state.
pub fn on_slow_tick(state: &mut RunState, fast: &FastSample, events: &mut Vec<SessionEvent>) {
    if !state.reset.pending {
        return;
    }
    let Some(activity) = fast.activity else {
        return;
    };

    state.reset.pending = false;
    if activity == ActivityCode::Menu {
        if let Some(removed) = state.timeline.retract_tail(&[EntryKind::Location, EntryKind::Reset]) {
            debug!("Reset was a menu warp, retracted {} entries", removed.len());
            events.push(SessionEvent::EntriesRetracted(removed));
        }
        state.last_location = state.reset.location_before.take();
    } else {
        state.reset.confirmed += 1;
        state.reset.location_before = None;
        info!("Reset confirmed ({} so far)", state.reset.confirmed);
        events.push(SessionEvent::ResetConfirmed);
    }
}

/// Finish the session if both ending signals are set.
///
/// Returns `true` when the session just finished. All running timers are
/// closed at `now`; the final time excludes [`FINISH_SCRIPT_DELAY`].
pub fn check_terminal(
    state: &mut RunState,
    fast: &FastSample,
    now: Timestamp,
    events: &mut Vec<SessionEvent>,
) -> bool {
    if !fast.terminal.is_some_and(|t| t.is_terminal()) {
        return false;
    }

    timers::close_all(state, now, events);
    let final_elapsed = state.elapsed_at(now).saturating_sub(FINISH_SCRIPT_DELAY);
    let entry = state.timeline.append_final(EntryKind::Finish, "Finished", final_elapsed).clone();
    events.push(SessionEvent::EntryAppended(entry));
    state.status = SessionStatus::Finished { final_elapsed };
    info!("Session finished at {final_elapsed}");
    events.push(SessionEvent::Finished { final_elapsed });
    true
}
