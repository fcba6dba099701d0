//! Encounter formation logger.
//!
//! While an encounter is active the roster block is compared byte-for-byte
//! against the last one seen. A change is decoded into a comma-joined list of
//! names and logged to the timeline. The host writes the roster twice in
//! quick succession at encounter start, so a second formation inside the
//! rewrite window replaces the first instead of adding to it.

use log::debug;

use crate::catalog::Catalog;
use crate::domain::{Duration, Timestamp};
use crate::session::{EntryKind, RunState, SessionEvent};

/// Two formation writes closer than this belong to the same encounter setup.
pub const FORMATION_REWRITE_WINDOW: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Default)]
pub struct FormationLog {
    last_roster: Option<Vec<u8>>,
    last_entry_at: Option<Timestamp>,
}

/// Forget the previous encounter's roster.
pub fn on_encounter_start(log: &mut FormationLog) {
    *log = FormationLog::default();
}

/// Log the roster if it changed since the last tick.
pub fn on_encounter_tick(
    state: &mut RunState,
    catalog: &Catalog,
    roster: &[u8],
    now: Timestamp,
    events: &mut Vec<SessionEvent>,
) {
    if state.formation.last_roster.as_deref() == Some(roster) {
        return;
    }
    state.formation.last_roster = Some(roster.to_vec());

    let names: Vec<String> = roster.iter().filter_map(|&id| catalog.entity_name(id)).collect();
    if names.is_empty() {
        return;
    }

    if within_rewrite_window(&state.formation, now) {
        retract_last(state, events);
    }

    let at = state.elapsed_at(now);
    let entry = state.timeline.append(EntryKind::Formation, names.join(", "), at).clone();
    state.formation.last_entry_at = Some(now);
    events.push(SessionEvent::EntryAppended(entry));
}

/// Apply the cleanup rule when the encounter timer stops.
///
/// A formation logged only moments before the stop is a spurious write and
/// is dropped, even if it was the only one the encounter logged.
pub fn on_encounter_stop(state: &mut RunState, now: Timestamp, events: &mut Vec<SessionEvent>) {
    if within_rewrite_window(&state.formation, now) {
        retract_last(state, events);
    }
    state.formation.last_entry_at = None;
}

fn within_rewrite_window(log: &FormationLog, now: Timestamp) -> bool {
    log.last_entry_at.is_some_and(|last| {
        let gap = now.since(last);
        gap > Duration::ZERO && gap < FORMATION_REWRITE_WINDOW
    })
}

fn retract_last(state: &mut RunState, events: &mut Vec<SessionEvent>) {
    if let Some(removed) = state.timeline.retract_tail(&[EntryKind::Formation]) {
        debug!("Retracted duplicate formation: {}", removed[0].label);
        events.push(SessionEvent::EntriesRetracted(removed));
    }
}
