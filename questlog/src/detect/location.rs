//! Location tracker.
//!
//! Appends a timeline entry whenever the location id differs from the last
//! one logged. The id glitches while a menu overlay redraws, so changes seen
//! with the menu timer active are ignored until it closes.

use super::reset;
use crate::catalog::Catalog;
use crate::domain::{LocationId, Timestamp};
use crate::session::{EntryKind, RunState, SessionEvent};

pub fn on_tick(
    state: &mut RunState,
    catalog: &Catalog,
    location: LocationId,
    now: Timestamp,
    events: &mut Vec<SessionEvent>,
) {
    state.visited.insert(location);

    let previous = state.last_location;
    if previous == Some(location) {
        return;
    }
    // First observation always lands
    if previous.is_some() && state.menu.is_active() {
        return;
    }

    state.last_location = Some(location);
    let at = state.elapsed_at(now);
    let entry = state.timeline.append(EntryKind::Location, catalog.location_name(location), at).clone();
    events.push(SessionEvent::EntryAppended(entry));

    if previous.is_some() && catalog.reset_location() == Some(location) {
        reset::on_location_entered(state, previous, now, events);
    }
}
