//! Milestone tracker.
//!
//! Each milestone is `NotObserved`, `Peeked` or `Completed`, and only ever
//! moves forward. Completion is the milestone's own bit. Peeking is weaker
//! evidence: a separate peek bit, a visit to a given location, or a one-shot
//! latch set by a positional or dialog probe. Latches never clear.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use log::info;

use crate::catalog::{Catalog, MilestoneDef, PeekProbe};
use crate::domain::BitOffset;
use crate::sampling::{DialogState, SlowSample};
use crate::session::{RunState, SessionEvent};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneState {
    #[default]
    NotObserved,
    Peeked,
    Completed,
}

/// Per-milestone state, keyed by completion bit
#[derive(Debug, Clone, Default)]
pub struct MilestoneBook {
    states: BTreeMap<BitOffset, MilestoneState>,
    latches: BTreeSet<BitOffset>,
}

impl MilestoneBook {
    #[must_use]
    pub fn state(&self, bit: BitOffset) -> MilestoneState {
        self.states.get(&bit).copied().unwrap_or_default()
    }

    /// Move a milestone to `to` if that is forward. Returns whether it moved.
    pub fn advance(&mut self, bit: BitOffset, to: MilestoneState) -> bool {
        let current = self.states.entry(bit).or_default();
        if to > *current {
            *current = to;
            true
        } else {
            false
        }
    }

    /// Set a probe latch. Returns `true` the first time only.
    pub fn latch(&mut self, bit: BitOffset) -> bool {
        self.latches.insert(bit)
    }

    #[must_use]
    pub fn is_latched(&self, bit: BitOffset) -> bool {
        self.latches.contains(&bit)
    }

    pub fn completed(&self) -> impl Iterator<Item = BitOffset> + '_ {
        self.with_state(MilestoneState::Completed)
    }

    /// Peeked but not completed
    pub fn peeked_only(&self) -> impl Iterator<Item = BitOffset> + '_ {
        self.with_state(MilestoneState::Peeked)
    }

    fn with_state(&self, wanted: MilestoneState) -> impl Iterator<Item = BitOffset> + '_ {
        self.states.iter().filter(move |(_, s)| **s == wanted).map(|(bit, _)| *bit)
    }
}

/// Fast-cadence dialog probe: fires when the dialog index changes to a probe's
/// index while a choice is pending.
pub fn on_dialog_tick(
    state: &mut RunState,
    catalog: &Catalog,
    dialog: Option<DialogState>,
    events: &mut Vec<SessionEvent>,
) {
    let (Some(previous), Some(current)) = (state.shadow.dialog, dialog) else {
        return;
    };
    if !current.choice_pending || previous.index == current.index {
        return;
    }

    for def in catalog.milestones() {
        if def.peek_probe == Some(PeekProbe::Dialog { index: current.index })
            && state.milestones.latch(def.bit)
        {
            promote(state, def, MilestoneState::Peeked, events);
        }
    }
}

/// Slow-cadence evaluation against the bitfield and auxiliary conditions.
pub fn on_slow_tick(
    state: &mut RunState,
    catalog: &Catalog,
    slow: &SlowSample,
    events: &mut Vec<SessionEvent>,
) {
    let location = slow.location.or(state.last_location);

    for def in catalog.milestones() {
        if let (Some(probe), Some(location), Some(position)) = (def.peek_probe, location, slow.position) {
            if probe.matches_position(location, position) {
                state.milestones.latch(def.bit);
            }
        }

        let bits = slow.milestone_bits.as_deref();
        let completed = bits.is_some_and(|b| def.bit.is_set_in(b));
        let peeked = def.peek_bit.zip(bits).is_some_and(|(bit, b)| bit.is_set_in(b))
            || def.peek_location.is_some_and(|id| state.visited.contains(&id))
            || state.milestones.is_latched(def.bit);

        let target = if completed {
            MilestoneState::Completed
        } else if peeked {
            MilestoneState::Peeked
        } else {
            continue;
        };
        promote(state, def, target, events);
    }
}

fn promote(
    state: &mut RunState,
    def: &MilestoneDef,
    to: MilestoneState,
    events: &mut Vec<SessionEvent>,
) {
    if !state.milestones.advance(def.bit, to) {
        return;
    }
    let name = def.name.clone();
    info!("Milestone {} {name}", if to == MilestoneState::Completed { "completed" } else { "peeked" });
    events.push(match to {
        MilestoneState::Completed => SessionEvent::MilestoneCompleted { name },
        _ => SessionEvent::MilestonePeeked { name },
    });
}
