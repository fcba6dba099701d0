//! Per-tick detector pipeline and session lifecycle.

use log::{trace, warn};

use super::events::SessionEvent;
use super::state::{Activity, RunState};
use crate::catalog::Catalog;
use crate::detect::{formation, ledger, location, milestones, reset, timers};
use crate::domain::{Duration, FinalizeError, LocationId, SourceError, Timestamp};
use crate::export::RunSummary;
use crate::sampling::{FastSample, Sample, SlowSample};

/// Per-tick debug view of a running session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub elapsed: Duration,
    pub active: Vec<Activity>,
    pub last_location: Option<LocationId>,
    pub timeline_len: usize,
    pub reset_pending: bool,
    pub currency_spent: u64,
    pub currency_earned: u64,
}

/// One tracked session, from start to finish or abandonment.
pub struct Session {
    state: RunState,
}

impl Session {
    #[must_use]
    pub fn new(started_at: Timestamp) -> Self {
        Self { state: RunState::new(started_at) }
    }

    /// Run every detector against one sample, in order.
    ///
    /// Fast-cadence detectors run first (encounter, formation, transport,
    /// menu, dialog probe), then the terminal check, then the slow-cadence
    /// detectors if the sample carries a slow block (reset follow-up,
    /// location, currency, milestones). Once finished, ticks are ignored.
    ///
    /// A [`SessionEvent::SeedChanged`] in the result means the session no
    /// longer describes the running game and should be abandoned.
    pub fn on_tick(&mut self, catalog: &Catalog, sample: &Sample, now: Timestamp) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.state.is_finished() {
            return events;
        }
        let state = &mut self.state;
        state.last_tick = now;

        if let Some(seed) = sample.slow.as_ref().and_then(|slow| slow.seed) {
            match state.seed {
                None => state.seed = Some(seed),
                Some(previous) if previous != seed => {
                    warn!("Seed changed from {previous:08x} to {seed:08x}");
                    events.push(SessionEvent::SeedChanged { previous, current: seed });
                    return events;
                }
                Some(_) => {}
            }
        }

        let fast = &sample.fast;
        timers::on_encounter_tick(state, fast, now, &mut events);
        if state.encounter.is_active() {
            if let Some(roster) = &fast.roster {
                formation::on_encounter_tick(state, catalog, roster, now, &mut events);
            }
        }
        timers::on_transport_tick(state, catalog, fast, now, &mut events);
        timers::on_menu_tick(state, catalog, fast, now, &mut events);
        milestones::on_dialog_tick(state, catalog, fast.dialog, &mut events);

        if fast.frame_counter.is_some() {
            state.shadow.frame_counter = fast.frame_counter;
        }
        if fast.dialog.is_some() {
            state.shadow.dialog = fast.dialog;
        }

        if reset::check_terminal(state, fast, now, &mut events) {
            return events;
        }

        if let Some(slow) = &sample.slow {
            reset::on_slow_tick(state, fast, &mut events);
            if let Some(id) = slow.location {
                location::on_tick(state, catalog, id, now, &mut events);
            }
            if let Some(currency) = slow.currency {
                ledger::on_tick(state, catalog, fast, slow.location, currency);
            }
            milestones::on_slow_tick(state, catalog, slow, &mut events);
            if slow.inventory.is_some() {
                state.inventory.clone_from(&slow.inventory);
            }
        }

        trace!("{:?}", self.snapshot());
        events
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = &self.state;
        let mut active = Vec::new();
        if state.menu.is_active() {
            active.push(state.menu_kind);
        }
        if state.encounter.is_active() {
            active.push(Activity::Encounter);
        }
        if state.transport.is_active() {
            active.push(Activity::Transport);
        }
        SessionSnapshot {
            elapsed: state.elapsed_at(state.last_tick),
            active,
            last_location: state.last_location,
            timeline_len: state.timeline.len(),
            reset_pending: state.reset.is_pending(),
            currency_spent: state.ledger.spent,
            currency_earned: state.ledger.earned,
        }
    }

    /// Fold in the end-of-session slow read and build the report.
    ///
    /// The final read only feeds milestones, currency and inventory; the
    /// timeline and timers are already frozen.
    ///
    /// # Errors
    /// [`FinalizeError::NotFinished`] if the terminal condition was never
    /// seen, [`FinalizeError::FinalReadFailed`] if the final read failed.
    /// Either way the session is left intact for [`Session::summary`].
    pub fn finalize(
        &mut self,
        catalog: &Catalog,
        final_read: Result<SlowSample, SourceError>,
    ) -> Result<RunSummary, FinalizeError> {
        if !self.state.is_finished() {
            return Err(FinalizeError::NotFinished);
        }
        let slow = final_read?;

        let state = &mut self.state;
        let mut events = Vec::new();
        if let Some(currency) = slow.currency {
            ledger::on_tick(state, catalog, &FastSample::default(), slow.location, currency);
        }
        milestones::on_slow_tick(state, catalog, &slow, &mut events);
        if slow.inventory.is_some() {
            state.inventory = slow.inventory;
        }
        for event in &events {
            trace!("final read: {event}");
        }

        Ok(RunSummary::from_state(&self.state, catalog))
    }

    /// Report of the session as it stands, finished or not.
    #[must_use]
    pub fn summary(&self, catalog: &Catalog) -> RunSummary {
        RunSummary::from_state(&self.state, catalog)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    #[must_use]
    pub fn state(&self) -> &RunState {
        &self.state
    }
}
