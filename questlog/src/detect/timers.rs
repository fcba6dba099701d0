//! Activity timers: encounter, transport, menu/shop.
//!
//! All three are edge detectors over the current sample and the shadow copies
//! in [`RunState`]. They run every tick in priority order (encounter first) so
//! an encounter starting can close out the transport timer at the same
//! instant.
//!
//! - **Encounter**: active while the activity code says encounter. The rising
//!   edge also needs the frame counter to have advanced by a small step.
//! - **Transport**: active while the map sprite is a transport sprite. Starts
//!   are suppressed during an encounter and for a quiet window after one. An
//!   encounter forcibly stops it; if the player is still aboard after the
//!   window, it resumes without counting a new use.
//! - **Menu/shop**: one timer, active while the activity code says menu. The
//!   menu screen at the rising edge decides whether the time is shop time.

use super::guards::{
    counter_advanced, not_preempted, quiet_elapsed, ENCOUNTER_AFTERGLOW, FRAME_STEP_MAX,
};
use super::formation;
use crate::catalog::{ActivityCode, Catalog};
use crate::domain::{Duration, Timestamp};
use crate::sampling::FastSample;
use crate::session::{Activity, RunState, SessionEvent};

/// Start/stop bookkeeping for one timer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    started_at: Option<Timestamp>,
    last_stop: Option<Timestamp>,
}

impl Timer {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    #[must_use]
    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    #[must_use]
    pub fn last_stop(&self) -> Option<Timestamp> {
        self.last_stop
    }

    pub fn start(&mut self, now: Timestamp) {
        self.started_at = Some(now);
    }

    /// Stop the timer, returning how long it ran. `None` if it was not active.
    pub fn stop(&mut self, now: Timestamp) -> Option<Duration> {
        let started = self.started_at.take()?;
        self.last_stop = Some(now);
        Some(now.since(started))
    }
}

pub fn on_encounter_tick(
    state: &mut RunState,
    fast: &FastSample,
    now: Timestamp,
    events: &mut Vec<SessionEvent>,
) {
    let Some(activity) = fast.activity else {
        return;
    };

    if state.encounter.is_active() {
        if activity != ActivityCode::Encounter {
            close(state, Activity::Encounter, now, false, events);
            formation::on_encounter_stop(state, now, events);
        }
        return;
    }

    if activity == ActivityCode::Encounter
        && counter_advanced(state.shadow.frame_counter, fast.frame_counter, FRAME_STEP_MAX)
    {
        if state.transport.is_active() {
            close(state, Activity::Transport, now, true, events);
            state.transport_interrupted = true;
        }
        state.encounter.start(now);
        state.totals.encounter.count += 1;
        formation::on_encounter_start(&mut state.formation);
        events.push(SessionEvent::TimerStarted {
            activity: Activity::Encounter,
            at: state.elapsed_at(now),
            resumed: false,
        });
    }
}

pub fn on_transport_tick(
    state: &mut RunState,
    catalog: &Catalog,
    fast: &FastSample,
    now: Timestamp,
    events: &mut Vec<SessionEvent>,
) {
    let Some(sprite) = fast.transport_sprite else {
        return;
    };
    let aboard = catalog.is_transport_sprite(sprite);

    if state.transport.is_active() {
        if !aboard {
            close(state, Activity::Transport, now, false, events);
        }
        return;
    }

    if !aboard {
        state.transport_interrupted = false;
        return;
    }

    if not_preempted(&state.encounter)
        && quiet_elapsed(state.encounter.last_stop(), now, ENCOUNTER_AFTERGLOW)
    {
        let resumed = state.transport_interrupted;
        state.transport_interrupted = false;
        state.transport.start(now);
        if !resumed {
            state.totals.transport.count += 1;
        }
        events.push(SessionEvent::TimerStarted {
            activity: Activity::Transport,
            at: state.elapsed_at(now),
            resumed,
        });
    }
}

pub fn on_menu_tick(
    state: &mut RunState,
    catalog: &Catalog,
    fast: &FastSample,
    now: Timestamp,
    events: &mut Vec<SessionEvent>,
) {
    let Some(activity) = fast.activity else {
        return;
    };

    if state.menu.is_active() {
        if activity != ActivityCode::Menu {
            let kind = state.menu_kind;
            close(state, kind, now, false, events);
        }
        return;
    }

    if activity == ActivityCode::Menu
        && not_preempted(&state.encounter)
        && quiet_elapsed(state.encounter.last_stop(), now, ENCOUNTER_AFTERGLOW)
    {
        let kind = if fast.menu_screen.is_some_and(|screen| catalog.is_shop_screen(screen)) {
            Activity::Shop
        } else {
            Activity::Menu
        };
        state.menu.start(now);
        state.menu_kind = kind;
        state.totals.get_mut(kind).count += 1;
        events.push(SessionEvent::TimerStarted {
            activity: kind,
            at: state.elapsed_at(now),
            resumed: false,
        });
    }
}

/// Stop every running timer at `now` (used when the session finishes).
pub fn close_all(state: &mut RunState, now: Timestamp, events: &mut Vec<SessionEvent>) {
    if state.encounter.is_active() {
        close(state, Activity::Encounter, now, false, events);
    }
    if state.transport.is_active() {
        close(state, Activity::Transport, now, false, events);
    }
    if state.menu.is_active() {
        let kind = state.menu_kind;
        close(state, kind, now, false, events);
    }
}

fn close(
    state: &mut RunState,
    activity: Activity,
    now: Timestamp,
    interrupted: bool,
    events: &mut Vec<SessionEvent>,
) {
    let timer = match activity {
        Activity::Menu | Activity::Shop => &mut state.menu,
        Activity::Encounter => &mut state.encounter,
        Activity::Transport => &mut state.transport,
    };
    if let Some(elapsed) = timer.stop(now) {
        state.totals.get_mut(activity).elapsed += elapsed;
        events.push(SessionEvent::TimerStopped { activity, elapsed, interrupted });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ActivityTotals;

    fn catalog() -> Catalog {
        Catalog::from_json_str(include_str!("../../tests/fixtures/catalog.json")).unwrap()
    }

    fn fast(activity: ActivityCode, frame: u8) -> FastSample {
        FastSample { activity: Some(activity), frame_counter: Some(frame), ..FastSample::default() }
    }

    /// Run the three timers the way a session tick does, then update shadows.
    fn tick(state: &mut RunState, catalog: &Catalog, sample: &FastSample, now: Timestamp) {
        let mut events = Vec::new();
        on_encounter_tick(state, sample, now, &mut events);
        on_transport_tick(state, catalog, sample, now, &mut events);
        on_menu_tick(state, catalog, sample, now, &mut events);
        if sample.frame_counter.is_some() {
            state.shadow.frame_counter = sample.frame_counter;
        }
    }

    #[test]
    fn test_timer_stop_reports_elapsed() {
        let mut timer = Timer::default();
        assert_eq!(timer.stop(Timestamp(5)), None);
        timer.start(Timestamp(2_000));
        assert_eq!(timer.stop(Timestamp(9_000)), Some(Duration(7_000)));
        assert_eq!(timer.last_stop(), Some(Timestamp(9_000)));
        assert!(!timer.is_active());
    }

    #[test]
    fn test_menu_edges_accumulate() {
        let catalog = catalog();
        let mut state = RunState::new(Timestamp(0));
        let codes = [
            ActivityCode::Field,
            ActivityCode::Field,
            ActivityCode::Menu,
            ActivityCode::Menu,
            ActivityCode::Field,
        ];
        for (i, (code, secs)) in codes.iter().zip([0, 1, 2, 5, 9]).enumerate() {
            let frame = u8::try_from(i).unwrap();
            tick(&mut state, &catalog, &fast(*code, frame), Timestamp(secs * 1000));
        }
        assert_eq!(state.totals.menu.elapsed, Duration::from_secs(7));
        assert_eq!(state.totals.menu.count, 1);
        assert_eq!(state.totals.shop.count, 0);
    }

    #[test]
    fn test_shop_screen_feeds_shop_totals() {
        let catalog = catalog();
        let mut state = RunState::new(Timestamp(0));
        let mut open = fast(ActivityCode::Menu, 1);
        open.menu_screen = Some(4);
        tick(&mut state, &catalog, &open, Timestamp(1_000));
        tick(&mut state, &catalog, &fast(ActivityCode::Field, 2), Timestamp(4_000));

        assert_eq!(state.totals.shop, ActivityTotals { elapsed: Duration(3_000), count: 1 });
        assert_eq!(state.totals.menu, ActivityTotals::default());
    }

    #[test]
    fn test_encounter_needs_frame_counter_step() {
        let catalog = catalog();
        let mut state = RunState::new(Timestamp(0));
        tick(&mut state, &catalog, &fast(ActivityCode::Field, 100), Timestamp(0));
        // Counter frozen: host paused or loading a state
        tick(&mut state, &catalog, &fast(ActivityCode::Encounter, 100), Timestamp(50));
        assert!(!state.encounter.is_active());
        // Counter jumped: reload
        tick(&mut state, &catalog, &fast(ActivityCode::Encounter, 200), Timestamp(100));
        assert!(!state.encounter.is_active());
        tick(&mut state, &catalog, &fast(ActivityCode::Encounter, 203), Timestamp(150));
        assert!(state.encounter.is_active());
        assert_eq!(state.totals.encounter.count, 1);
    }

    #[test]
    fn test_menu_suppressed_right_after_encounter() {
        let catalog = catalog();
        let mut state = RunState::new(Timestamp(0));
        tick(&mut state, &catalog, &fast(ActivityCode::Field, 1), Timestamp(0));
        tick(&mut state, &catalog, &fast(ActivityCode::Encounter, 2), Timestamp(100));
        tick(&mut state, &catalog, &fast(ActivityCode::Menu, 3), Timestamp(5_000));
        assert!(!state.encounter.is_active());
        assert!(!state.menu.is_active());

        tick(&mut state, &catalog, &fast(ActivityCode::Menu, 4), Timestamp(6_500));
        assert!(state.menu.is_active());
        assert_eq!(state.menu.started_at(), Some(Timestamp(6_500)));
    }

    #[test]
    fn test_encounter_interrupts_transport() {
        let catalog = catalog();
        let mut state = RunState::new(Timestamp(0));
        let mut aboard = fast(ActivityCode::Field, 1);
        aboard.transport_sprite = Some(32);

        tick(&mut state, &catalog, &aboard, Timestamp(1_000));
        assert!(state.transport.is_active());

        let mut fight = fast(ActivityCode::Encounter, 2);
        fight.transport_sprite = Some(32);
        tick(&mut state, &catalog, &fight, Timestamp(4_000));
        assert!(!state.transport.is_active());
        assert_eq!(state.totals.transport.elapsed, Duration(3_000));

        fight.frame_counter = Some(3);
        tick(&mut state, &catalog, &fight, Timestamp(8_000));
        assert_eq!(state.totals.transport.elapsed, Duration(3_000));

        // Encounter over, still aboard: resumes after the quiet window, same use
        aboard.frame_counter = Some(4);
        tick(&mut state, &catalog, &aboard, Timestamp(9_000));
        assert!(!state.transport.is_active());
        aboard.frame_counter = Some(5);
        tick(&mut state, &catalog, &aboard, Timestamp(10_500));
        assert!(state.transport.is_active());
        assert_eq!(state.totals.transport.count, 1);
    }

    #[test]
    fn test_new_boarding_counts_new_use() {
        let catalog = catalog();
        let mut state = RunState::new(Timestamp(0));
        let mut sample = fast(ActivityCode::Field, 1);
        for (sprite, at) in [(32, 0), (1, 1_000), (32, 2_000), (1, 2_500)] {
            sample.transport_sprite = Some(sprite);
            tick(&mut state, &catalog, &sample, Timestamp(at));
        }
        assert_eq!(state.totals.transport, ActivityTotals { elapsed: Duration(1_500), count: 2 });
    }

    #[test]
    fn test_missing_activity_is_skipped() {
        let catalog = catalog();
        let mut state = RunState::new(Timestamp(0));
        tick(&mut state, &catalog, &fast(ActivityCode::Menu, 1), Timestamp(0));
        let blank = FastSample::default();
        tick(&mut state, &catalog, &blank, Timestamp(1_000));
        assert!(state.menu.is_active());
    }

    #[test]
    fn test_close_all_stops_everything() {
        let catalog = catalog();
        let mut state = RunState::new(Timestamp(0));
        let mut sample = fast(ActivityCode::Menu, 1);
        sample.transport_sprite = Some(32);
        tick(&mut state, &catalog, &sample, Timestamp(0));
        assert!(state.menu.is_active() && state.transport.is_active());

        let mut events = Vec::new();
        close_all(&mut state, Timestamp(2_000), &mut events);
        assert!(!state.menu.is_active() && !state.transport.is_active());
        assert_eq!(events.len(), 2);
        assert_eq!(state.totals.menu.elapsed, Duration(2_000));
    }
}
