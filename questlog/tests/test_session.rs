use questlog::catalog::{ActivityCode, Catalog};
use questlog::detect::{MilestoneState, FINISH_SCRIPT_DELAY};
use questlog::domain::{BitOffset, Duration, LocationId, Timestamp};
use questlog::sampling::{FastSample, Sample, SlowSample, TerminalSignals};
use questlog::session::{Activity, EntryKind, Session, SessionEvent};
use questlog_common::{ENDING_FLAG_SET, ENDING_SCREEN};

fn catalog() -> Catalog {
    Catalog::from_json_str(include_str!("fixtures/catalog.json")).expect("fixture catalog")
}

/// Builds samples with a frame counter that advances by one per tick
struct Script {
    frame: u8,
}

impl Script {
    fn new() -> Self {
        Self { frame: 0 }
    }

    fn fast(&mut self, activity: ActivityCode) -> Sample {
        self.frame = self.frame.wrapping_add(1);
        Sample {
            fast: FastSample {
                activity: Some(activity),
                frame_counter: Some(self.frame),
                transport_sprite: Some(0),
                ..FastSample::default()
            },
            slow: None,
        }
    }

    fn slow(&mut self, activity: ActivityCode, slow: SlowSample) -> Sample {
        let mut sample = self.fast(activity);
        sample.slow = Some(slow);
        sample
    }
}

fn at_location(id: u16) -> SlowSample {
    SlowSample { location: Some(LocationId(id)), ..SlowSample::default() }
}

fn secs(s: u64) -> Timestamp {
    Timestamp(s * 1000)
}

#[test]
fn test_menu_edge_correctness() {
    let catalog = catalog();
    let mut session = Session::new(Timestamp(0));
    let mut script = Script::new();
    let codes = [
        ActivityCode::Field,
        ActivityCode::Field,
        ActivityCode::Menu,
        ActivityCode::Menu,
        ActivityCode::Field,
    ];
    for (code, at) in codes.into_iter().zip([0, 1, 2, 5, 9]) {
        session.on_tick(&catalog, &script.fast(code), secs(at));
    }

    let totals = session.state().totals.get(Activity::Menu);
    assert_eq!(totals.elapsed, Duration::from_secs(7));
    assert_eq!(totals.count, 1);
}

#[test]
fn test_encounter_closes_transport() {
    let catalog = catalog();
    let mut session = Session::new(Timestamp(0));
    let mut script = Script::new();

    let mut boarding = script.fast(ActivityCode::Field);
    boarding.fast.transport_sprite = Some(32);
    session.on_tick(&catalog, &boarding, secs(1));

    let mut fight = script.fast(ActivityCode::Encounter);
    fight.fast.transport_sprite = Some(32);
    let events = session.on_tick(&catalog, &fight, secs(3));
    assert!(events.contains(&SessionEvent::TimerStopped {
        activity: Activity::Transport,
        elapsed: Duration::from_secs(2),
        interrupted: true,
    }));

    for at in 4..10 {
        let mut fight = script.fast(ActivityCode::Encounter);
        fight.fast.transport_sprite = Some(32);
        session.on_tick(&catalog, &fight, secs(at));
    }
    let state = session.state();
    assert!(!state.transport.is_active());
    assert!(state.encounter.is_active());
    assert_eq!(state.totals.transport.elapsed, Duration::from_secs(2));
}

#[test]
fn test_formation_rewrite_collapses_to_one_entry() {
    let catalog = catalog();
    let mut session = Session::new(Timestamp(0));
    let mut script = Script::new();

    session.on_tick(&catalog, &script.fast(ActivityCode::Field), Timestamp(0));

    let mut first = script.fast(ActivityCode::Encounter);
    first.fast.roster = Some(vec![1, 1, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    session.on_tick(&catalog, &first, Timestamp(1_000));
    // Identical roster again: nothing new
    let mut same = script.fast(ActivityCode::Encounter);
    same.fast.roster = first.fast.roster.clone();
    session.on_tick(&catalog, &same, Timestamp(1_100));

    let mut second = script.fast(ActivityCode::Encounter);
    second.fast.roster = Some(vec![2, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    session.on_tick(&catalog, &second, Timestamp(1_200));

    session.on_tick(&catalog, &script.fast(ActivityCode::Field), Timestamp(6_000));

    let formations: Vec<&str> = session
        .state()
        .timeline
        .entries()
        .iter()
        .filter(|e| e.kind == EntryKind::Formation)
        .map(|e| e.label.as_str())
        .collect();
    assert_eq!(formations, ["Wolf"]);
}

#[test]
fn test_milestones_never_regress() {
    let catalog = catalog();
    let mut session = Session::new(Timestamp(0));
    let mut script = Script::new();
    let crown = BitOffset(8);

    let mut bits = vec![0u8; 64];
    let snapshots: [u8; 4] = [0x02, 0x03, 0x00, 0x02];
    for (i, byte) in snapshots.into_iter().enumerate() {
        bits[1] = byte;
        let slow = SlowSample { milestone_bits: Some(bits.clone()), ..SlowSample::default() };
        session.on_tick(&catalog, &script.slow(ActivityCode::Field, slow), secs(i as u64));
        let expected =
            if i == 0 { MilestoneState::Peeked } else { MilestoneState::Completed };
        assert_eq!(session.state().milestones.state(crown), expected);
    }
}

#[test]
fn test_currency_accounting() {
    let catalog = catalog();
    let mut session = Session::new(Timestamp(0));
    let mut script = Script::new();
    for (i, value) in [1000, 800, 800, 1200].into_iter().enumerate() {
        let slow = SlowSample {
            location: Some(LocationId(1)),
            currency: Some(value),
            ..SlowSample::default()
        };
        session.on_tick(&catalog, &script.slow(ActivityCode::Field, slow), secs(i as u64));
    }
    let ledger = session.state().ledger;
    assert_eq!(ledger.spent, 200);
    assert_eq!(ledger.earned, 400);
    assert_eq!(ledger.previous, Some(1200));
}

#[test]
fn test_reset_cancelled_by_menu_follow_up() {
    let catalog = catalog();
    let mut session = Session::new(Timestamp(0));
    let mut script = Script::new();

    session.on_tick(&catalog, &script.slow(ActivityCode::Field, at_location(1)), secs(0));
    session.on_tick(&catalog, &script.slow(ActivityCode::Field, at_location(0)), secs(1));
    assert_eq!(session.state().timeline.len(), 3);
    assert!(session.state().reset.is_pending());

    // Warp item: menu is still up on the follow-up tick
    let events = session.on_tick(&catalog, &script.slow(ActivityCode::Menu, at_location(0)), secs(2));
    assert!(events.iter().any(|e| matches!(e, SessionEvent::EntriesRetracted(r) if r.len() == 2)));
    assert_eq!(session.state().timeline.len(), 1);
    assert!(!session.state().reset.is_pending());
}

#[test]
fn test_reset_confirmed_by_title_follow_up() {
    let catalog = catalog();
    let mut session = Session::new(Timestamp(0));
    let mut script = Script::new();

    session.on_tick(&catalog, &script.slow(ActivityCode::Field, at_location(1)), secs(0));
    session.on_tick(&catalog, &script.slow(ActivityCode::Field, at_location(0)), secs(1));
    let events = session.on_tick(&catalog, &script.slow(ActivityCode::Title, at_location(0)), secs(2));

    assert!(events.contains(&SessionEvent::ResetConfirmed));
    assert_eq!(session.state().timeline.len(), 3);
    assert_eq!(session.state().timeline.last().map(|e| e.kind), Some(EntryKind::Reset));
    assert!(!session.state().reset.is_pending());
    assert_eq!(session.state().reset.confirmed(), 1);
}

#[test]
fn test_terminal_offset_and_freeze() {
    let catalog = catalog();
    let start = secs(10);
    let mut session = Session::new(start);
    let mut script = Script::new();

    session.on_tick(&catalog, &script.slow(ActivityCode::Field, at_location(1)), secs(10));
    session.on_tick(&catalog, &script.fast(ActivityCode::Menu), secs(20));

    let mut end = script.fast(ActivityCode::Menu);
    end.fast.terminal =
        Some(TerminalSignals { ending_flag: ENDING_FLAG_SET, screen_state: ENDING_SCREEN });
    let events = session.on_tick(&catalog, &end, secs(100));

    let expected = Duration::from_secs(90).saturating_sub(FINISH_SCRIPT_DELAY);
    assert!(events.contains(&SessionEvent::Finished { final_elapsed: expected }));
    assert_eq!(session.state().total_elapsed(), expected);
    // Open menu closed out at the finish
    assert_eq!(session.state().totals.menu.elapsed, Duration::from_secs(80));

    let len = session.state().timeline.len();
    let totals = session.state().totals;
    for at in 101..110 {
        let events = session.on_tick(&catalog, &script.slow(ActivityCode::Field, at_location(2)), secs(at));
        assert!(events.is_empty());
    }
    assert_eq!(session.state().timeline.len(), len);
    assert_eq!(session.state().totals, totals);
}

#[test]
fn test_boarding_inside_afterglow_is_not_a_use() {
    let catalog = catalog();
    let mut session = Session::new(Timestamp(0));
    let mut script = Script::new();

    session.on_tick(&catalog, &script.fast(ActivityCode::Field), Timestamp(0));
    session.on_tick(&catalog, &script.fast(ActivityCode::Encounter), Timestamp(1_000));
    session.on_tick(&catalog, &script.fast(ActivityCode::Field), Timestamp(3_000));
    assert!(!session.state().encounter.is_active());

    for at in [3_500, 4_000, 4_400] {
        let mut boarding = script.fast(ActivityCode::Field);
        boarding.fast.transport_sprite = Some(32);
        let events = session.on_tick(&catalog, &boarding, Timestamp(at));
        assert!(!events.iter().any(|e| matches!(e, SessionEvent::TimerStarted { .. })));
    }

    let state = session.state();
    assert!(!state.transport.is_active());
    assert_eq!(state.totals.transport.count, 0);
    assert_eq!(state.totals.transport.elapsed, Duration::ZERO);
}

#[test]
fn test_reset_location_ignored_while_menu_open() {
    let catalog = catalog();
    let mut session = Session::new(Timestamp(0));
    let mut script = Script::new();

    session.on_tick(&catalog, &script.slow(ActivityCode::Field, at_location(1)), secs(0));
    session.on_tick(&catalog, &script.fast(ActivityCode::Menu), secs(1));
    assert!(session.state().menu.is_active());

    let events = session.on_tick(&catalog, &script.slow(ActivityCode::Menu, at_location(0)), secs(2));
    assert!(events.is_empty());
    assert_eq!(session.state().timeline.len(), 1);
    assert!(!session.state().reset.is_pending());

    session.on_tick(&catalog, &script.slow(ActivityCode::Field, at_location(1)), secs(3));
    assert_eq!(session.state().timeline.len(), 1);
    assert_eq!(session.state().reset.confirmed(), 0);
}

#[test]
fn test_finish_entry_matches_reported_total() {
    let catalog = catalog();
    let mut session = Session::new(Timestamp(0));
    let mut script = Script::new();

    session.on_tick(&catalog, &script.slow(ActivityCode::Field, at_location(1)), secs(0));
    session.on_tick(&catalog, &script.slow(ActivityCode::Field, at_location(2)), secs(95));
    let mut end = script.fast(ActivityCode::Field);
    end.fast.terminal =
        Some(TerminalSignals { ending_flag: ENDING_FLAG_SET, screen_state: ENDING_SCREEN });
    session.on_tick(&catalog, &end, secs(100));

    let total = session.state().total_elapsed();
    assert_eq!(total, Duration(100_000 - 8_250));
    let last = session.state().timeline.last().expect("finish entry");
    assert_eq!(last.kind, EntryKind::Finish);
    assert_eq!(last.at, total);
}
