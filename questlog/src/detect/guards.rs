//! Edge guards.
//!
//! Each guard is a pure predicate. A timer accepts a rising edge only when
//! every guard that applies to it holds; a rejected edge is simply re-evaluated
//! on the next tick.
//!
//! | Timer     | `counter_advanced` | `quiet_elapsed` | `not_preempted` |
//! |-----------|--------------------|-----------------|-----------------|
//! | Encounter | frame counter      |                 |                 |
//! | Transport |                    | after encounter | by encounter    |
//! | Menu/shop |                    | after encounter | by encounter    |
//!
//! The thresholds are calibrated against sampled traces at a 50ms tick and
//! are expected to need retuning for other hosts or cadences.

use super::timers::Timer;
use crate::domain::{Duration, Timestamp};

/// Largest frame-counter step (frames) accepted between two ticks.
/// Zero means the host is paused or loading; bigger jumps mean a reload or reset.
pub const FRAME_STEP_MAX: u8 = 30;

/// Quiet window after an encounter stops before menu or transport may start.
/// The post-encounter screen reuses the menu code and redraws the map sprite.
pub const ENCOUNTER_AFTERGLOW: Duration = Duration::from_millis(1_500);

/// The raw counter moved forward by `1..=max_step` since the previous tick.
///
/// Wraparound is handled (255 -> 2 is a step of 3). Without a previous
/// reading there is no delta and the guard fails.
#[must_use]
pub fn counter_advanced(previous: Option<u8>, current: Option<u8>, max_step: u8) -> bool {
    match (previous, current) {
        (Some(prev), Some(cur)) => (1..=max_step).contains(&cur.wrapping_sub(prev)),
        _ => false,
    }
}

/// At least `window` has passed since the conflicting timer last stopped.
#[must_use]
pub fn quiet_elapsed(last_stop: Option<Timestamp>, now: Timestamp, window: Duration) -> bool {
    last_stop.map_or(true, |stop| now.since(stop) >= window)
}

/// The higher-priority timer is not running.
#[must_use]
pub fn not_preempted(higher_priority: &Timer) -> bool {
    !higher_priority.is_active()
}
