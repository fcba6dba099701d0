//! Sample data model
//!
//! A [`Sample`] is one immutable snapshot of the monitored signals at a tick.
//! Every field is optional: a read that came back with the wrong length leaves
//! its field `None`, and the detectors that depend on it skip that tick.

use questlog_common::{Position, ENDING_FLAG_SET, ENDING_SCREEN};
use serde::{Deserialize, Serialize};

use crate::catalog::ActivityCode;
use crate::domain::LocationId;

/// One tick's worth of signals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub fast: FastSample,
    /// Present only on slow-cadence ticks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slow: Option<SlowSample>,
}

impl Sample {
    #[must_use]
    pub fn is_slow(&self) -> bool {
        self.slow.is_some()
    }
}

/// Signals read every tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FastSample {
    pub activity: Option<ActivityCode>,
    pub menu_screen: Option<u8>,
    pub menu_substate: Option<u8>,
    pub frame_counter: Option<u8>,
    pub transport_sprite: Option<u8>,
    pub dialog: Option<DialogState>,
    /// Read only while an encounter is (or is becoming) active
    pub roster: Option<Vec<u8>>,
    pub terminal: Option<TerminalSignals>,
}

/// Signals read every Nth tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlowSample {
    pub location: Option<LocationId>,
    pub position: Option<Position>,
    pub currency: Option<u32>,
    pub milestone_bits: Option<Vec<u8>>,
    pub inventory: Option<Vec<u8>>,
    pub seed: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogState {
    pub index: u8,
    pub choice_pending: bool,
}

/// The two independent signals that together mark the end of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalSignals {
    pub ending_flag: u8,
    pub screen_state: u8,
}

impl TerminalSignals {
    /// Both signals at their fixed ending values in the same tick
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.ending_flag == ENDING_FLAG_SET && self.screen_state == ENDING_SCREEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_needs_both_signals() {
        let both = TerminalSignals { ending_flag: ENDING_FLAG_SET, screen_state: ENDING_SCREEN };
        assert!(both.is_terminal());
        assert!(!TerminalSignals { ending_flag: 0, ..both }.is_terminal());
        assert!(!TerminalSignals { screen_state: 0, ..both }.is_terminal());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let sample: Sample = serde_json::from_str(r#"{ "fast": { "activity": "menu" } }"#).unwrap();
        assert_eq!(sample.fast.activity, Some(ActivityCode::Menu));
        assert_eq!(sample.fast.frame_counter, None);
        assert!(!sample.is_slow());
    }
}
