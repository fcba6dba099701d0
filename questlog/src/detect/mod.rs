//! Edge detectors
//!
//! Every detector is a set of free functions over `&mut RunState`. They never
//! read a clock, never perform I/O and never fail: a missing signal means the
//! detector skips the tick. [`crate::session::Session`] calls them in a fixed
//! order.

pub mod formation;
pub mod guards;
pub mod ledger;
pub mod location;
pub mod milestones;
pub mod reset;
pub mod timers;

pub use formation::FORMATION_REWRITE_WINDOW;
pub use guards::{ENCOUNTER_AFTERGLOW, FRAME_STEP_MAX};
pub use ledger::SAVE_MENU_SUBSTATES;
pub use milestones::MilestoneState;
pub use reset::FINISH_SCRIPT_DELAY;
