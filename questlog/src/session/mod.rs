//! Session state and lifecycle
//!
//! [`Session`] owns one [`RunState`] and runs the detectors against it once
//! per tick, returning the [`SessionEvent`]s the tick produced.

pub mod engine;
pub mod events;
pub mod state;
pub mod timeline;

pub use engine::{Session, SessionSnapshot};
pub use events::SessionEvent;
pub use state::{Activity, ActivityTotals, RunState, SessionStatus, Shadow, Totals};
pub use timeline::{EntryKind, Timeline, TimelineEntry, MAX_RETRACTION};
