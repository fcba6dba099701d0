//! Report export
//!
//! Turns a session's [`crate::session::RunState`] into a [`RunSummary`] and
//! writes it as JSON.

pub mod report;

pub use report::{ActivityReport, ChallengeReport, CurrencyReport, RunSummary};
