//! Run summary report
//!
//! Built from a [`RunState`] without mutating it and written as pretty JSON.
//! Times are given both human-readable (`H:MM:SS.cc`) and in milliseconds.

use serde::Serialize;
use std::io::Write;

use crate::catalog::Catalog;
use crate::detect::MilestoneState;
use crate::domain::{BitOffset, Duration, ExportError};
use crate::session::{Activity, RunState};

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub finished: bool,
    pub total_elapsed: String,
    pub total_elapsed_ms: u64,
    pub activities: Vec<ActivityReport>,
    pub currency: CurrencyReport,
    pub resets: u32,
    /// Each entry as `"<elapsed-time> <label>"`
    pub timeline: Vec<String>,
    pub completed: Vec<String>,
    /// Peeked but never completed
    pub peeked: Vec<String>,
    pub items_owned: Vec<String>,
    pub locations_visited: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge: Option<ChallengeReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityReport {
    pub activity: Activity,
    pub elapsed: String,
    pub elapsed_ms: u64,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CurrencyReport {
    pub spent: u64,
    pub earned: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChallengeReport {
    pub visited: bool,
    pub won: bool,
}

impl RunSummary {
    #[must_use]
    pub fn from_state(state: &RunState, catalog: &Catalog) -> Self {
        let total = state.total_elapsed();

        let activities = Activity::ALL
            .iter()
            .map(|&activity| {
                let totals = state.totals.get(activity);
                ActivityReport {
                    activity,
                    elapsed: totals.elapsed.to_string(),
                    elapsed_ms: totals.elapsed.as_millis(),
                    count: totals.count,
                }
            })
            .collect();

        let items_owned = state
            .inventory
            .iter()
            .flatten()
            .filter_map(|&id| catalog.item_name(id))
            .collect();

        let challenge = catalog.challenge().map(|def| ChallengeReport {
            visited: state.visited.contains(&def.location),
            won: state.milestones.state(def.won_bit) == MilestoneState::Completed,
        });

        Self {
            finished: state.is_finished(),
            total_elapsed: total.to_string(),
            total_elapsed_ms: total.as_millis(),
            activities,
            currency: CurrencyReport { spent: state.ledger.spent, earned: state.ledger.earned },
            resets: state.reset.confirmed(),
            timeline: state.timeline.entries().iter().map(ToString::to_string).collect(),
            completed: milestone_names(catalog, state.milestones.completed()),
            peeked: milestone_names(catalog, state.milestones.peeked_only()),
            items_owned,
            locations_visited: state.visited.len(),
            challenge,
        }
    }

    #[must_use]
    pub fn activity(&self, activity: Activity) -> Option<&ActivityReport> {
        self.activities.iter().find(|report| report.activity == activity)
    }

    #[must_use]
    pub fn total(&self) -> Duration {
        Duration::from_millis(self.total_elapsed_ms)
    }

    /// Write the report as pretty-printed JSON.
    ///
    /// # Errors
    /// Returns an error if serialization or the underlying write fails.
    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<(), ExportError> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

fn milestone_names(catalog: &Catalog, bits: impl Iterator<Item = BitOffset>) -> Vec<String> {
    bits.map(|bit| catalog.milestone_name(bit)).collect()
}
