//! Append-only session timeline.
//!
//! Entries are only ever added at the tail. The one exception is
//! [`Timeline::retract_tail`], a bounded removal of the last entries that
//! must name the kinds it expects to remove; it refuses to touch anything
//! else, so every retraction can be audited against the rule that asked for it.

use serde::Serialize;
use std::fmt;

use crate::domain::Duration;

/// Most entries any single cleanup rule may retract at once
pub const MAX_RETRACTION: usize = 2;

/// What produced a timeline entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Location,
    Formation,
    Reset,
    Finish,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    /// Elapsed time since session start
    pub at: Duration,
    pub label: String,
    pub kind: EntryKind,
}

/// Rendered as `"<elapsed-time> <label>"`
impl fmt::Display for TimelineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.at, self.label)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry at the tail.
    ///
    /// Entry times never go backwards: an `at` earlier than the current tail
    /// is raised to the tail's time.
    pub fn append(&mut self, kind: EntryKind, label: impl Into<String>, at: Duration) -> &TimelineEntry {
        let at = self.entries.last().map_or(at, |last| at.max(last.at));
        self.entries.push(TimelineEntry { at, label: label.into(), kind });
        &self.entries[self.entries.len() - 1]
    }

    /// Append the closing entry at exactly `at`.
    ///
    /// The finish time has the scripted ending subtracted, so it may sit
    /// before entries logged during the ending. It is kept as given so the
    /// last line agrees with the reported total.
    pub fn append_final(&mut self, kind: EntryKind, label: impl Into<String>, at: Duration) -> &TimelineEntry {
        self.entries.push(TimelineEntry { at, label: label.into(), kind });
        &self.entries[self.entries.len() - 1]
    }

    /// Remove the last `expected.len()` entries if their kinds match `expected`
    /// exactly (oldest first).
    ///
    /// Returns the removed entries, or `None` (and changes nothing) when the
    /// tail does not match or more than [`MAX_RETRACTION`] entries are asked for.
    pub fn retract_tail(&mut self, expected: &[EntryKind]) -> Option<Vec<TimelineEntry>> {
        if expected.is_empty() || expected.len() > MAX_RETRACTION || expected.len() > self.entries.len()
        {
            return None;
        }

        let start = self.entries.len() - expected.len();
        let tail_matches =
            self.entries[start..].iter().zip(expected).all(|(entry, kind)| entry.kind == *kind);
        if !tail_matches {
            return None;
        }

        Some(self.entries.split_off(start))
    }

    #[must_use]
    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    #[must_use]
    pub fn last(&self) -> Option<&TimelineEntry> {
        self.entries.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_display() {
        let mut timeline = Timeline::new();
        let entry = timeline.append(EntryKind::Location, "Castle", Duration(65_500));
        assert_eq!(entry.to_string(), "0:01:05.50 Castle");
    }

    #[test]
    fn test_append_never_goes_backwards() {
        let mut timeline = Timeline::new();
        timeline.append(EntryKind::Location, "Castle", Duration(5_000));
        let entry = timeline.append(EntryKind::Finish, "Finished", Duration(3_000));
        assert_eq!(entry.at, Duration(5_000));
    }

    #[test]
    fn test_final_entry_keeps_its_time() {
        let mut timeline = Timeline::new();
        timeline.append(EntryKind::Location, "Castle", Duration(95_000));
        let entry = timeline.append_final(EntryKind::Finish, "Finished", Duration(91_750));
        assert_eq!(entry.at, Duration(91_750));
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn test_retract_matching_tail() {
        let mut timeline = Timeline::new();
        timeline.append(EntryKind::Location, "Castle", Duration(1_000));
        timeline.append(EntryKind::Location, "Title Screen", Duration(2_000));
        timeline.append(EntryKind::Reset, "Reset", Duration(2_000));

        let removed = timeline.retract_tail(&[EntryKind::Location, EntryKind::Reset]).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(removed[1].label, "Reset");
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.last().unwrap().label, "Castle");
    }

    #[test]
    fn test_retract_refuses_mismatched_tail() {
        let mut timeline = Timeline::new();
        timeline.append(EntryKind::Location, "Castle", Duration(1_000));
        timeline.append(EntryKind::Formation, "Goblin", Duration(2_000));

        assert!(timeline.retract_tail(&[EntryKind::Location, EntryKind::Reset]).is_none());
        assert!(timeline.retract_tail(&[EntryKind::Location]).is_none());
        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn test_retract_is_bounded() {
        let mut timeline = Timeline::new();
        for _ in 0..3 {
            timeline.append(EntryKind::Formation, "Bat", Duration(0));
        }
        let kinds = [EntryKind::Formation; 3];
        assert!(timeline.retract_tail(&kinds).is_none());
        assert!(timeline.retract_tail(&[]).is_none());
        assert_eq!(timeline.len(), 3);
    }
}
