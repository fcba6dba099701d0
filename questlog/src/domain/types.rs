//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers prevent common bugs like passing a location id where
//! a milestone bit is expected, or mixing session-relative and wall-clock time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Address in the host process's memory map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub u32);

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:06x}", self.0)
    }
}

/// Location (map) id as stored by the host process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationId(pub u16);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Loc#{:03x}", self.0)
    }
}

/// Bit offset into the milestone bitfield
///
/// Milestones are identified by the offset of their completion bit.
/// Bits are numbered LSB-first within each byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BitOffset(pub u16);

impl BitOffset {
    /// Test this bit against a bitfield snapshot.
    ///
    /// Offsets past the end of the snapshot read as unset.
    #[must_use]
    pub fn is_set_in(self, bits: &[u8]) -> bool {
        let byte = usize::from(self.0 / 8);
        let mask = 1u8 << (self.0 % 8);
        bits.get(byte).is_some_and(|b| b & mask != 0)
    }
}

impl fmt::Display for BitOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bit:{}", self.0)
    }
}

/// Point in time in milliseconds, relative to the tracker's clock origin
///
/// The polling loop stamps every sample; detectors never read a clock.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Time elapsed since `earlier`, zero if `earlier` is later.
    #[must_use]
    pub fn since(self, earlier: Timestamp) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }

    /// Convert to seconds (f64)
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_seconds())
    }
}

/// Duration in milliseconds
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Duration(pub u64);

impl Duration {
    pub const ZERO: Duration = Duration(0);

    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs * 1000)
    }

    #[must_use]
    pub fn saturating_sub(self, other: Duration) -> Duration {
        Duration(self.0.saturating_sub(other.0))
    }

    #[must_use]
    pub fn as_millis(self) -> u64 {
        self.0
    }

    /// Convert to seconds (f64)
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

impl std::ops::Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::AddAssign for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

/// Clock format used in timeline entries and reports: `H:MM:SS.cc`
impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let centis = (self.0 / 10) % 100;
        let total_secs = self.0 / 1000;
        let hours = total_secs / 3600;
        let minutes = (total_secs / 60) % 60;
        let secs = total_secs % 60;
        write!(f, "{hours}:{minutes:02}:{secs:02}.{centis:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_offset_lsb_first() {
        let bits = [0b0000_0001, 0b1000_0000];
        assert!(BitOffset(0).is_set_in(&bits));
        assert!(!BitOffset(1).is_set_in(&bits));
        assert!(BitOffset(15).is_set_in(&bits));
        assert!(!BitOffset(16).is_set_in(&bits));
    }

    #[test]
    fn test_timestamp_since_saturates() {
        assert_eq!(Timestamp(9_000).since(Timestamp(2_000)), Duration(7_000));
        assert_eq!(Timestamp(1_000).since(Timestamp(2_000)), Duration::ZERO);
    }

    #[test]
    fn test_duration_display() {
        assert_eq!(Duration(0).to_string(), "0:00:00.00");
        assert_eq!(Duration(7_000).to_string(), "0:00:07.00");
        assert_eq!(Duration(3_723_450).to_string(), "1:02:03.45");
    }

    #[test]
    fn test_location_display() {
        assert_eq!(LocationId(0x1a).to_string(), "Loc#01a");
    }
}
