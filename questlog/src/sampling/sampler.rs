//! Turns raw reads into [`Sample`]s.
//!
//! The sampler is the only component that talks to the [`MemorySource`]. It
//! issues one read per [`MemoryBlock`], decodes what it can, and drops any
//! response whose length is wrong instead of guessing.

use log::debug;
use questlog_common::{self as layout, MemoryBlock, Position};

use super::sample::{DialogState, FastSample, Sample, SlowSample, TerminalSignals};
use crate::catalog::{ActivityCode, Catalog};
use crate::domain::{Address, LocationId, SourceError};
use crate::source::MemorySource;

pub struct Sampler<S> {
    source: S,
    /// Reads dropped for having the wrong length
    pub short_reads: u64,
}

impl<S: MemorySource> Sampler<S> {
    pub fn new(source: S) -> Self {
        Self { source, short_reads: 0 }
    }

    /// Read one tick's signals.
    ///
    /// `slow` adds the slow-cadence block. The roster is read only when the
    /// encounter timer is active or this tick's activity says an encounter is
    /// starting.
    ///
    /// # Errors
    /// Propagates transport failures; no partial sample is returned.
    pub fn sample(
        &mut self,
        catalog: &Catalog,
        slow: bool,
        encounter_active: bool,
    ) -> Result<Sample, SourceError> {
        let fast = self.sample_fast(catalog, encounter_active)?;
        let slow = if slow { Some(self.sample_slow()?) } else { None };
        Ok(Sample { fast, slow })
    }

    fn sample_fast(
        &mut self,
        catalog: &Catalog,
        encounter_active: bool,
    ) -> Result<FastSample, SourceError> {
        let activity = self.read_block(layout::ACTIVITY)?.map(|b| catalog.decode_activity(&b));
        let menu_screen = self.read_byte(layout::MENU_SCREEN)?;
        let menu_substate = self.read_byte(layout::MENU_SUBSTATE)?;
        let frame_counter = self.read_byte(layout::FRAME_COUNTER)?;
        let transport_sprite = self.read_byte(layout::TRANSPORT_SPRITE)?;
        let dialog = self
            .read_block(layout::DIALOG)?
            .map(|b| DialogState { index: b[0], choice_pending: b[1] != 0 });

        let roster = if encounter_active || activity == Some(ActivityCode::Encounter) {
            self.read_block(layout::ROSTER)?
        } else {
            None
        };

        let ending_flag = self.read_byte(layout::ENDING_FLAG)?;
        let screen_state = self.read_byte(layout::SCREEN_STATE)?;
        let terminal = ending_flag
            .zip(screen_state)
            .map(|(ending_flag, screen_state)| TerminalSignals { ending_flag, screen_state });

        Ok(FastSample {
            activity,
            menu_screen,
            menu_substate,
            frame_counter,
            transport_sprite,
            dialog,
            roster,
            terminal,
        })
    }

    /// Read the slow-cadence block on its own (used once at session end).
    ///
    /// # Errors
    /// Propagates transport failures.
    pub fn sample_slow(&mut self) -> Result<SlowSample, SourceError> {
        let location = self.read_le(layout::LOCATION)?.and_then(|v| u16::try_from(v).ok());
        let position = self.read_block(layout::POSITION)?.map(|b| Position { x: b[0], y: b[1] });

        Ok(SlowSample {
            location: location.map(LocationId),
            position,
            currency: self.read_le(layout::CURRENCY)?,
            milestone_bits: self.read_block(layout::MILESTONE_BITS)?,
            inventory: self.read_block(layout::INVENTORY)?,
            seed: self.read_le(layout::SEED)?,
        })
    }

    fn read_block(&mut self, block: MemoryBlock) -> Result<Option<Vec<u8>>, SourceError> {
        let bytes = self.source.read(Address(block.address), block.size)?;
        if bytes.len() != block.size {
            self.short_reads += 1;
            debug!(
                "Dropping read at {}: expected {} bytes, got {}",
                Address(block.address),
                block.size,
                bytes.len()
            );
            return Ok(None);
        }
        Ok(Some(bytes))
    }

    fn read_byte(&mut self, block: MemoryBlock) -> Result<Option<u8>, SourceError> {
        Ok(self.read_block(block)?.map(|b| b[0]))
    }

    fn read_le(&mut self, block: MemoryBlock) -> Result<Option<u32>, SourceError> {
        Ok(self.read_block(block)?.and_then(|b| layout::decode_le(&b)))
    }
}
