//! # Shared Memory Map (Host Process ↔ Tracker)
//!
//! Defines where every monitored signal lives in the host process's address
//! space and the fixed raw values the tracker compares against. Kept in its
//! own `no_std` crate so recording and inspection tools can share the exact
//! layout the tracker polls.
//!
//! ## Cadence Groups
//!
//! 1. **Fast blocks** - read every tick (activity, menu screen, frame counter,
//!    transport sprite, dialog, terminal signals, roster during encounters)
//! 2. **Slow blocks** - read every Nth tick and once at session end (location,
//!    position, currency, milestone bitfield, inventory, seed)
//!
//! ## Key Types
//!
//! - [`MemoryBlock`] - Address and byte length of one read
//! - [`Position`] - Player coordinates on the current map

#![no_std]

// ============================================================================
// Memory Blocks
// ============================================================================

/// A contiguous byte range in the host process's address space.
///
/// Every read the tracker issues is described by one of these constants.
/// A response whose length differs from `size` is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBlock {
    /// Absolute address in the host's memory map
    pub address: u32,
    /// Number of bytes to read
    pub size: usize,
}

impl MemoryBlock {
    #[must_use]
    pub const fn new(address: u32, size: usize) -> Self {
        Self { address, size }
    }
}

// ----------------------------------------------------------------------------
// Fast blocks (every tick)
// ----------------------------------------------------------------------------

/// Raw activity byte, decoded into an activity code by the catalog
pub const ACTIVITY: MemoryBlock = MemoryBlock::new(0x7E_0100, 1);

/// Which screen the open menu shows (shop vs generic menu discriminator)
pub const MENU_SCREEN: MemoryBlock = MemoryBlock::new(0x7E_0102, 1);

/// Sub-state of the open menu (save/load dialogs live in a small range)
pub const MENU_SUBSTATE: MemoryBlock = MemoryBlock::new(0x7E_0103, 1);

/// Free-running frame counter, wraps at 256
///
/// Also ticks during unrelated animations and freezes while the host is
/// paused or loading, which is why it is only used as an edge guard.
pub const FRAME_COUNTER: MemoryBlock = MemoryBlock::new(0x7E_0104, 1);

/// Sprite code of the player's map graphic (reveals transport use)
pub const TRANSPORT_SPRITE: MemoryBlock = MemoryBlock::new(0x7E_0108, 1);

/// Dialog index (byte 0) and choice-pending flag (byte 1)
pub const DIALOG: MemoryBlock = MemoryBlock::new(0x7E_0110, 2);

/// Story progression flag, first of the two terminal signals
pub const ENDING_FLAG: MemoryBlock = MemoryBlock::new(0x7E_1E40, 1);

/// Screen state, second of the two terminal signals
pub const SCREEN_STATE: MemoryBlock = MemoryBlock::new(0x7E_0122, 1);

/// Enemy roster of the current encounter, one entity id per slot
pub const ROSTER: MemoryBlock = MemoryBlock::new(0x7E_0200, ROSTER_SLOTS);

/// Number of slots in the encounter roster
pub const ROSTER_SLOTS: usize = 8;

// ----------------------------------------------------------------------------
// Slow blocks (every Nth tick)
// ----------------------------------------------------------------------------

/// Current location id, little-endian u16
pub const LOCATION: MemoryBlock = MemoryBlock::new(0x7E_0300, 2);

/// Player map coordinates (x, y)
pub const POSITION: MemoryBlock = MemoryBlock::new(0x7E_0304, 2);

/// Currency held, little-endian 24-bit
pub const CURRENCY: MemoryBlock = MemoryBlock::new(0x7E_0310, 3);

/// Event flag bitfield; milestone bits are offsets into this block
pub const MILESTONE_BITS: MemoryBlock = MemoryBlock::new(0x7E_1000, 64);

/// Inventory, one item id per slot
pub const INVENTORY: MemoryBlock = MemoryBlock::new(0x7E_1100, 32);

/// Seed / save-file identifier, little-endian u32
pub const SEED: MemoryBlock = MemoryBlock::new(0x7E_1F00, 4);

// ============================================================================
// Raw Values
// ============================================================================

/// Roster and inventory slots holding this id are empty
pub const EMPTY_SLOT: u8 = 0xFF;

/// `ENDING_FLAG` value once the final story event has fired
pub const ENDING_FLAG_SET: u8 = 0x01;

/// `SCREEN_STATE` value while the ending sequence is on screen
pub const ENDING_SCREEN: u8 = 0x3C;

// ============================================================================
// Decoded Values
// ============================================================================

/// Player coordinates on the current map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: u8,
    pub y: u8,
}

/// Decode a little-endian integer of up to 4 bytes.
///
/// Returns `None` when `bytes` is empty or longer than 4.
#[must_use]
pub fn decode_le(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 4 {
        return None;
    }
    let mut value = 0u32;
    for (i, byte) in bytes.iter().enumerate() {
        value |= u32::from(*byte) << (8 * i);
    }
    Some(value)
}
