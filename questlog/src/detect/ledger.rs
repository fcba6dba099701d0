//! Currency accountant.
//!
//! The currency counter only ever reports a balance, so spending and earning
//! are reconstructed from successive deltas. Loading a save rewrites the
//! balance wholesale; deltas seen in a save context are dropped.

use std::ops::RangeInclusive;

use log::trace;

use crate::catalog::Catalog;
use crate::domain::LocationId;
use crate::sampling::FastSample;
use crate::session::RunState;

/// Menu sub-states of the save/load screens, checked only while the menu is open.
pub const SAVE_MENU_SUBSTATES: RangeInclusive<u8> = 0x10..=0x13;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ledger {
    pub previous: Option<u32>,
    pub spent: u64,
    pub earned: u64,
    /// Deltas dropped because they happened in a save context
    pub discarded: u32,
}

impl Ledger {
    /// Fold one reading into the totals. `previous` always moves to `current`.
    pub fn apply(&mut self, current: u32, in_save_context: bool) {
        if let Some(previous) = self.previous {
            if in_save_context {
                if current != previous {
                    self.discarded += 1;
                }
            } else if current < previous {
                self.spent += u64::from(previous - current);
            } else {
                self.earned += u64::from(current - previous);
            }
        }
        self.previous = Some(current);
    }
}

pub fn on_tick(
    state: &mut RunState,
    catalog: &Catalog,
    fast: &FastSample,
    location: Option<LocationId>,
    currency: u32,
) {
    let at_save_point = location.is_some_and(|id| catalog.is_save_location(id));
    let in_save_menu = state.menu.is_active()
        && fast.menu_substate.is_some_and(|sub| SAVE_MENU_SUBSTATES.contains(&sub));
    let in_save_context = at_save_point || in_save_menu;
    if in_save_context {
        trace!("Currency {currency} read in save context");
    }
    state.ledger.apply(currency, in_save_context);
}
