//! Semantic catalog: raw codes to human-readable names.
//!
//! The catalog is pure data. It is loaded once from JSON, never mutated, and
//! passed by reference to the sampler and the detectors, so no lookup table
//! lives inside detection logic.
//!
//! # File Format
//!
//! ```json
//! {
//!   "activity_codes": { "0": "field", "1": "menu", "2": "encounter", "3": "title" },
//!   "shop_screens": [4, 5],
//!   "transport_sprites": [32],
//!   "locations": { "1": "Castle" },
//!   "entities": { "1": "Goblin" },
//!   "items": { "16": "Crown" },
//!   "reset_location": 0,
//!   "save_locations": [3],
//!   "milestones": [{ "name": "Crown Retrieved", "bit": 8, "peek_bit": 9 }],
//!   "challenge": { "location": 9, "won_bit": 20 }
//! }
//! ```
//!
//! Every table is optional; unknown codes fall back to hex labels.

use log::info;
use questlog_common::{Position, EMPTY_SLOT};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::domain::{BitOffset, CatalogError, LocationId};

/// Decoded meaning of the raw activity byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCode {
    /// Walking around a map
    Field,
    /// Menu overlay (generic menu or shop, see `shop_screens`)
    Menu,
    /// Encounter in progress
    Encounter,
    /// Title / reset screen
    Title,
    /// Raw value with no catalog entry
    #[default]
    Unknown,
}

/// Bespoke one-shot check that latches a milestone as peeked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PeekProbe {
    /// Player stood inside an inclusive coordinate band on a location
    Position { location: LocationId, x: (u8, u8), y: (u8, u8) },
    /// Dialog advanced to `index` while a choice was pending
    Dialog { index: u8 },
}

impl PeekProbe {
    /// Whether the player at `position` on `location` satisfies a positional probe.
    #[must_use]
    pub fn matches_position(&self, location: LocationId, position: Position) -> bool {
        match *self {
            PeekProbe::Position { location: want, x, y } => {
                want == location
                    && (x.0..=x.1).contains(&position.x)
                    && (y.0..=y.1).contains(&position.y)
            }
            PeekProbe::Dialog { .. } => false,
        }
    }
}

/// One milestone: completion bit plus optional peek evidence
#[derive(Debug, Clone, Deserialize)]
pub struct MilestoneDef {
    pub name: String,
    /// Completion bit; also the milestone's identity
    pub bit: BitOffset,
    #[serde(default)]
    pub peek_bit: Option<BitOffset>,
    #[serde(default)]
    pub peek_location: Option<LocationId>,
    #[serde(default)]
    pub peek_probe: Option<PeekProbe>,
}

/// Optional side challenge reported as visited/won flags
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ChallengeDef {
    pub location: LocationId,
    pub won_bit: BitOffset,
}

/// Immutable lookup tables
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Catalog {
    activity_codes: HashMap<u8, ActivityCode>,
    shop_screens: HashSet<u8>,
    transport_sprites: HashSet<u8>,
    locations: HashMap<u16, String>,
    entities: HashMap<u8, String>,
    items: HashMap<u8, String>,
    reset_location: Option<LocationId>,
    save_locations: HashSet<LocationId>,
    milestones: Vec<MilestoneDef>,
    challenge: Option<ChallengeDef>,
}

impl Catalog {
    /// Load and validate a catalog file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// defines the same milestone bit twice.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|error| CatalogError::ReadFailed {
            path: path.display().to_string(),
            error,
        })?;
        let catalog = Self::from_json_str(&content)?;
        info!(
            "Loaded catalog {}: {} locations, {} entities, {} milestones",
            path.display(),
            catalog.locations.len(),
            catalog.entities.len(),
            catalog.milestones.len()
        );
        Ok(catalog)
    }

    /// Parse and validate a catalog from JSON text.
    ///
    /// # Errors
    /// Returns an error on invalid JSON or duplicate milestone bits.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for def in &self.milestones {
            if !seen.insert(def.bit) {
                return Err(CatalogError::Invalid(format!(
                    "milestone bit {} defined twice (\"{}\")",
                    def.bit.0, def.name
                )));
            }
            if let Some(PeekProbe::Position { x, y, .. }) = def.peek_probe {
                if x.0 > x.1 || y.0 > y.1 {
                    return Err(CatalogError::Invalid(format!(
                        "empty coordinate band for \"{}\"",
                        def.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Decode the raw activity block. Only the first byte is significant.
    #[must_use]
    pub fn decode_activity(&self, bytes: &[u8]) -> ActivityCode {
        bytes
            .first()
            .and_then(|raw| self.activity_codes.get(raw).copied())
            .unwrap_or(ActivityCode::Unknown)
    }

    #[must_use]
    pub fn location_name(&self, id: LocationId) -> String {
        self.locations.get(&id.0).cloned().unwrap_or_else(|| id.to_string())
    }

    /// Name of a roster entity; `None` for an empty slot.
    #[must_use]
    pub fn entity_name(&self, id: u8) -> Option<String> {
        if id == EMPTY_SLOT {
            return None;
        }
        Some(self.entities.get(&id).cloned().unwrap_or_else(|| format!("#{id:02x}")))
    }

    /// Name of an inventory item; `None` for an empty slot.
    #[must_use]
    pub fn item_name(&self, id: u8) -> Option<String> {
        if id == EMPTY_SLOT {
            return None;
        }
        Some(self.items.get(&id).cloned().unwrap_or_else(|| format!("item#{id:02x}")))
    }

    #[must_use]
    pub fn milestone_name(&self, bit: BitOffset) -> String {
        self.milestones
            .iter()
            .find(|def| def.bit == bit)
            .map_or_else(|| bit.to_string(), |def| def.name.clone())
    }

    #[must_use]
    pub fn is_shop_screen(&self, screen: u8) -> bool {
        self.shop_screens.contains(&screen)
    }

    #[must_use]
    pub fn is_transport_sprite(&self, sprite: u8) -> bool {
        self.transport_sprites.contains(&sprite)
    }

    #[must_use]
    pub fn is_save_location(&self, id: LocationId) -> bool {
        self.save_locations.contains(&id)
    }

    #[must_use]
    pub fn reset_location(&self) -> Option<LocationId> {
        self.reset_location
    }

    #[must_use]
    pub fn milestones(&self) -> &[MilestoneDef] {
        &self.milestones
    }

    #[must_use]
    pub fn challenge(&self) -> Option<ChallengeDef> {
        self.challenge
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Catalog {
        Catalog::from_json_str(include_str!("../tests/fixtures/catalog.json"))
            .expect("fixture catalog is valid")
    }

    #[test]
    fn test_decode_activity() {
        let catalog = fixture();
        assert_eq!(catalog.decode_activity(&[1]), ActivityCode::Menu);
        assert_eq!(catalog.decode_activity(&[2, 0xAA]), ActivityCode::Encounter);
        assert_eq!(catalog.decode_activity(&[0x77]), ActivityCode::Unknown);
        assert_eq!(catalog.decode_activity(&[]), ActivityCode::Unknown);
    }

    #[test]
    fn test_names_fall_back_to_hex() {
        let catalog = fixture();
        assert_eq!(catalog.location_name(LocationId(1)), "Castle");
        assert_eq!(catalog.location_name(LocationId(0x42)), "Loc#042");
        assert_eq!(catalog.entity_name(2).as_deref(), Some("Wolf"));
        assert_eq!(catalog.entity_name(0x30).as_deref(), Some("#30"));
        assert_eq!(catalog.entity_name(EMPTY_SLOT), None);
        assert_eq!(catalog.item_name(16).as_deref(), Some("Crown"));
        assert_eq!(catalog.milestone_name(BitOffset(8)), "Crown Retrieved");
        assert_eq!(catalog.milestone_name(BitOffset(99)), "bit:99");
    }

    #[test]
    fn test_duplicate_milestone_bit_rejected() {
        let json = r#"{ "milestones": [
            { "name": "A", "bit": 3 },
            { "name": "B", "bit": 3 }
        ] }"#;
        let err = Catalog::from_json_str(json).unwrap_err();
        assert!(err.to_string().contains("defined twice"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(Catalog::from_json_str(r#"{ "locatoins": {} }"#).is_err());
    }

    #[test]
    fn test_position_probe_band() {
        let probe = PeekProbe::Position { location: LocationId(2), x: (10, 12), y: (4, 4) };
        assert!(probe.matches_position(LocationId(2), Position { x: 11, y: 4 }));
        assert!(!probe.matches_position(LocationId(2), Position { x: 13, y: 4 }));
        assert!(!probe.matches_position(LocationId(3), Position { x: 11, y: 4 }));
    }

    #[test]
    fn test_empty_catalog_is_usable() {
        let catalog = Catalog::default();
        assert_eq!(catalog.decode_activity(&[1]), ActivityCode::Unknown);
        assert!(catalog.milestones().is_empty());
        assert!(catalog.reset_location().is_none());
    }
}
