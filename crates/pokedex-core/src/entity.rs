//! Catalog entities

use crate::stats::BaseStats;
use crate::types;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Placeholder for generation/habitat when the source has nothing to say
pub const UNKNOWN: &str = "unknown";

/// A move. Write-once, shared by every individual that knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Natural key
    pub name: String,
    pub description: String,
    pub type_tag: String,
    pub power: Option<u16>,
    /// 0-100
    pub accuracy: Option<u8>,
    pub pp: Option<u8>,
}

/// An ability. Write-once, shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    /// Natural key
    pub name: String,
    pub description: String,
    /// Short effect text
    pub effect: String,
}

/// Classification flags on a species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeciesFlag {
    Legendary,
    Mythical,
    Baby,
}

/// Template record shared by all individuals of the same kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    /// Natural key
    pub name: String,
    /// Type tags in slot order
    pub types: Vec<String>,
    pub generation: String,
    pub habitat: String,
    pub is_legendary: bool,
    pub is_mythical: bool,
    pub is_baby: bool,
    /// Female fraction in `[0, 1]`; `None` for genderless species
    pub gender_ratio: Option<f32>,
    pub sprite: String,
    pub stats: BaseStats,
    pub weak_against: Vec<String>,
    pub strong_against: Vec<String>,
    pub evolution_chain: Option<String>,
    /// Open metadata (sprite URLs and the like)
    pub media: BTreeMap<String, String>,
    /// Moves seen on any ingested individual of this species
    pub moves: BTreeSet<String>,
    /// Abilities seen on any ingested individual of this species
    pub abilities: BTreeSet<String>,
}

impl Species {
    /// Create a species with default metadata and no associations
    pub fn new(name: impl Into<String>, types: Vec<String>) -> Self {
        let mut species = Self {
            name: name.into(),
            types,
            generation: UNKNOWN.to_string(),
            habitat: UNKNOWN.to_string(),
            is_legendary: false,
            is_mythical: false,
            is_baby: false,
            gender_ratio: Some(0.5),
            sprite: String::new(),
            stats: BaseStats::default(),
            weak_against: Vec::new(),
            strong_against: Vec::new(),
            evolution_chain: None,
            media: BTreeMap::new(),
            moves: BTreeSet::new(),
            abilities: BTreeSet::new(),
        };
        species.refresh_matchups();
        species
    }

    /// Recompute weak/strong sets from the type tags
    pub fn refresh_matchups(&mut self) {
        self.weak_against = types::weak_against(&self.types);
        self.strong_against = types::strong_against(&self.types);
    }

    /// Exact (case-insensitive) type membership
    pub fn has_type(&self, type_tag: &str) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case(type_tag.trim()))
    }

    pub fn has_flag(&self, flag: SpeciesFlag) -> bool {
        match flag {
            SpeciesFlag::Legendary => self.is_legendary,
            SpeciesFlag::Mythical => self.is_mythical,
            SpeciesFlag::Baby => self.is_baby,
        }
    }

    /// Whether this species can be seen with the given move
    pub fn knows_move(&self, move_name: &str) -> bool {
        let wanted = move_name.trim().to_lowercase();
        self.moves.iter().any(|m| m.to_lowercase() == wanted)
    }
}

/// One fetched instance of a species, keyed by external ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
    /// Natural key
    pub external_id: u32,
    /// Unique name as reported by the source
    pub name: String,
    /// Species natural key
    pub species: String,
    /// Decimetres
    pub height: u32,
    /// Hectograms
    pub weight: u32,
    pub types: Vec<String>,
    pub stats: BaseStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_species_has_defaults_and_matchups() {
        let species = Species::new("pikachu", vec!["electric".to_string()]);
        assert_eq!(species.generation, UNKNOWN);
        assert_eq!(species.habitat, UNKNOWN);
        assert!(!species.has_flag(SpeciesFlag::Legendary));
        assert_eq!(species.weak_against, vec!["ground"]);
        assert_eq!(species.strong_against, vec!["water", "flying"]);
    }

    #[test]
    fn test_has_type_ignores_case() {
        let species = Species::new(
            "bulbasaur",
            vec!["grass".to_string(), "poison".to_string()],
        );
        assert!(species.has_type("Poison"));
        assert!(!species.has_type("fire"));
    }

    #[test]
    fn test_knows_move() {
        let mut species = Species::new("pikachu", vec!["electric".to_string()]);
        species.moves.insert("thunder-shock".to_string());
        assert!(species.knows_move("Thunder-Shock"));
        assert!(!species.knows_move("thunder"));
    }
}
