//! Catalog models: species, moves, abilities, individuals and their links.

use native_db::*;
use native_model::{native_model, Model};
use pokedex_core::{Ability, BaseStats, Individual, Move, Species};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Stored species.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 1, version = 1)]
#[native_db]
pub struct StoredSpecies {
    /// Primary key - species name.
    #[primary_key]
    pub name: String,
    /// Generation name (e.g. "generation-i").
    #[secondary_key]
    pub generation: String,
    pub types: Vec<String>,
    pub habitat: String,
    pub is_legendary: bool,
    pub is_mythical: bool,
    pub is_baby: bool,
    pub gender_ratio: Option<f32>,
    pub sprite: String,
    pub stats: BaseStats,
    pub weak_against: Vec<String>,
    pub strong_against: Vec<String>,
    pub evolution_chain: Option<String>,
    pub media: BTreeMap<String, String>,
    pub moves: BTreeSet<String>,
    pub abilities: BTreeSet<String>,
}

impl StoredSpecies {
    /// Create from a domain Species.
    pub fn from_species(species: &Species) -> Self {
        Self {
            name: species.name.clone(),
            generation: species.generation.clone(),
            types: species.types.clone(),
            habitat: species.habitat.clone(),
            is_legendary: species.is_legendary,
            is_mythical: species.is_mythical,
            is_baby: species.is_baby,
            gender_ratio: species.gender_ratio,
            sprite: species.sprite.clone(),
            stats: species.stats.clone(),
            weak_against: species.weak_against.clone(),
            strong_against: species.strong_against.clone(),
            evolution_chain: species.evolution_chain.clone(),
            media: species.media.clone(),
            moves: species.moves.clone(),
            abilities: species.abilities.clone(),
        }
    }

    /// Convert to a domain Species.
    pub fn to_species(&self) -> Species {
        Species {
            name: self.name.clone(),
            types: self.types.clone(),
            generation: self.generation.clone(),
            habitat: self.habitat.clone(),
            is_legendary: self.is_legendary,
            is_mythical: self.is_mythical,
            is_baby: self.is_baby,
            gender_ratio: self.gender_ratio,
            sprite: self.sprite.clone(),
            stats: self.stats.clone(),
            weak_against: self.weak_against.clone(),
            strong_against: self.strong_against.clone(),
            evolution_chain: self.evolution_chain.clone(),
            media: self.media.clone(),
            moves: self.moves.clone(),
            abilities: self.abilities.clone(),
        }
    }
}

/// Stored move.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 2, version = 1)]
#[native_db]
pub struct StoredMove {
    /// Primary key - move name.
    #[primary_key]
    pub name: String,
    /// Elemental type tag.
    #[secondary_key]
    pub type_tag: String,
    pub description: String,
    pub power: Option<u16>,
    pub accuracy: Option<u8>,
    pub pp: Option<u8>,
}

impl StoredMove {
    pub fn from_move(m: &Move) -> Self {
        Self {
            name: m.name.clone(),
            type_tag: m.type_tag.clone(),
            description: m.description.clone(),
            power: m.power,
            accuracy: m.accuracy,
            pp: m.pp,
        }
    }

    pub fn to_move(&self) -> Move {
        Move {
            name: self.name.clone(),
            description: self.description.clone(),
            type_tag: self.type_tag.clone(),
            power: self.power,
            accuracy: self.accuracy,
            pp: self.pp,
        }
    }
}

/// Stored ability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 3, version = 1)]
#[native_db]
pub struct StoredAbility {
    /// Primary key - ability name.
    #[primary_key]
    pub name: String,
    pub description: String,
    pub effect: String,
}

impl StoredAbility {
    pub fn from_ability(a: &Ability) -> Self {
        Self {
            name: a.name.clone(),
            description: a.description.clone(),
            effect: a.effect.clone(),
        }
    }

    pub fn to_ability(&self) -> Ability {
        Ability {
            name: self.name.clone(),
            description: self.description.clone(),
            effect: self.effect.clone(),
        }
    }
}

/// Stored individual.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 4, version = 1)]
#[native_db]
pub struct StoredIndividual {
    /// Primary key - external ID.
    #[primary_key]
    pub external_id: u32,
    /// Unique name.
    #[secondary_key(unique)]
    pub name: String,
    /// Species name.
    #[secondary_key]
    pub species: String,
    pub height: u32,
    pub weight: u32,
    pub types: Vec<String>,
    pub stats: BaseStats,
}

impl StoredIndividual {
    pub fn from_individual(individual: &Individual) -> Self {
        Self {
            external_id: individual.external_id,
            name: individual.name.clone(),
            species: individual.species.clone(),
            height: individual.height,
            weight: individual.weight,
            types: individual.types.clone(),
            stats: individual.stats.clone(),
        }
    }

    pub fn to_individual(&self) -> Individual {
        Individual {
            external_id: self.external_id,
            name: self.name.clone(),
            species: self.species.clone(),
            height: self.height,
            weight: self.weight,
            types: self.types.clone(),
            stats: self.stats.clone(),
        }
    }
}

/// Kind of many-to-many association from an individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    Move,
    Ability,
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkKind::Move => write!(f, "move"),
            LinkKind::Ability => write!(f, "ability"),
        }
    }
}

/// Stored association row between an individual and a move or ability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 5, version = 1)]
#[native_db]
pub struct StoredLink {
    /// Primary key - composite of kind, individual and target.
    #[primary_key]
    pub key: String,
    /// Individual external ID.
    #[secondary_key]
    pub individual_id: u32,
    /// Move or ability name.
    #[secondary_key]
    pub target: String,
    pub kind: LinkKind,
}

impl StoredLink {
    pub fn new(individual_id: u32, target: impl Into<String>, kind: LinkKind) -> Self {
        let target = target.into();
        Self {
            key: Self::key_for(individual_id, &target, kind),
            individual_id,
            target,
            kind,
        }
    }

    /// Composite primary key; linking the same pair twice yields the same key.
    pub fn key_for(individual_id: u32, target: &str, kind: LinkKind) -> String {
        format!("{}:{:010}:{}", kind, individual_id, target)
    }
}
