//! Raw records and the remote source capability.
//!
//! Raw records carry names only for nested sub-records. Resolving a move or
//! ability name into a full record is a separate, independently fallible call.

use crate::error::Result;
use pokedex_core::IndividualKey;
use serde::{Deserialize, Serialize};

/// Front and back sprite URLs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSprites {
    pub front: Option<String>,
    pub back: Option<String>,
}

/// An individual as returned by the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIndividual {
    pub id: u32,
    pub name: String,
    pub species_name: String,
    /// Type tags in slot order
    pub types: Vec<String>,
    pub abilities: Vec<String>,
    /// Move names in source order
    pub moves: Vec<String>,
    pub height: u32,
    pub weight: u32,
    /// `(stat-name, base value)` pairs
    pub stats: Vec<(String, u16)>,
    pub sprites: RawSprites,
}

/// Species metadata from the secondary species lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSpeciesMeta {
    pub is_legendary: bool,
    pub is_mythical: bool,
    pub is_baby: bool,
    pub generation: Option<String>,
    pub habitat: Option<String>,
    /// Female eighths, `None` when genderless
    pub gender_rate: Option<u8>,
    pub evolution_chain: Option<String>,
}

impl RawSpeciesMeta {
    /// Female fraction in `[0, 1]`
    pub fn gender_ratio(&self) -> Option<f32> {
        self.gender_rate.map(|eighths| f32::from(eighths.min(8)) / 8.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMove {
    pub name: String,
    pub effect_text: String,
    pub power: Option<u16>,
    pub accuracy: Option<u8>,
    pub pp: Option<u8>,
    pub type_tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAbility {
    pub name: String,
    pub effect_text: String,
    pub short_effect: String,
}

/// Read-only remote data service.
///
/// Every call is blocking and may fail on its own. Nested lists carry no
/// ordering guarantee beyond what the source returns.
pub trait RemoteSource {
    /// Fetch an individual by external ID or name.
    fn individual(&self, key: &IndividualKey) -> Result<RawIndividual>;

    /// Fetch auxiliary species metadata.
    fn species_metadata(&self, species: &str) -> Result<RawSpeciesMeta>;

    fn move_details(&self, name: &str) -> Result<RawMove>;

    fn ability_details(&self, name: &str) -> Result<RawAbility>;

    /// Up to `limit` individual keys of one type.
    fn members_by_type(&self, type_tag: &str, limit: usize) -> Result<Vec<IndividualKey>>;

    /// Up to `limit` individual keys introduced in generation `number`.
    fn members_by_generation(&self, number: u32, limit: usize) -> Result<Vec<IndividualKey>>;
}

impl<S: RemoteSource + ?Sized> RemoteSource for &S {
    fn individual(&self, key: &IndividualKey) -> Result<RawIndividual> {
        (**self).individual(key)
    }

    fn species_metadata(&self, species: &str) -> Result<RawSpeciesMeta> {
        (**self).species_metadata(species)
    }

    fn move_details(&self, name: &str) -> Result<RawMove> {
        (**self).move_details(name)
    }

    fn ability_details(&self, name: &str) -> Result<RawAbility> {
        (**self).ability_details(name)
    }

    fn members_by_type(&self, type_tag: &str, limit: usize) -> Result<Vec<IndividualKey>> {
        (**self).members_by_type(type_tag, limit)
    }

    fn members_by_generation(&self, number: u32, limit: usize) -> Result<Vec<IndividualKey>> {
        (**self).members_by_generation(number, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_ratio_from_eighths() {
        let mut meta = RawSpeciesMeta {
            is_legendary: false,
            is_mythical: false,
            is_baby: false,
            generation: None,
            habitat: None,
            gender_rate: Some(1),
            evolution_chain: None,
        };
        assert_eq!(meta.gender_ratio(), Some(0.125));

        meta.gender_rate = None;
        assert_eq!(meta.gender_ratio(), None);
    }
}
