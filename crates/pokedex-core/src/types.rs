//! Elemental types and the attack effectiveness chart

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PokemonType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

impl PokemonType {
    pub const ALL: [PokemonType; 18] = [
        PokemonType::Normal,
        PokemonType::Fire,
        PokemonType::Water,
        PokemonType::Electric,
        PokemonType::Grass,
        PokemonType::Ice,
        PokemonType::Fighting,
        PokemonType::Poison,
        PokemonType::Ground,
        PokemonType::Flying,
        PokemonType::Psychic,
        PokemonType::Bug,
        PokemonType::Rock,
        PokemonType::Ghost,
        PokemonType::Dragon,
        PokemonType::Dark,
        PokemonType::Steel,
        PokemonType::Fairy,
    ];

    /// Lowercase tag as used by the remote source and the store
    pub fn tag(&self) -> &'static str {
        match self {
            PokemonType::Normal => "normal",
            PokemonType::Fire => "fire",
            PokemonType::Water => "water",
            PokemonType::Electric => "electric",
            PokemonType::Grass => "grass",
            PokemonType::Ice => "ice",
            PokemonType::Fighting => "fighting",
            PokemonType::Poison => "poison",
            PokemonType::Ground => "ground",
            PokemonType::Flying => "flying",
            PokemonType::Psychic => "psychic",
            PokemonType::Bug => "bug",
            PokemonType::Rock => "rock",
            PokemonType::Ghost => "ghost",
            PokemonType::Dragon => "dragon",
            PokemonType::Dark => "dark",
            PokemonType::Steel => "steel",
            PokemonType::Fairy => "fairy",
        }
    }

    /// Multiplier for `attacking` hitting `defending`.
    /// Returns: 2.0 = Super Effective, 1.0 = Normal, 0.5 = Not Very Effective, 0.0 = No Effect
    pub fn effectiveness(attacking: PokemonType, defending: PokemonType) -> f32 {
        use PokemonType::*;

        match (attacking, defending) {
            (Normal, Ghost) => 0.0,
            (Normal, Rock) | (Normal, Steel) => 0.5,
            (Normal, _) => 1.0,

            (Fire, Grass) | (Fire, Ice) | (Fire, Bug) | (Fire, Steel) => 2.0,
            (Fire, Fire) | (Fire, Water) | (Fire, Rock) | (Fire, Dragon) => 0.5,
            (Fire, _) => 1.0,

            (Water, Fire) | (Water, Ground) | (Water, Rock) => 2.0,
            (Water, Water) | (Water, Grass) | (Water, Dragon) => 0.5,
            (Water, _) => 1.0,

            (Electric, Ground) => 0.0,
            (Electric, Water) | (Electric, Flying) => 2.0,
            (Electric, Electric) | (Electric, Grass) | (Electric, Dragon) => 0.5,
            (Electric, _) => 1.0,

            (Grass, Water) | (Grass, Ground) | (Grass, Rock) => 2.0,
            (Grass, Fire)
            | (Grass, Grass)
            | (Grass, Poison)
            | (Grass, Flying)
            | (Grass, Bug)
            | (Grass, Dragon)
            | (Grass, Steel) => 0.5,
            (Grass, _) => 1.0,

            (Ice, Grass) | (Ice, Ground) | (Ice, Flying) | (Ice, Dragon) => 2.0,
            (Ice, Fire) | (Ice, Water) | (Ice, Ice) | (Ice, Steel) => 0.5,
            (Ice, _) => 1.0,

            (Fighting, Ghost) => 0.0,
            (Fighting, Normal)
            | (Fighting, Ice)
            | (Fighting, Rock)
            | (Fighting, Dark)
            | (Fighting, Steel) => 2.0,
            (Fighting, Poison)
            | (Fighting, Flying)
            | (Fighting, Psychic)
            | (Fighting, Bug)
            | (Fighting, Fairy) => 0.5,
            (Fighting, _) => 1.0,

            (Poison, Steel) => 0.0,
            (Poison, Grass) | (Poison, Fairy) => 2.0,
            (Poison, Poison) | (Poison, Ground) | (Poison, Rock) | (Poison, Ghost) => 0.5,
            (Poison, _) => 1.0,

            (Ground, Flying) => 0.0,
            (Ground, Fire)
            | (Ground, Electric)
            | (Ground, Poison)
            | (Ground, Rock)
            | (Ground, Steel) => 2.0,
            (Ground, Grass) | (Ground, Bug) => 0.5,
            (Ground, _) => 1.0,

            (Flying, Grass) | (Flying, Fighting) | (Flying, Bug) => 2.0,
            (Flying, Electric) | (Flying, Rock) | (Flying, Steel) => 0.5,
            (Flying, _) => 1.0,

            (Psychic, Dark) => 0.0,
            (Psychic, Fighting) | (Psychic, Poison) => 2.0,
            (Psychic, Psychic) | (Psychic, Steel) => 0.5,
            (Psychic, _) => 1.0,

            (Bug, Grass) | (Bug, Psychic) | (Bug, Dark) => 2.0,
            (Bug, Fire)
            | (Bug, Fighting)
            | (Bug, Poison)
            | (Bug, Flying)
            | (Bug, Ghost)
            | (Bug, Steel)
            | (Bug, Fairy) => 0.5,
            (Bug, _) => 1.0,

            (Rock, Fire) | (Rock, Ice) | (Rock, Flying) | (Rock, Bug) => 2.0,
            (Rock, Fighting) | (Rock, Ground) | (Rock, Steel) => 0.5,
            (Rock, _) => 1.0,

            (Ghost, Normal) => 0.0,
            (Ghost, Psychic) | (Ghost, Ghost) => 2.0,
            (Ghost, Dark) => 0.5,
            (Ghost, _) => 1.0,

            (Dragon, Fairy) => 0.0,
            (Dragon, Dragon) => 2.0,
            (Dragon, Steel) => 0.5,
            (Dragon, _) => 1.0,

            (Dark, Psychic) | (Dark, Ghost) => 2.0,
            (Dark, Fighting) | (Dark, Dark) | (Dark, Fairy) => 0.5,
            (Dark, _) => 1.0,

            (Steel, Ice) | (Steel, Rock) | (Steel, Fairy) => 2.0,
            (Steel, Fire) | (Steel, Water) | (Steel, Electric) | (Steel, Steel) => 0.5,
            (Steel, _) => 1.0,

            (Fairy, Fighting) | (Fairy, Dragon) | (Fairy, Dark) => 2.0,
            (Fairy, Fire) | (Fairy, Poison) | (Fairy, Steel) => 0.5,
            (Fairy, _) => 1.0,
        }
    }

    /// Combined multiplier of an attacking type against a (possibly dual) typing
    pub fn effectiveness_against(attacking: PokemonType, defending: &[PokemonType]) -> f32 {
        defending
            .iter()
            .map(|d| Self::effectiveness(attacking, *d))
            .product()
    }
}

impl fmt::Display for PokemonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for PokemonType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim().to_lowercase();
        PokemonType::ALL
            .iter()
            .copied()
            .find(|t| t.tag() == tag)
            .ok_or_else(|| Error::UnknownType(s.to_string()))
    }
}

/// Parse type tags, dropping the ones outside the chart
pub fn parse_tags<S: AsRef<str>>(tags: &[S]) -> Vec<PokemonType> {
    tags.iter()
        .filter_map(|t| t.as_ref().parse::<PokemonType>().ok())
        .collect()
}

/// Attacking types that hit this typing for more than 1x, in chart order
pub fn weak_against<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let defending = parse_tags(tags);
    if defending.is_empty() {
        return Vec::new();
    }
    PokemonType::ALL
        .iter()
        .filter(|a| PokemonType::effectiveness_against(**a, &defending) > 1.0)
        .map(|a| a.tag().to_string())
        .collect()
}

/// Defending types that at least one of these types hits for 2x, in chart order
pub fn strong_against<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let attacking = parse_tags(tags);
    PokemonType::ALL
        .iter()
        .filter(|d| {
            attacking
                .iter()
                .any(|a| PokemonType::effectiveness(*a, **d) >= 2.0)
        })
        .map(|d| d.tag().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag() {
        assert_eq!("Electric".parse::<PokemonType>().unwrap(), PokemonType::Electric);
        assert!("shadow".parse::<PokemonType>().is_err());
    }

    #[test]
    fn test_single_type_weaknesses() {
        assert_eq!(weak_against(&["electric"]), vec!["ground"]);
    }

    #[test]
    fn test_dual_type_immunity_cancels_weakness() {
        // Flying cancels Ground; Rock is 4x.
        let weak = weak_against(&["fire", "flying"]);
        assert_eq!(weak, vec!["water", "electric", "rock"]);
        assert_eq!(
            PokemonType::effectiveness_against(
                PokemonType::Rock,
                &[PokemonType::Fire, PokemonType::Flying]
            ),
            4.0
        );
    }

    #[test]
    fn test_strong_against_unions_both_types() {
        let strong = strong_against(&["water", "ground"]);
        assert_eq!(strong, vec!["fire", "electric", "poison", "ground", "rock", "steel"]);
    }

    #[test]
    fn test_unknown_tags_contribute_nothing() {
        assert!(weak_against(&["shadow"]).is_empty());
        assert!(strong_against(&["shadow"]).is_empty());
    }
}
