//! Base stats with a closed set of stat names

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the six base stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl Stat {
    /// All stats in display order
    pub const ALL: [Stat; 6] = [
        Stat::Hp,
        Stat::Attack,
        Stat::Defense,
        Stat::SpecialAttack,
        Stat::SpecialDefense,
        Stat::Speed,
    ];

    /// Name used by the remote source (e.g. `special-attack`)
    pub fn api_name(&self) -> &'static str {
        match self {
            Stat::Hp => "hp",
            Stat::Attack => "attack",
            Stat::Defense => "defense",
            Stat::SpecialAttack => "special-attack",
            Stat::SpecialDefense => "special-defense",
            Stat::Speed => "speed",
        }
    }

    /// Short label for tables
    pub fn label(&self) -> &'static str {
        match self {
            Stat::Hp => "HP",
            Stat::Attack => "Attack",
            Stat::Defense => "Defense",
            Stat::SpecialAttack => "Sp. Atk",
            Stat::SpecialDefense => "Sp. Def",
            Stat::Speed => "Speed",
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

impl FromStr for Stat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "hp" => Ok(Stat::Hp),
            "attack" | "atk" => Ok(Stat::Attack),
            "defense" | "def" => Ok(Stat::Defense),
            "special-attack" | "sp-atk" | "spa" => Ok(Stat::SpecialAttack),
            "special-defense" | "sp-def" | "spd" => Ok(Stat::SpecialDefense),
            "speed" | "spe" => Ok(Stat::Speed),
            _ => Err(Error::UnknownStat(s.to_string())),
        }
    }
}

/// Base stat block. A missing stat is `None`, never zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    #[serde(default)]
    pub hp: Option<u16>,
    #[serde(default)]
    pub attack: Option<u16>,
    #[serde(default)]
    pub defense: Option<u16>,
    #[serde(default)]
    pub special_attack: Option<u16>,
    #[serde(default)]
    pub special_defense: Option<u16>,
    #[serde(default)]
    pub speed: Option<u16>,
}

impl BaseStats {
    /// Build from `(stat-name, value)` pairs, ignoring names outside the six stats
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, u16)>,
    {
        let mut stats = Self::default();
        for (name, value) in pairs {
            if let Ok(stat) = name.parse::<Stat>() {
                stats.set(stat, value);
            }
        }
        stats
    }

    /// Get a stat value
    pub fn get(&self, stat: Stat) -> Option<u16> {
        match stat {
            Stat::Hp => self.hp,
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::SpecialAttack => self.special_attack,
            Stat::SpecialDefense => self.special_defense,
            Stat::Speed => self.speed,
        }
    }

    /// Set a stat value
    pub fn set(&mut self, stat: Stat, value: u16) {
        let slot = match stat {
            Stat::Hp => &mut self.hp,
            Stat::Attack => &mut self.attack,
            Stat::Defense => &mut self.defense,
            Stat::SpecialAttack => &mut self.special_attack,
            Stat::SpecialDefense => &mut self.special_defense,
            Stat::Speed => &mut self.speed,
        };
        *slot = Some(value);
    }

    /// Whether the stat is present and inside `[min, max]`
    pub fn in_range(&self, stat: Stat, min: u16, max: u16) -> bool {
        self.get(stat).is_some_and(|v| min <= v && v <= max)
    }

    /// Sum of the present stats
    pub fn total(&self) -> u32 {
        Stat::ALL
            .iter()
            .filter_map(|s| self.get(*s))
            .map(u32::from)
            .sum()
    }

    /// Present stats in display order
    pub fn iter(&self) -> impl Iterator<Item = (Stat, u16)> + '_ {
        Stat::ALL
            .iter()
            .filter_map(move |s| self.get(*s).map(|v| (*s, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stat_aliases() {
        assert_eq!("special-attack".parse::<Stat>().unwrap(), Stat::SpecialAttack);
        assert_eq!("Sp_Def".parse::<Stat>().unwrap(), Stat::SpecialDefense);
        assert_eq!("HP".parse::<Stat>().unwrap(), Stat::Hp);
        assert!("luck".parse::<Stat>().is_err());
    }

    #[test]
    fn test_from_pairs_skips_unknown() {
        let stats = BaseStats::from_pairs([("hp", 45), ("speed", 90), ("accuracy", 100)]);
        assert_eq!(stats.hp, Some(45));
        assert_eq!(stats.speed, Some(90));
        assert_eq!(stats.attack, None);
        assert_eq!(stats.total(), 135);
    }

    #[test]
    fn test_in_range_is_inclusive_and_excludes_missing() {
        let low = BaseStats::from_pairs([("hp", 45)]);
        let high = BaseStats::from_pairs([("hp", 100)]);
        let missing = BaseStats::default();

        assert!(low.in_range(Stat::Hp, 40, 60));
        assert!(low.in_range(Stat::Hp, 45, 45));
        assert!(!high.in_range(Stat::Hp, 40, 60));
        assert!(!missing.in_range(Stat::Hp, 0, u16::MAX));
    }

    #[test]
    fn test_partial_stats_from_ron() {
        let stats: BaseStats = ron::from_str("(hp: Some(35), speed: Some(90))").unwrap();
        assert_eq!(stats.get(Stat::Hp), Some(35));
        assert_eq!(stats.get(Stat::Defense), None);
        assert_eq!(stats.iter().count(), 2);
        assert!(!stats.is_empty());
    }
}
