//! Natural keys for catalog records

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key used to ask for an individual, either by external ID or by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndividualKey {
    /// Numeric external ID (e.g. `25`)
    Id(u32),
    /// Lowercased name (e.g. `"pikachu"`)
    Name(String),
}

impl IndividualKey {
    /// Create a name key, normalizing case and whitespace
    pub fn name(name: impl AsRef<str>) -> Self {
        Self::Name(normalize_name(name.as_ref()))
    }

    /// Get the numeric ID if this is an ID key
    pub fn as_id(&self) -> Option<u32> {
        match self {
            IndividualKey::Id(id) => Some(*id),
            IndividualKey::Name(_) => None,
        }
    }

    /// Path segment understood by the remote source
    pub fn as_path_segment(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for IndividualKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndividualKey::Id(id) => write!(f, "{}", id),
            IndividualKey::Name(name) => write!(f, "{}", name),
        }
    }
}

impl FromStr for IndividualKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidKey(s.to_string()));
        }
        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            return trimmed
                .parse::<u32>()
                .map(IndividualKey::Id)
                .map_err(|_| Error::InvalidKey(s.to_string()));
        }
        Ok(IndividualKey::name(trimmed))
    }
}

impl From<u32> for IndividualKey {
    fn from(id: u32) -> Self {
        IndividualKey::Id(id)
    }
}

impl From<&str> for IndividualKey {
    fn from(name: &str) -> Self {
        IndividualKey::name(name)
    }
}

/// Lowercase and trim a name so it can be used as a natural key
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_key() {
        let key: IndividualKey = " 25 ".parse().unwrap();
        assert_eq!(key, IndividualKey::Id(25));
        assert_eq!(key.as_id(), Some(25));
    }

    #[test]
    fn test_parse_name_key_is_lowercased() {
        let key: IndividualKey = "Pikachu".parse().unwrap();
        assert_eq!(key, IndividualKey::Name("pikachu".to_string()));
        assert_eq!(key.as_path_segment(), "pikachu");
    }

    #[test]
    fn test_parse_empty_key_fails() {
        assert!(matches!(
            "   ".parse::<IndividualKey>(),
            Err(Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_parse_overflowing_id_fails() {
        assert!("99999999999".parse::<IndividualKey>().is_err());
    }

    #[test]
    fn test_from_str_ref_normalizes() {
        assert_eq!(
            IndividualKey::from("  Mr-Mime "),
            IndividualKey::Name("mr-mime".to_string())
        );
        assert_eq!(IndividualKey::from(150u32).to_string(), "150");
    }
}
