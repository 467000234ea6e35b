//! Owner and team bookkeeping
//!
//! A team moves through `Empty -> Partial(1..=5) -> Full` as members are
//! added and back again as they are removed. Adding to a full team is not an
//! error: it returns [`AddOutcome::TeamFull`] and leaves the team untouched.

use crate::identity::normalize_name;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of individuals in a team
pub const TEAM_CAPACITY: usize = 6;

/// Fill state of a team
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamState {
    Empty,
    Partial(usize),
    Full,
}

/// Result of adding a member
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Added at this zero-based position
    Added { position: usize },
    /// The team already holds [`TEAM_CAPACITY`] members
    TeamFull,
}

impl AddOutcome {
    pub fn is_added(&self) -> bool {
        matches!(self, AddOutcome::Added { .. })
    }
}

/// A bounded, ordered group of individuals (by external ID)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    members: Vec<u32>,
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Create an empty team
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Rebuild a team from stored parts
    pub fn from_parts(name: String, members: Vec<u32>, created_at: DateTime<Utc>) -> Self {
        Self {
            name,
            members,
            created_at,
        }
    }

    pub fn members(&self) -> &[u32] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= TEAM_CAPACITY
    }

    pub fn state(&self) -> TeamState {
        match self.members.len() {
            0 => TeamState::Empty,
            n if n >= TEAM_CAPACITY => TeamState::Full,
            n => TeamState::Partial(n),
        }
    }

    /// Append a member unless the team is full
    pub fn add(&mut self, external_id: u32) -> AddOutcome {
        if self.is_full() {
            return AddOutcome::TeamFull;
        }
        self.members.push(external_id);
        AddOutcome::Added {
            position: self.members.len() - 1,
        }
    }

    /// Remove the member at `position`, shifting later members up
    pub fn remove(&mut self, position: usize) -> Option<u32> {
        if position < self.members.len() {
            Some(self.members.remove(position))
        } else {
            None
        }
    }
}

/// End-user account managing teams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Natural key, stored lowercased
    pub username: String,
    pub display_name: String,
    pub city: String,
    pub is_admin: bool,
    pub is_approved: bool,
    pub registered_at: DateTime<Utc>,
    pub teams: Vec<Team>,
}

impl Owner {
    /// Create an approved, non-admin owner with no teams
    pub fn new(
        username: impl AsRef<str>,
        display_name: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            username: normalize_name(username.as_ref()),
            display_name: display_name.into(),
            city: city.into(),
            is_admin: false,
            is_approved: true,
            registered_at: Utc::now(),
            teams: Vec::new(),
        }
    }
}

/// Named grouping of species
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Natural key, stored lowercased
    pub name: String,
    pub species: Vec<String>,
}

impl Catalog {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: normalize_name(name.as_ref()),
            species: Vec::new(),
        }
    }

    /// Append a species; adding one already present is a no-op returning false
    pub fn add(&mut self, species: impl Into<String>) -> bool {
        let species = species.into();
        if self.contains(&species) {
            return false;
        }
        self.species.push(species);
        true
    }

    pub fn contains(&self, species: &str) -> bool {
        self.find(species).is_some()
    }

    /// Case-insensitive exact lookup
    pub fn find(&self, species: &str) -> Option<&str> {
        let wanted = normalize_name(species);
        self.species
            .iter()
            .find(|s| s.to_lowercase() == wanted)
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_state_transitions() {
        let mut team = Team::new("Main");
        assert_eq!(team.state(), TeamState::Empty);

        assert_eq!(team.add(25), AddOutcome::Added { position: 0 });
        assert_eq!(team.state(), TeamState::Partial(1));

        for id in 1..=5 {
            assert!(team.add(id).is_added());
        }
        assert_eq!(team.state(), TeamState::Full);
    }

    #[test]
    fn test_seventh_add_is_rejected_without_mutation() {
        let mut team = Team::new("Main");
        for id in 1..=6 {
            assert!(team.add(id).is_added());
        }
        let before = team.members().to_vec();

        assert_eq!(team.add(7), AddOutcome::TeamFull);
        assert_eq!(team.len(), TEAM_CAPACITY);
        assert_eq!(team.members(), before.as_slice());
    }

    #[test]
    fn test_remove_frees_a_slot() {
        let mut team = Team::new("Main");
        for id in 1..=6 {
            let _ = team.add(id);
        }
        assert_eq!(team.remove(0), Some(1));
        assert_eq!(team.state(), TeamState::Partial(5));
        assert_eq!(team.members()[0], 2);
        assert_eq!(team.remove(10), None);
        assert_eq!(team.add(99), AddOutcome::Added { position: 5 });
    }

    #[test]
    fn test_owner_key_is_lowercased() {
        let owner = Owner::new("Ash", "Ash Ketchum", "Pallet Town");
        assert_eq!(owner.username, "ash");
        assert!(owner.is_approved);
        assert!(!owner.is_admin);
        assert!(owner.teams.is_empty());
    }

    #[test]
    fn test_catalog_add_is_idempotent() {
        let mut catalog = Catalog::new("Kanto Starters");
        assert_eq!(catalog.name, "kanto starters");
        assert!(catalog.add("bulbasaur"));
        assert!(!catalog.add("Bulbasaur"));
        assert_eq!(catalog.find("BULBASAUR"), Some("bulbasaur"));
        assert_eq!(catalog.species.len(), 1);
    }
}
