//! Owner, collection and catalog models.

use chrono::{DateTime, Utc};
use native_db::*;
use native_model::{native_model, Model};
use pokedex_core::{normalize_name, Catalog, Owner, Team};
use serde::{Deserialize, Serialize};

/// Stored owner. Teams live in [`StoredCollection`] rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 6, version = 1)]
#[native_db]
pub struct StoredOwner {
    /// Primary key - lowercased username.
    #[primary_key]
    pub username: String,
    pub display_name: String,
    pub city: String,
    pub is_admin: bool,
    pub is_approved: bool,
    pub registered_at: DateTime<Utc>,
}

impl StoredOwner {
    pub fn from_owner(owner: &Owner) -> Self {
        Self {
            username: normalize_name(&owner.username),
            display_name: owner.display_name.clone(),
            city: owner.city.clone(),
            is_admin: owner.is_admin,
            is_approved: owner.is_approved,
            registered_at: owner.registered_at,
        }
    }

    /// Convert to an Owner with the given teams attached.
    pub fn to_owner(&self, teams: Vec<Team>) -> Owner {
        Owner {
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            city: self.city.clone(),
            is_admin: self.is_admin,
            is_approved: self.is_approved,
            registered_at: self.registered_at,
            teams,
        }
    }
}

/// Stored collection (team), unique per owner and name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 7, version = 1)]
#[native_db]
pub struct StoredCollection {
    /// Primary key - "owner/name", both lowercased.
    #[primary_key]
    pub key: String,
    /// Owner username.
    #[secondary_key]
    pub owner: String,
    /// Display name as entered.
    pub name: String,
    /// Member external IDs in order.
    pub members: Vec<u32>,
    pub created_at: DateTime<Utc>,
}

impl StoredCollection {
    pub fn from_team(owner: &str, team: &Team) -> Self {
        Self {
            key: Self::key_for(owner, &team.name),
            owner: normalize_name(owner),
            name: team.name.clone(),
            members: team.members().to_vec(),
            created_at: team.created_at,
        }
    }

    pub fn to_team(&self) -> Team {
        Team::from_parts(self.name.clone(), self.members.clone(), self.created_at)
    }

    pub fn key_for(owner: &str, name: &str) -> String {
        format!("{}/{}", normalize_name(owner), normalize_name(name))
    }
}

/// Stored catalog (named list of species).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[native_model(id = 8, version = 1)]
#[native_db]
pub struct StoredCatalog {
    /// Primary key - lowercased catalog name.
    #[primary_key]
    pub name: String,
    pub species: Vec<String>,
}

impl StoredCatalog {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            name: normalize_name(&catalog.name),
            species: catalog.species.clone(),
        }
    }

    pub fn to_catalog(&self) -> Catalog {
        Catalog {
            name: self.name.clone(),
            species: self.species.clone(),
        }
    }
}
