//! Pokedex Core - Domain model for the local catalog
//!
//! This crate provides the normalized records shared by every other crate:
//! - Natural keys for individuals (`IndividualKey`)
//! - Catalog entities (`Species`, `Move`, `Ability`, `Individual`)
//! - Base stats and the elemental type chart
//! - Owner/team bookkeeping with the six-member bound
//!
//! Nothing in here performs I/O. Persistence lives in `pokedex-db`,
//! remote fetching in `pokedex-source`.

mod entity;
mod error;
mod identity;
mod stats;
mod team;
pub mod types;

pub use entity::{Ability, Individual, Move, Species, SpeciesFlag, UNKNOWN};
pub use error::{Error, Result};
pub use identity::{normalize_name, IndividualKey};
pub use stats::{BaseStats, Stat};
pub use team::{AddOutcome, Catalog, Owner, Team, TeamState, TEAM_CAPACITY};
pub use types::PokemonType;
