//! Pokedex Source - Remote data adapter
//!
//! The ingestion engine only sees the [`RemoteSource`] trait and the raw
//! records in [`records`]. [`PokeApiClient`] implements it over HTTP with a
//! per-call timeout and bounded retry on transient failures.

mod error;
mod pokeapi;
pub mod records;

pub use error::{Error, Result};
pub use pokeapi::{PokeApiClient, SourceConfig};
pub use records::{RawAbility, RawIndividual, RawMove, RawSpeciesMeta, RawSprites, RemoteSource};
