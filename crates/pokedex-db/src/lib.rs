//! Pokedex DB - Catalog store using native_db
//!
//! Provides persistent storage for:
//! - Species, moves, abilities and individuals, unique by natural key
//! - Individual-move and individual-ability association rows
//! - Owners, their collections (teams) and named catalogs
//!
//! The store enforces uniqueness itself: callers may check for existence
//! first, but a duplicate insert is always rejected by the database and
//! surfaced as [`Error::ConstraintViolation`].

mod error;
pub mod models;
mod queries;
mod store;

pub use error::{Error, Result};
pub use models::LinkKind;
pub use queries::{CatalogCounts, SpeciesFilter};
pub use store::{CatalogRecord, Store, Upserted};
