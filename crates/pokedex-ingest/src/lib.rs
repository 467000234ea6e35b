//! Pokedex Ingest - Fetch-once, cache-and-dedup ingestion
//!
//! [`Ingestor`] turns external keys into persisted catalog rows:
//!
//! 1. Skip keys whose individual is already stored (no remote call).
//! 2. Fetch the raw individual. Failure here aborts that key only.
//! 3. Resolve the species, falling back to defaults when its metadata
//!    cannot be fetched.
//! 4. Resolve moves and abilities one by one, skipping the ones that fail.
//! 5. Persist the individual and its links in one transaction.
//!
//! Batch operations catch failures per key and summarize them in a
//! [`BatchSummary`].

mod config;
mod engine;
mod error;
mod report;

pub use config::{IngestConfig, MAX_GROUP_LIMIT, MAX_MOVE_LIMIT};
pub use engine::Ingestor;
pub use error::{Error, Result};
pub use report::{BatchSummary, IngestOutcome, IngestReport, SkipReason, Skipped, SubEntity};
