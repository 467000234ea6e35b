//! Per-key reports and batch summaries

use indexmap::IndexMap;
use std::fmt;

/// Kind of sub-record resolved during ingestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubEntity {
    SpeciesMetadata,
    Move,
    Ability,
}

impl fmt::Display for SubEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubEntity::SpeciesMetadata => write!(f, "species metadata"),
            SubEntity::Move => write!(f, "move"),
            SubEntity::Ability => write!(f, "ability"),
        }
    }
}

/// Why a sub-record was skipped or defaulted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The secondary remote lookup failed
    Fetch(String),
    /// The store rejected the sub-record
    Store(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Fetch(e) => write!(f, "fetch failed: {}", e),
            SkipReason::Store(e) => write!(f, "store failed: {}", e),
        }
    }
}

/// One skipped sub-record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub kind: SubEntity,
    pub name: String,
    pub reason: SkipReason,
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.name, self.reason)
    }
}

/// What one successful ingestion wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub external_id: u32,
    pub name: String,
    pub species: String,
    /// Whether this ingestion created the species row
    pub species_created: bool,
    pub moves_linked: Vec<String>,
    pub abilities_linked: Vec<String>,
    /// Sub-records that were skipped; species metadata here means defaults were applied
    pub skipped: Vec<Skipped>,
}

/// Result of ingesting one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Ingested(IngestReport),
    /// The individual was already stored; nothing was written
    AlreadyPresent {
        external_id: u32,
        name: String,
        species: String,
    },
}

impl IngestOutcome {
    pub fn external_id(&self) -> u32 {
        match self {
            IngestOutcome::Ingested(report) => report.external_id,
            IngestOutcome::AlreadyPresent { external_id, .. } => *external_id,
        }
    }

    pub fn species(&self) -> &str {
        match self {
            IngestOutcome::Ingested(report) => &report.species,
            IngestOutcome::AlreadyPresent { species, .. } => species,
        }
    }

    pub fn is_ingested(&self) -> bool {
        matches!(self, IngestOutcome::Ingested(_))
    }
}

/// Aggregate of a batch run
///
/// Every attempt lands in exactly one of `ingested`, `already_present` or
/// `failures`, so [`BatchSummary::total`] equals the number of keys given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub ingested: usize,
    pub already_present: usize,
    /// Failed attempts, counting a repeated key once per attempt
    pub failures: usize,
    /// Last error per failed key, in the order the keys first failed
    pub failed: IndexMap<String, String>,
    /// Keys that were stored but whose species could not be listed in a catalog
    pub not_listed: IndexMap<String, String>,
    pub skipped_sub_entities: usize,
}

impl BatchSummary {
    pub fn record_outcome(&mut self, outcome: &IngestOutcome) {
        match outcome {
            IngestOutcome::Ingested(report) => {
                self.ingested += 1;
                self.skipped_sub_entities += report.skipped.len();
            }
            IngestOutcome::AlreadyPresent { .. } => self.already_present += 1,
        }
    }

    pub fn record_failure(&mut self, key: impl ToString, error: impl ToString) {
        self.failures += 1;
        self.failed.insert(key.to_string(), error.to_string());
    }

    /// Record a stored key whose species was not added to the catalog
    pub fn record_not_listed(&mut self, key: impl ToString, error: impl ToString) {
        self.not_listed.insert(key.to_string(), error.to_string());
    }

    /// Keys attempted
    pub fn total(&self) -> usize {
        self.ingested + self.already_present + self.failures
    }

    pub fn is_clean(&self) -> bool {
        self.failures == 0 && self.not_listed.is_empty()
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ingested, {} already present, {} failed, {} sub-records skipped",
            self.ingested, self.already_present, self.failures, self.skipped_sub_entities
        )?;
        if !self.not_listed.is_empty() {
            write!(f, ", {} not added to the catalog", self.not_listed.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(skipped: usize) -> IngestReport {
        IngestReport {
            external_id: 1,
            name: "bulbasaur".to_string(),
            species: "bulbasaur".to_string(),
            species_created: true,
            moves_linked: Vec::new(),
            abilities_linked: Vec::new(),
            skipped: (0..skipped)
                .map(|i| Skipped {
                    kind: SubEntity::Move,
                    name: format!("move-{}", i),
                    reason: SkipReason::Fetch("timeout".to_string()),
                })
                .collect(),
        }
    }

    #[test]
    fn test_summary_counts_and_display() {
        let mut summary = BatchSummary::default();
        summary.record_outcome(&IngestOutcome::Ingested(report(2)));
        summary.record_outcome(&IngestOutcome::AlreadyPresent {
            external_id: 4,
            name: "charmander".to_string(),
            species: "charmander".to_string(),
        });
        summary.record_failure(5, "not found");

        assert_eq!(summary.total(), 3);
        assert!(!summary.is_clean());
        assert_eq!(
            summary.to_string(),
            "1 ingested, 1 already present, 1 failed, 2 sub-records skipped"
        );
        assert_eq!(summary.failed.get("5").map(String::as_str), Some("not found"));
    }

    #[test]
    fn test_repeated_failing_key_counts_each_attempt() {
        let mut summary = BatchSummary::default();
        summary.record_failure(5, "timeout");
        summary.record_failure(5, "connection reset");
        summary.record_failure(6, "timeout");

        assert_eq!(summary.failures, 3);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.failed.len(), 2);
        assert_eq!(
            summary.failed.get("5").map(String::as_str),
            Some("connection reset")
        );
        assert!(summary.to_string().contains("3 failed"));
    }

    #[test]
    fn test_not_listed_is_separate_from_attempts() {
        let mut summary = BatchSummary::default();
        summary.record_outcome(&IngestOutcome::Ingested(report(0)));
        summary.record_not_listed(1, "catalog not found: kanto");

        assert_eq!(summary.total(), 1);
        assert!(!summary.is_clean());
        assert_eq!(
            summary.to_string(),
            "1 ingested, 0 already present, 0 failed, 0 sub-records skipped, 1 not added to the catalog"
        );
    }

    #[test]
    fn test_skipped_display() {
        let skipped = &report(1).skipped[0];
        assert_eq!(skipped.to_string(), "move move-0: fetch failed: timeout");
    }
}
