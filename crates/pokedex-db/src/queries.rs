//! Read-only queries over the catalog.
//!
//! Nothing here caps result sizes. Species come back ordered by name and
//! individuals by external ID.

use crate::error::{Error, Result};
use crate::models::*;
use crate::store::Store;
use pokedex_core::{Ability, Individual, IndividualKey, Move, Species, SpeciesFlag, Stat};
use std::collections::BTreeSet;

/// Filter over species rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeciesFilter {
    /// Case-insensitive substring of the name
    NameContains(String),
    /// Exact type tag (case-insensitive)
    Type(String),
    /// Exact generation name
    Generation(String),
    Flag(SpeciesFlag),
    /// Species seen with this move
    KnowsMove(String),
}

impl SpeciesFilter {
    pub fn matches(&self, species: &Species) -> bool {
        match self {
            SpeciesFilter::NameContains(fragment) => species
                .name
                .to_lowercase()
                .contains(&fragment.trim().to_lowercase()),
            SpeciesFilter::Type(tag) => species.has_type(tag),
            SpeciesFilter::Generation(generation) => {
                species.generation.eq_ignore_ascii_case(generation.trim())
            }
            SpeciesFilter::Flag(flag) => species.has_flag(*flag),
            SpeciesFilter::KnowsMove(name) => species.knows_move(name),
        }
    }
}

/// Row counts per record kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogCounts {
    pub species: usize,
    pub individuals: usize,
    pub moves: usize,
    pub abilities: usize,
    pub owners: usize,
    pub collections: usize,
    pub catalogs: usize,
}

impl Store {
    /// Species matching a filter.
    pub fn query_species(&self, filter: &SpeciesFilter) -> Result<Vec<Species>> {
        if let SpeciesFilter::Generation(generation) = filter {
            return self.species_by_generation(generation);
        }
        Ok(self
            .load_all::<StoredSpecies>()?
            .into_iter()
            .map(|s| s.to_species())
            .filter(|s| filter.matches(s))
            .collect())
    }

    /// Exact species lookup, failing with `NotFound`.
    pub fn species(&self, name: &str) -> Result<Species> {
        self.find_species(name)?
            .ok_or_else(|| Error::not_found("species", name))
    }

    /// Species by name; falls back to a case-insensitive match.
    pub fn find_species(&self, name: &str) -> Result<Option<Species>> {
        if let Some(stored) = self.get_by_key::<StoredSpecies>(name.to_string())? {
            return Ok(Some(stored.to_species()));
        }
        let wanted = name.trim().to_lowercase();
        Ok(self
            .load_all::<StoredSpecies>()?
            .into_iter()
            .find(|s| s.name.to_lowercase() == wanted)
            .map(|s| s.to_species()))
    }

    /// Individual by external ID or unique name.
    pub fn individual(&self, key: &IndividualKey) -> Result<Option<Individual>> {
        let r = self.db.r_transaction()?;
        let stored: Option<StoredIndividual> = match key {
            IndividualKey::Id(id) => r.get().primary(*id)?,
            IndividualKey::Name(name) => r
                .get()
                .secondary(StoredIndividualKey::name, name.as_str())?,
        };
        Ok(stored.map(|i| i.to_individual()))
    }

    pub fn individuals(&self) -> Result<Vec<Individual>> {
        Ok(self
            .load_all::<StoredIndividual>()?
            .into_iter()
            .map(|i| i.to_individual())
            .collect())
    }

    pub fn search_species_by_name(&self, fragment: &str) -> Result<Vec<Species>> {
        self.query_species(&SpeciesFilter::NameContains(fragment.to_string()))
    }

    pub fn species_by_type(&self, type_tag: &str) -> Result<Vec<Species>> {
        self.query_species(&SpeciesFilter::Type(type_tag.to_string()))
    }

    /// Species of one generation, via the generation index.
    pub fn species_by_generation(&self, generation: &str) -> Result<Vec<Species>> {
        let generation = generation.trim().to_lowercase();
        let r = self.db.r_transaction()?;
        let scan = r
            .scan()
            .secondary::<StoredSpecies>(StoredSpeciesKey::generation)?;
        let iter = scan.start_with(generation.as_str())?;
        let rows: std::result::Result<Vec<StoredSpecies>, _> = iter.collect();
        let rows = rows.map_err(|e| Error::Database(e.to_string()))?;
        // "generation-i" is a prefix of "generation-ii"
        let mut species: Vec<Species> = rows
            .into_iter()
            .filter(|s| s.generation == generation)
            .map(|s| s.to_species())
            .collect();
        species.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(species)
    }

    pub fn species_by_flag(&self, flag: SpeciesFlag) -> Result<Vec<Species>> {
        self.query_species(&SpeciesFilter::Flag(flag))
    }

    pub fn species_by_move(&self, move_name: &str) -> Result<Vec<Species>> {
        self.query_species(&SpeciesFilter::KnowsMove(move_name.to_string()))
    }

    /// Individuals whose `stat` lies in `[min, max]`. Individuals without the
    /// stat are left out.
    pub fn individuals_by_stat(&self, stat: Stat, min: u16, max: u16) -> Result<Vec<Individual>> {
        if min > max {
            return Err(Error::InvalidArgument(format!(
                "stat range {}..={} is empty",
                min, max
            )));
        }
        Ok(self
            .load_all::<StoredIndividual>()?
            .into_iter()
            .filter(|i| i.stats.in_range(stat, min, max))
            .map(|i| i.to_individual())
            .collect())
    }

    /// Individuals linked to an ability whose name contains `fragment`.
    pub fn individuals_by_ability(&self, fragment: &str) -> Result<Vec<Individual>> {
        let fragment = fragment.trim().to_lowercase();
        let ids: BTreeSet<u32> = self
            .load_all::<StoredLink>()?
            .into_iter()
            .filter(|l| l.kind == LinkKind::Ability && l.target.to_lowercase().contains(&fragment))
            .map(|l| l.individual_id)
            .collect();

        let r = self.db.r_transaction()?;
        let mut individuals = Vec::with_capacity(ids.len());
        for id in ids {
            let stored: Option<StoredIndividual> = r.get().primary(id)?;
            if let Some(stored) = stored {
                individuals.push(stored.to_individual());
            }
        }
        Ok(individuals)
    }

    fn links_of(&self, individual_id: u32, kind: LinkKind) -> Result<Vec<String>> {
        let r = self.db.r_transaction()?;
        let scan = r
            .scan()
            .secondary::<StoredLink>(StoredLinkKey::individual_id)?;
        let iter = scan.start_with(individual_id)?;
        let links: std::result::Result<Vec<StoredLink>, _> = iter.collect();
        let links = links.map_err(|e| Error::Database(e.to_string()))?;
        let mut names: Vec<String> = links
            .into_iter()
            .filter(|l| l.individual_id == individual_id && l.kind == kind)
            .map(|l| l.target)
            .collect();
        names.sort();
        Ok(names)
    }

    /// Moves linked to an individual.
    pub fn moves_of(&self, individual_id: u32) -> Result<Vec<Move>> {
        let mut moves = Vec::new();
        for name in self.links_of(individual_id, LinkKind::Move)? {
            if let Some(m) = self.get_move(&name)? {
                moves.push(m);
            }
        }
        Ok(moves)
    }

    /// Abilities linked to an individual.
    pub fn abilities_of(&self, individual_id: u32) -> Result<Vec<Ability>> {
        let mut abilities = Vec::new();
        for name in self.links_of(individual_id, LinkKind::Ability)? {
            if let Some(a) = self.get_ability(&name)? {
                abilities.push(a);
            }
        }
        Ok(abilities)
    }

    /// Every type tag used by a stored species, sorted.
    pub fn distinct_types(&self) -> Result<Vec<String>> {
        let types: BTreeSet<String> = self
            .load_all::<StoredSpecies>()?
            .into_iter()
            .flat_map(|s| s.types)
            .collect();
        Ok(types.into_iter().collect())
    }

    /// Every generation name used by a stored species, sorted.
    pub fn distinct_generations(&self) -> Result<Vec<String>> {
        let generations: BTreeSet<String> = self
            .load_all::<StoredSpecies>()?
            .into_iter()
            .map(|s| s.generation)
            .collect();
        Ok(generations.into_iter().collect())
    }

    pub fn counts(&self) -> Result<CatalogCounts> {
        Ok(CatalogCounts {
            species: self.count::<StoredSpecies>()?,
            individuals: self.count::<StoredIndividual>()?,
            moves: self.count::<StoredMove>()?,
            abilities: self.count::<StoredAbility>()?,
            owners: self.count::<StoredOwner>()?,
            collections: self.count::<StoredCollection>()?,
            catalogs: self.count::<StoredCatalog>()?,
        })
    }
}
