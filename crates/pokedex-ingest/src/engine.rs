//! The ingestion engine

use crate::config::IngestConfig;
use crate::error::{Error, Result};
use crate::report::{BatchSummary, IngestOutcome, IngestReport, SkipReason, Skipped, SubEntity};
use pokedex_core::{
    Ability, BaseStats, Individual, IndividualKey, Move, PokemonType, Species, UNKNOWN,
};
use pokedex_db::Store;
use pokedex_source::{RawIndividual, RemoteSource};

/// Converts remote records into catalog rows, one key at a time.
///
/// Whether a key is already loaded is always answered by the store, so
/// re-running over overlapping ranges writes nothing new.
pub struct Ingestor<'a, S: RemoteSource> {
    store: &'a Store,
    source: S,
    config: IngestConfig,
}

impl<'a, S: RemoteSource> Ingestor<'a, S> {
    pub fn new(store: &'a Store, source: S) -> Self {
        Self::with_config(store, source, IngestConfig::default())
    }

    pub fn with_config(store: &'a Store, source: S, config: IngestConfig) -> Self {
        Self {
            store,
            source,
            config,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        self.store
    }

    /// Look up an already stored individual by key
    fn existing(&self, key: &IndividualKey) -> Result<Option<IngestOutcome>> {
        Ok(self
            .store
            .individual(key)?
            .map(|i| IngestOutcome::AlreadyPresent {
                external_id: i.external_id,
                name: i.name,
                species: i.species,
            }))
    }

    /// Ingest one individual by external ID or name.
    ///
    /// Nothing is written unless the top-level fetch succeeds. Sub-record
    /// failures are recorded in the report and never abort the call.
    pub fn ingest_individual(&self, key: &IndividualKey) -> Result<IngestOutcome> {
        if let Some(present) = self.existing(key)? {
            tracing::debug!(%key, "already in catalog, skipping fetch");
            return Ok(present);
        }

        let raw = self
            .source
            .individual(key)
            .map_err(|e| Error::fetch(key, e))?;

        // A name key may resolve to an ID we already hold under another name.
        if key.as_id() != Some(raw.id) {
            if let Some(present) = self.existing(&IndividualKey::Id(raw.id))? {
                return Ok(present);
            }
        }

        let mut skipped = Vec::new();
        let (species, species_created) = self.resolve_species(&raw, &mut skipped)?;

        let mut moves = Vec::new();
        for name in raw.moves.iter().take(self.config.move_limit()) {
            match self.resolve_move(name) {
                Ok(()) => moves.push(name.clone()),
                Err(reason) => skip(&mut skipped, SubEntity::Move, name, reason),
            }
        }

        let mut abilities = Vec::new();
        for name in &raw.abilities {
            match self.resolve_ability(name) {
                Ok(()) => abilities.push(name.clone()),
                Err(reason) => skip(&mut skipped, SubEntity::Ability, name, reason),
            }
        }

        let individual = Individual {
            external_id: raw.id,
            name: raw.name.clone(),
            species: species.clone(),
            height: raw.height,
            weight: raw.weight,
            types: raw.types.clone(),
            stats: stats_of(&raw),
        };

        match self.store.insert_individual(&individual, &moves, &abilities) {
            Ok(()) => {}
            Err(e) if e.is_constraint_violation() => {
                tracing::debug!(external_id = raw.id, "individual inserted concurrently, reusing");
                return Ok(IngestOutcome::AlreadyPresent {
                    external_id: individual.external_id,
                    name: individual.name,
                    species: individual.species,
                });
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            external_id = raw.id,
            name = %raw.name,
            species = %species,
            moves = moves.len(),
            abilities = abilities.len(),
            skipped = skipped.len(),
            "ingested individual"
        );

        Ok(IngestOutcome::Ingested(IngestReport {
            external_id: raw.id,
            name: raw.name,
            species,
            species_created,
            moves_linked: moves,
            abilities_linked: abilities,
            skipped,
        }))
    }

    /// Reuse or create the species row.
    ///
    /// Returns the name the species is stored under, which may differ in case
    /// from the remote name, and whether this call created it.
    fn resolve_species(
        &self,
        raw: &RawIndividual,
        skipped: &mut Vec<Skipped>,
    ) -> Result<(String, bool)> {
        if let Some(existing) = self.store.find_species(&raw.species_name)? {
            return Ok((existing.name, false));
        }

        let mut species = Species::new(raw.species_name.clone(), raw.types.clone());
        species.stats = stats_of(raw);
        if let Some(front) = &raw.sprites.front {
            species.sprite = front.clone();
            species.media.insert("sprite_front".to_string(), front.clone());
        }
        if let Some(back) = &raw.sprites.back {
            species.media.insert("sprite_back".to_string(), back.clone());
        }

        match self.source.species_metadata(&raw.species_name) {
            Ok(meta) => {
                species.is_legendary = meta.is_legendary;
                species.is_mythical = meta.is_mythical;
                species.is_baby = meta.is_baby;
                species.gender_ratio = meta.gender_ratio();
                species.generation = meta.generation.clone().unwrap_or_else(|| UNKNOWN.to_string());
                species.habitat = meta.habitat.clone().unwrap_or_else(|| UNKNOWN.to_string());
                species.evolution_chain = meta.evolution_chain;
            }
            Err(e) => skip(
                skipped,
                SubEntity::SpeciesMetadata,
                &raw.species_name,
                SkipReason::Fetch(e.to_string()),
            ),
        }

        let upserted = self.store.upsert_species(&species)?;
        Ok((upserted.row.name, upserted.created))
    }

    fn resolve_move(&self, name: &str) -> std::result::Result<(), SkipReason> {
        let stored = self
            .store
            .get_move(name)
            .map_err(|e| SkipReason::Store(e.to_string()))?;
        if stored.is_some() {
            return Ok(());
        }
        let raw = self
            .source
            .move_details(name)
            .map_err(|e| SkipReason::Fetch(e.to_string()))?;
        let m = Move {
            name: name.to_string(),
            description: raw.effect_text,
            type_tag: raw.type_tag,
            power: raw.power,
            accuracy: raw.accuracy.map(|a| a.min(100)),
            pp: raw.pp,
        };
        self.store
            .upsert_move(&m)
            .map_err(|e| SkipReason::Store(e.to_string()))?;
        Ok(())
    }

    fn resolve_ability(&self, name: &str) -> std::result::Result<(), SkipReason> {
        let stored = self
            .store
            .get_ability(name)
            .map_err(|e| SkipReason::Store(e.to_string()))?;
        if stored.is_some() {
            return Ok(());
        }
        let raw = self
            .source
            .ability_details(name)
            .map_err(|e| SkipReason::Fetch(e.to_string()))?;
        let ability = Ability {
            name: name.to_string(),
            description: raw.effect_text,
            effect: raw.short_effect,
        };
        self.store
            .upsert_ability(&ability)
            .map_err(|e| SkipReason::Store(e.to_string()))?;
        Ok(())
    }

    /// Ingest every key, catching failures per key.
    pub fn ingest_many(&self, keys: &[IndividualKey]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for key in keys {
            self.ingest_into(key, &mut summary);
        }
        summary
    }

    fn ingest_into(&self, key: &IndividualKey, summary: &mut BatchSummary) -> Option<IngestOutcome> {
        match self.ingest_individual(key) {
            Ok(outcome) => {
                summary.record_outcome(&outcome);
                Some(outcome)
            }
            Err(e) => {
                tracing::warn!(%key, error = %e, "ingestion failed, continuing");
                summary.record_failure(key, &e);
                None
            }
        }
    }

    /// Ingest every external ID in `[start, end]`.
    ///
    /// Bounds are checked before any remote call.
    pub fn ingest_range(&self, start: u32, end: u32) -> Result<BatchSummary> {
        let invalid = |reason: String| Error::InvalidRange { start, end, reason };
        if start > end {
            return Err(invalid("start is after end".to_string()));
        }
        if start < self.config.min_key() {
            return Err(invalid(format!(
                "keys start at {}",
                self.config.min_key()
            )));
        }
        if let Some(max) = self.config.max_key() {
            if end > max {
                return Err(invalid(format!("keys end at {}", max)));
            }
        }

        let mut summary = BatchSummary::default();
        for id in start..=end {
            self.ingest_into(&IndividualKey::Id(id), &mut summary);
        }
        tracing::info!(start, end, %summary, "range ingested");
        Ok(summary)
    }

    /// Ingest up to `limit` members of a type.
    pub fn ingest_by_type(&self, type_tag: &str, limit: Option<usize>) -> Result<BatchSummary> {
        let pokemon_type: PokemonType = type_tag
            .parse()
            .map_err(|e: pokedex_core::Error| Error::InvalidArgument(e.to_string()))?;
        let limit = self.config.effective_group_limit(limit);
        let keys = self
            .source
            .members_by_type(pokemon_type.tag(), limit)
            .map_err(|e| Error::fetch(format!("type/{}", pokemon_type), e))?;
        let summary = self.ingest_many(&keys[..keys.len().min(limit)]);
        tracing::info!(type_tag = %pokemon_type, %summary, "type ingested");
        Ok(summary)
    }

    /// Ingest up to `limit` members of a generation.
    pub fn ingest_by_generation(&self, number: u32, limit: Option<usize>) -> Result<BatchSummary> {
        if number == 0 {
            return Err(Error::InvalidArgument(
                "generations are numbered from 1".to_string(),
            ));
        }
        let limit = self.config.effective_group_limit(limit);
        let keys = self
            .source
            .members_by_generation(number, limit)
            .map_err(|e| Error::fetch(format!("generation/{}", number), e))?;
        let summary = self.ingest_many(&keys[..keys.len().min(limit)]);
        tracing::info!(generation = number, %summary, "generation ingested");
        Ok(summary)
    }

    /// Ingest each key and list its species in the named catalog.
    ///
    /// The catalog is created if absent. Keys that fail to ingest land in
    /// `failed`; stored keys whose species could not be listed land in
    /// `not_listed`.
    pub fn build_catalog(&self, catalog: &str, keys: &[IndividualKey]) -> Result<BatchSummary> {
        if catalog.trim().is_empty() {
            return Err(Error::InvalidArgument("catalog name is empty".to_string()));
        }
        self.store.create_catalog(catalog)?;

        let mut summary = BatchSummary::default();
        for key in keys {
            let Some(outcome) = self.ingest_into(key, &mut summary) else {
                continue;
            };
            if let Err(e) = self.store.add_to_catalog(catalog, outcome.species()) {
                tracing::warn!(%key, error = %e, "could not add species to catalog");
                summary.record_not_listed(key, &e);
            }
        }
        Ok(summary)
    }
}

fn skip(skipped: &mut Vec<Skipped>, kind: SubEntity, name: &str, reason: SkipReason) {
    tracing::warn!(%kind, name, %reason, "skipping sub-record");
    skipped.push(Skipped {
        kind,
        name: name.to_string(),
        reason,
    });
}

fn stats_of(raw: &RawIndividual) -> BaseStats {
    BaseStats::from_pairs(raw.stats.iter().map(|(name, value)| (name.as_str(), *value)))
}
