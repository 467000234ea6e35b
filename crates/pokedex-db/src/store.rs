//! Database store wrapper.

use crate::error::{Error, Result};
use crate::models::*;
use native_db::*;
use pokedex_core::{
    normalize_name, AddOutcome, Catalog, Individual, Owner, Species, Team,
};
use std::path::Path;
use std::sync::LazyLock;

// Static models for the database
static MODELS: LazyLock<Models> = LazyLock::new(|| {
    let mut models = Models::new();
    models.define::<StoredSpecies>().unwrap();
    models.define::<StoredMove>().unwrap();
    models.define::<StoredAbility>().unwrap();
    models.define::<StoredIndividual>().unwrap();
    models.define::<StoredLink>().unwrap();
    models.define::<StoredOwner>().unwrap();
    models.define::<StoredCollection>().unwrap();
    models.define::<StoredCatalog>().unwrap();
    models
});

/// A row type with an immutable natural primary key.
pub trait CatalogRecord: ToInput + Clone {
    /// Record kind used in errors and logs.
    const KIND: &'static str;

    /// Primary key type.
    type Key: ToKey + Clone + ToString;

    /// The natural key of this row.
    fn natural_key(&self) -> Self::Key;
}

impl CatalogRecord for StoredSpecies {
    const KIND: &'static str = "species";
    type Key = String;

    fn natural_key(&self) -> String {
        self.name.clone()
    }
}

impl CatalogRecord for StoredMove {
    const KIND: &'static str = "move";
    type Key = String;

    fn natural_key(&self) -> String {
        self.name.clone()
    }
}

impl CatalogRecord for StoredAbility {
    const KIND: &'static str = "ability";
    type Key = String;

    fn natural_key(&self) -> String {
        self.name.clone()
    }
}

impl CatalogRecord for StoredOwner {
    const KIND: &'static str = "owner";
    type Key = String;

    fn natural_key(&self) -> String {
        self.username.clone()
    }
}

impl CatalogRecord for StoredCatalog {
    const KIND: &'static str = "catalog";
    type Key = String;

    fn natural_key(&self) -> String {
        self.name.clone()
    }
}

/// Result of an upsert-by-key.
#[derive(Debug, Clone)]
pub struct Upserted<T> {
    /// The row now stored under the key (the existing one if it was present).
    pub row: T,
    /// Whether this call inserted the row.
    pub created: bool,
}

/// Database store for the local catalog.
///
/// One handle per process. All calls are blocking and are expected to come
/// from a single writer.
pub struct Store {
    pub(crate) db: Database<'static>,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Builder::new()
            .create(&MODELS, path.as_ref())
            .map_err(|e| Error::Database(e.to_string()))?;
        tracing::debug!(path = %path.as_ref().display(), "opened catalog store");
        Ok(Self { db })
    }

    /// Create an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let db = Builder::new()
            .create_in_memory(&MODELS)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(Self { db })
    }

    /// Fetch a row by natural key.
    pub fn get_by_key<T: CatalogRecord>(&self, key: T::Key) -> Result<Option<T>> {
        let r = self.db.r_transaction()?;
        let row: Option<T> = r.get().primary(key)?;
        Ok(row)
    }

    /// Fetch a row by natural key, failing with `NotFound` when absent.
    pub fn require<T: CatalogRecord>(&self, key: T::Key) -> Result<T> {
        let shown = key.to_string();
        self.get_by_key::<T>(key)?
            .ok_or_else(|| Error::not_found(T::KIND, shown))
    }

    /// Insert a row, failing with `ConstraintViolation` if any unique key is taken.
    pub fn insert<T: ToInput>(&self, row: T) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        rw.insert(row)?;
        rw.commit()?;
        Ok(())
    }

    /// Return the existing row for this key, or insert `row` and return it.
    ///
    /// Existing rows are never modified. A `ConstraintViolation` raised by the
    /// insert is resolved by re-reading the row that won.
    pub fn upsert_by_key<T: CatalogRecord>(&self, row: T) -> Result<Upserted<T>> {
        let key = row.natural_key();
        if let Some(existing) = self.get_by_key::<T>(key.clone())? {
            return Ok(Upserted {
                row: existing,
                created: false,
            });
        }

        match self.insert(row.clone()) {
            Ok(()) => Ok(Upserted { row, created: true }),
            Err(Error::ConstraintViolation(reason)) => match self.get_by_key::<T>(key)? {
                Some(existing) => Ok(Upserted {
                    row: existing,
                    created: false,
                }),
                None => Err(Error::ConstraintViolation(reason)),
            },
            Err(e) => Err(e),
        }
    }

    /// Load every row of a kind, ordered by primary key.
    pub fn load_all<T: ToInput>(&self) -> Result<Vec<T>> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<T>()?;
        let iter = scan.all()?;
        let rows: std::result::Result<Vec<T>, _> = iter.collect();
        rows.map_err(|e| Error::Database(e.to_string()))
    }

    /// Count rows of a kind.
    pub fn count<T: ToInput>(&self) -> Result<usize> {
        let r = self.db.r_transaction()?;
        let scan = r.scan().primary::<T>()?;
        let iter = scan.all()?;
        Ok(iter.count())
    }

    // --- Catalog entities ---

    /// Upsert a species by name.
    pub fn upsert_species(&self, species: &Species) -> Result<Upserted<Species>> {
        let upserted = self.upsert_by_key(StoredSpecies::from_species(species))?;
        Ok(Upserted {
            row: upserted.row.to_species(),
            created: upserted.created,
        })
    }

    /// Upsert a move by name.
    pub fn upsert_move(&self, m: &pokedex_core::Move) -> Result<Upserted<pokedex_core::Move>> {
        let upserted = self.upsert_by_key(StoredMove::from_move(m))?;
        Ok(Upserted {
            row: upserted.row.to_move(),
            created: upserted.created,
        })
    }

    /// Upsert an ability by name.
    pub fn upsert_ability(
        &self,
        ability: &pokedex_core::Ability,
    ) -> Result<Upserted<pokedex_core::Ability>> {
        let upserted = self.upsert_by_key(StoredAbility::from_ability(ability))?;
        Ok(Upserted {
            row: upserted.row.to_ability(),
            created: upserted.created,
        })
    }

    pub fn get_move(&self, name: &str) -> Result<Option<pokedex_core::Move>> {
        Ok(self
            .get_by_key::<StoredMove>(name.to_string())?
            .map(|m| m.to_move()))
    }

    pub fn get_ability(&self, name: &str) -> Result<Option<pokedex_core::Ability>> {
        Ok(self
            .get_by_key::<StoredAbility>(name.to_string())?
            .map(|a| a.to_ability()))
    }

    /// Persist an individual together with its association rows.
    ///
    /// Everything is written in one transaction: the individual, its link
    /// rows, and the additions to its species' move and ability sets. Either
    /// all of it is stored or none of it is. The species named by
    /// `individual.species` and every referenced move and ability must
    /// already exist. A duplicate external ID or name fails with
    /// `ConstraintViolation`.
    pub fn insert_individual(
        &self,
        individual: &Individual,
        moves: &[String],
        abilities: &[String],
    ) -> Result<()> {
        let rw = self.db.rw_transaction()?;
        rw.insert(StoredIndividual::from_individual(individual))?;
        for name in moves {
            Self::link_in(&rw, individual.external_id, name, LinkKind::Move)?;
        }
        for name in abilities {
            Self::link_in(&rw, individual.external_id, name, LinkKind::Ability)?;
        }
        Self::extend_species_in(&rw, &individual.species, moves, abilities)?;
        rw.commit()?;
        Ok(())
    }

    /// Link an existing individual to an existing move or ability.
    ///
    /// Returns `false` when the pair was already linked.
    pub fn link_association(&self, individual_id: u32, target: &str, kind: LinkKind) -> Result<bool> {
        let rw = self.db.rw_transaction()?;
        if rw
            .get()
            .primary::<StoredIndividual>(individual_id)?
            .is_none()
        {
            return Err(Error::not_found("individual", individual_id));
        }
        let created = Self::link_in(&rw, individual_id, target, kind)?;
        rw.commit()?;
        Ok(created)
    }

    fn link_in(
        rw: &transaction::RwTransaction<'_>,
        individual_id: u32,
        target: &str,
        kind: LinkKind,
    ) -> Result<bool> {
        let present = match kind {
            LinkKind::Move => rw.get().primary::<StoredMove>(target.to_string())?.is_some(),
            LinkKind::Ability => rw
                .get()
                .primary::<StoredAbility>(target.to_string())?
                .is_some(),
        };
        if !present {
            return Err(Error::not_found(
                match kind {
                    LinkKind::Move => "move",
                    LinkKind::Ability => "ability",
                },
                target,
            ));
        }

        let link = StoredLink::new(individual_id, target, kind);
        if rw.get().primary::<StoredLink>(link.key.clone())?.is_some() {
            return Ok(false);
        }
        rw.insert(link)?;
        Ok(true)
    }

    /// Append to a species' move and ability sets inside `rw`.
    fn extend_species_in(
        rw: &transaction::RwTransaction<'_>,
        species: &str,
        moves: &[String],
        abilities: &[String],
    ) -> Result<()> {
        let mut stored: StoredSpecies = rw
            .get()
            .primary(species.to_string())?
            .ok_or_else(|| Error::not_found("species", species))?;

        let mut added = false;
        for name in moves {
            added |= stored.moves.insert(name.clone());
        }
        for name in abilities {
            added |= stored.abilities.insert(name.clone());
        }
        if added {
            rw.upsert(stored)?;
        }
        Ok(())
    }

    // --- Owners and collections ---

    /// Create an owner. A taken username fails with `ConstraintViolation`.
    pub fn create_owner(&self, owner: &Owner) -> Result<Owner> {
        let stored = StoredOwner::from_owner(owner);
        self.insert(stored.clone())?;
        Ok(stored.to_owner(Vec::new()))
    }

    /// Load an owner with all of their collections.
    pub fn owner(&self, username: &str) -> Result<Owner> {
        let stored = self.require::<StoredOwner>(normalize_name(username))?;
        let teams = self.collections(&stored.username)?;
        Ok(stored.to_owner(teams))
    }

    /// All owners with their collections, ordered by username.
    pub fn owners(&self) -> Result<Vec<Owner>> {
        self.load_all::<StoredOwner>()?
            .into_iter()
            .map(|o| {
                let teams = self.collections(&o.username)?;
                Ok(o.to_owner(teams))
            })
            .collect()
    }

    /// Create an empty collection for an existing owner.
    pub fn create_collection(&self, owner: &str, name: &str) -> Result<Team> {
        let owner = self.require::<StoredOwner>(normalize_name(owner))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument("collection name is empty".to_string()));
        }
        let team = Team::new(name);
        self.insert(StoredCollection::from_team(&owner.username, &team))?;
        Ok(team)
    }

    /// An owner's collections in creation order.
    pub fn collections(&self, owner: &str) -> Result<Vec<Team>> {
        let owner = normalize_name(owner);
        let r = self.db.r_transaction()?;
        let scan = r
            .scan()
            .secondary::<StoredCollection>(StoredCollectionKey::owner)?;
        let iter = scan.start_with(owner.as_str())?;
        let rows: std::result::Result<Vec<StoredCollection>, _> = iter.collect();
        let mut rows = rows.map_err(|e| Error::Database(e.to_string()))?;
        rows.retain(|c| c.owner == owner);
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.key.cmp(&b.key)));
        Ok(rows.iter().map(|c| c.to_team()).collect())
    }

    /// One collection by owner and name.
    pub fn collection(&self, owner: &str, name: &str) -> Result<Team> {
        let key = StoredCollection::key_for(owner, name);
        Ok(self
            .stored_collection(&key)?
            .ok_or_else(|| Error::not_found("collection", key))?
            .to_team())
    }

    fn stored_collection(&self, key: &str) -> Result<Option<StoredCollection>> {
        let r = self.db.r_transaction()?;
        let row: Option<StoredCollection> = r.get().primary(key.to_string())?;
        Ok(row)
    }

    /// Add an existing individual to a collection.
    ///
    /// A full collection yields `AddOutcome::TeamFull` and is left unchanged.
    pub fn add_to_collection(&self, owner: &str, name: &str, external_id: u32) -> Result<AddOutcome> {
        let key = StoredCollection::key_for(owner, name);
        let rw = self.db.rw_transaction()?;
        if rw
            .get()
            .primary::<StoredIndividual>(external_id)?
            .is_none()
        {
            return Err(Error::not_found("individual", external_id));
        }
        let stored: StoredCollection = rw
            .get()
            .primary(key.clone())?
            .ok_or_else(|| Error::not_found("collection", key))?;

        let mut team = stored.to_team();
        let outcome = team.add(external_id);
        if outcome.is_added() {
            rw.upsert(StoredCollection::from_team(&stored.owner, &team))?;
            rw.commit()?;
        }
        Ok(outcome)
    }

    /// Remove the member at `position`; `None` if there is no such position.
    pub fn remove_from_collection(
        &self,
        owner: &str,
        name: &str,
        position: usize,
    ) -> Result<Option<u32>> {
        let key = StoredCollection::key_for(owner, name);
        let rw = self.db.rw_transaction()?;
        let stored: StoredCollection = rw
            .get()
            .primary(key.clone())?
            .ok_or_else(|| Error::not_found("collection", key))?;

        let mut team = stored.to_team();
        let removed = team.remove(position);
        if removed.is_some() {
            rw.upsert(StoredCollection::from_team(&stored.owner, &team))?;
            rw.commit()?;
        }
        Ok(removed)
    }

    /// Delete a collection, returning whether it existed.
    pub fn delete_collection(&self, owner: &str, name: &str) -> Result<bool> {
        let key = StoredCollection::key_for(owner, name);
        let rw = self.db.rw_transaction()?;
        let Some(stored) = rw.get().primary::<StoredCollection>(key)? else {
            return Ok(false);
        };
        rw.remove(stored)?;
        rw.commit()?;
        Ok(true)
    }

    // --- Catalogs ---

    /// Create a catalog, or return the existing one with that name.
    pub fn create_catalog(&self, name: &str) -> Result<Catalog> {
        if name.trim().is_empty() {
            return Err(Error::InvalidArgument("catalog name is empty".to_string()));
        }
        let upserted = self.upsert_by_key(StoredCatalog::from_catalog(&Catalog::new(name)))?;
        Ok(upserted.row.to_catalog())
    }

    /// Load a catalog by name.
    pub fn catalog(&self, name: &str) -> Result<Catalog> {
        Ok(self
            .require::<StoredCatalog>(normalize_name(name))?
            .to_catalog())
    }

    /// Add an existing species to a catalog. Returns `false` if already listed.
    pub fn add_to_catalog(&self, catalog: &str, species: &str) -> Result<bool> {
        let key = normalize_name(catalog);
        let rw = self.db.rw_transaction()?;
        let stored: StoredCatalog = rw
            .get()
            .primary(key.clone())?
            .ok_or_else(|| Error::not_found("catalog", key))?;
        if rw
            .get()
            .primary::<StoredSpecies>(species.to_string())?
            .is_none()
        {
            return Err(Error::not_found("species", species));
        }

        let mut catalog = stored.to_catalog();
        if !catalog.add(species) {
            return Ok(false);
        }
        rw.upsert(StoredCatalog::from_catalog(&catalog))?;
        rw.commit()?;
        Ok(true)
    }

    /// Species listed in a catalog, in catalog order.
    pub fn catalog_species(&self, catalog: &str) -> Result<Vec<Species>> {
        let catalog = self.catalog(catalog)?;
        let mut species = Vec::with_capacity(catalog.species.len());
        for name in &catalog.species {
            if let Some(s) = self.find_species(name)? {
                species.push(s);
            }
        }
        Ok(species)
    }
}

impl From<native_db::db_type::Error> for Error {
    fn from(err: native_db::db_type::Error) -> Self {
        match err {
            native_db::db_type::Error::DuplicateKey { key_name } => {
                Error::ConstraintViolation(format!("duplicate key {}", key_name))
            }
            other => Error::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokedex_core::{Ability, BaseStats, IndividualKey, Move, TEAM_CAPACITY};

    fn species(name: &str, types: &[&str]) -> Species {
        Species::new(name, types.iter().map(|t| t.to_string()).collect())
    }

    fn tackle() -> Move {
        Move {
            name: "tackle".to_string(),
            description: "Inflicts regular damage.".to_string(),
            type_tag: "normal".to_string(),
            power: Some(40),
            accuracy: Some(100),
            pp: Some(35),
        }
    }

    fn overgrow() -> Ability {
        Ability {
            name: "overgrow".to_string(),
            description: "Strengthens grass moves.".to_string(),
            effect: "Boosts Grass moves in a pinch.".to_string(),
        }
    }

    fn individual(id: u32, name: &str, species: &str) -> Individual {
        Individual {
            external_id: id,
            name: name.to_string(),
            species: species.to_string(),
            height: 7,
            weight: 69,
            types: vec!["grass".to_string()],
            stats: BaseStats::from_pairs([("hp", 45)]),
        }
    }

    fn seeded() -> Store {
        let store = Store::in_memory().unwrap();
        store.upsert_species(&species("bulbasaur", &["grass", "poison"])).unwrap();
        store.upsert_move(&tackle()).unwrap();
        store.upsert_ability(&overgrow()).unwrap();
        store
            .insert_individual(
                &individual(1, "bulbasaur", "bulbasaur"),
                &["tackle".to_string()],
                &["overgrow".to_string()],
            )
            .unwrap();
        store
    }

    #[test]
    fn test_upsert_reuses_existing_row() {
        let store = Store::in_memory().unwrap();
        let first = store.upsert_move(&tackle()).unwrap();
        assert!(first.created);

        let mut changed = tackle();
        changed.power = Some(999);
        let second = store.upsert_move(&changed).unwrap();
        assert!(!second.created);
        assert_eq!(second.row.power, Some(40));
        assert_eq!(store.count::<StoredMove>().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_insert_is_constraint_violation() {
        let store = Store::in_memory().unwrap();
        store.insert(StoredMove::from_move(&tackle())).unwrap();
        let err = store.insert(StoredMove::from_move(&tackle())).unwrap_err();
        assert!(err.is_constraint_violation(), "got {err:?}");
    }

    #[test]
    fn test_insert_individual_twice_is_rejected() {
        let store = seeded();
        let err = store
            .insert_individual(&individual(1, "bulbasaur", "bulbasaur"), &[], &[])
            .unwrap_err();
        assert!(err.is_constraint_violation());
        assert_eq!(store.count::<StoredIndividual>().unwrap(), 1);
    }

    #[test]
    fn test_individual_with_missing_move_is_not_persisted() {
        let store = seeded();
        let err = store
            .insert_individual(
                &individual(2, "ivysaur", "bulbasaur"),
                &["tackle".to_string(), "vine-whip".to_string()],
                &[],
            )
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.count::<StoredIndividual>().unwrap(), 1);
        assert_eq!(store.count::<StoredLink>().unwrap(), 2);
    }

    #[test]
    fn test_link_association_is_idempotent() {
        let store = seeded();
        assert!(!store.link_association(1, "tackle", LinkKind::Move).unwrap());
        assert_eq!(store.count::<StoredLink>().unwrap(), 2);
        assert!(store
            .link_association(99, "tackle", LinkKind::Move)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_insert_individual_extends_species_sets() {
        let store = seeded();
        let stored = store.species("bulbasaur").unwrap();
        assert!(stored.moves.contains("tackle"));
        assert!(stored.abilities.contains("overgrow"));

        // A second individual with the same links leaves the sets as they were.
        store
            .insert_individual(
                &individual(2, "ivysaur", "bulbasaur"),
                &["tackle".to_string()],
                &[],
            )
            .unwrap();
        let stored = store.species("bulbasaur").unwrap();
        assert_eq!(stored.moves.len(), 1);
        assert_eq!(stored.abilities.len(), 1);
    }

    #[test]
    fn test_individual_with_missing_species_is_not_persisted() {
        let store = seeded();
        let err = store
            .insert_individual(
                &individual(2, "ivysaur", "Ivysaur"),
                &["tackle".to_string()],
                &[],
            )
            .unwrap_err();
        assert!(err.is_not_found(), "got {err:?}");
        assert_eq!(store.count::<StoredIndividual>().unwrap(), 1);
        assert_eq!(store.count::<StoredLink>().unwrap(), 2);
        assert!(store.individual(&IndividualKey::Id(2)).unwrap().is_none());
    }

    #[test]
    fn test_owner_and_collection_lifecycle() {
        let store = seeded();
        store
            .create_owner(&Owner::new("Misty", "Misty", "Cerulean"))
            .unwrap();
        assert!(store
            .create_owner(&Owner::new("misty", "Other", ""))
            .unwrap_err()
            .is_constraint_violation());

        store.create_collection("misty", "Water Team").unwrap();
        assert!(store
            .create_collection("MISTY", "water team")
            .unwrap_err()
            .is_constraint_violation());
        assert!(store
            .create_collection("brock", "Rocks")
            .unwrap_err()
            .is_not_found());

        for _ in 0..TEAM_CAPACITY {
            assert!(store
                .add_to_collection("misty", "Water Team", 1)
                .unwrap()
                .is_added());
        }
        assert_eq!(
            store.add_to_collection("misty", "water team", 1).unwrap(),
            AddOutcome::TeamFull
        );
        assert_eq!(store.collection("misty", "water team").unwrap().len(), TEAM_CAPACITY);

        assert!(store
            .add_to_collection("misty", "water team", 42)
            .unwrap_err()
            .is_not_found());

        assert_eq!(
            store.remove_from_collection("misty", "water team", 0).unwrap(),
            Some(1)
        );
        let owner = store.owner("MISTY").unwrap();
        assert_eq!(owner.teams.len(), 1);
        assert_eq!(owner.teams[0].len(), TEAM_CAPACITY - 1);

        assert!(store.delete_collection("misty", "water team").unwrap());
        assert!(!store.delete_collection("misty", "water team").unwrap());
        assert!(store.owner("misty").unwrap().teams.is_empty());
    }

    #[test]
    fn test_collections_are_scoped_to_owner() {
        let store = seeded();
        store.create_owner(&Owner::new("ash", "Ash", "")).unwrap();
        store.create_owner(&Owner::new("ashley", "Ashley", "")).unwrap();
        store.create_collection("ash", "kanto").unwrap();
        store.create_collection("ashley", "johto").unwrap();

        let names: Vec<String> = store
            .collections("ash")
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["kanto"]);
        assert_eq!(store.owners().unwrap().len(), 2);
    }

    #[test]
    fn test_catalog_requires_existing_species() {
        let store = seeded();
        let catalog = store.create_catalog("Starters").unwrap();
        assert_eq!(catalog.name, "starters");

        assert!(store.add_to_catalog("starters", "bulbasaur").unwrap());
        assert!(!store.add_to_catalog("STARTERS", "bulbasaur").unwrap());
        assert!(store
            .add_to_catalog("starters", "mew")
            .unwrap_err()
            .is_not_found());

        let listed = store.catalog_species("Starters").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "bulbasaur");

        // Creating again reuses the existing catalog.
        assert_eq!(store.create_catalog("starters").unwrap().species.len(), 1);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        {
            let store = Store::open(&path).unwrap();
            store.upsert_move(&tackle()).unwrap();
        }
        let store = Store::open(&path).unwrap();
        assert!(store.get_move("tackle").unwrap().is_some());
    }
}
