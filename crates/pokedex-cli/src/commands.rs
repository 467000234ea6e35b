//! Subcommand dispatch

use anyhow::{bail, Context as _, Result};
use pokedex_core::{AddOutcome, IndividualKey, Owner, SpeciesFlag, Stat, TEAM_CAPACITY};
use pokedex_db::Store;
use pokedex_ingest::Ingestor;
use pokedex_source::PokeApiClient;

use crate::config::Config;
use crate::render;
use crate::{CatalogAction, Command, OwnerAction, SearchBy, TeamAction};

/// Store handle and configuration shared by every command
pub struct Context {
    pub store: Store,
    pub config: Config,
}

impl Context {
    pub fn new(store: Store, config: Config) -> Self {
        Self { store, config }
    }

    fn ingestor(&self) -> Result<Ingestor<'_, PokeApiClient>> {
        let client = PokeApiClient::new(self.config.source.clone())
            .context("building the PokeAPI client")?;
        Ok(Ingestor::with_config(
            &self.store,
            client,
            self.config.ingest_config(),
        ))
    }
}

/// Run a command and print its output
pub fn run(ctx: &Context, command: Command) -> Result<()> {
    let output = execute(ctx, command)?;
    println!("{}", output);
    Ok(())
}

/// Run a command and return what it would print
pub fn execute(ctx: &Context, command: Command) -> Result<String> {
    let store = &ctx.store;
    match command {
        Command::Ingest { key } => {
            let key: IndividualKey = key.parse()?;
            let outcome = ctx.ingestor()?.ingest_individual(&key)?;
            Ok(render::outcome(&outcome))
        }
        Command::IngestRange { start, end } => {
            let summary = ctx.ingestor()?.ingest_range(start, end)?;
            Ok(render::summary(&summary))
        }
        Command::IngestType { type_tag, limit } => {
            let summary = ctx.ingestor()?.ingest_by_type(&type_tag, limit)?;
            Ok(render::summary(&summary))
        }
        Command::IngestGeneration { number, limit } => {
            let summary = ctx.ingestor()?.ingest_by_generation(number, limit)?;
            Ok(render::summary(&summary))
        }
        Command::Search { by } => search(store, by),
        Command::Show { species } => Ok(render::species_card(&store.species(&species)?)),
        Command::Types => Ok(render::list(&store.distinct_types()?, |t| t.clone())),
        Command::Generations => Ok(render::list(&store.distinct_generations()?, |g| g.clone())),
        Command::Stats => Ok(render::counts(&store.counts()?)),
        Command::Owner { action } => owner(store, action),
        Command::Team { action } => team(store, action),
        Command::Catalog { action } => catalog(ctx, action),
        Command::Menu => bail!("the menu is only available interactively"),
    }
}

fn search(store: &Store, by: SearchBy) -> Result<String> {
    let species = match by {
        SearchBy::Name { fragment } => store.search_species_by_name(&fragment)?,
        SearchBy::Type { type_tag } => store.species_by_type(&type_tag)?,
        SearchBy::Generation { generation } => {
            store.species_by_generation(&generation_name(&generation))?
        }
        SearchBy::Legendary => store.species_by_flag(SpeciesFlag::Legendary)?,
        SearchBy::Mythical => store.species_by_flag(SpeciesFlag::Mythical)?,
        SearchBy::Baby => store.species_by_flag(SpeciesFlag::Baby)?,
        SearchBy::Move { name } => store.species_by_move(&name)?,
        SearchBy::Stat { stat, min, max } => {
            let stat: Stat = stat.parse()?;
            let found = store.individuals_by_stat(stat, min, max)?;
            return Ok(render::list(&found, render::individual_line));
        }
        SearchBy::Ability { fragment } => {
            let found = store.individuals_by_ability(&fragment)?;
            return Ok(render::list(&found, render::individual_line));
        }
    };
    Ok(render::list(&species, render::species_line))
}

fn owner(store: &Store, action: OwnerAction) -> Result<String> {
    match action {
        OwnerAction::Create {
            username,
            display_name,
            city,
        } => {
            let display_name = display_name.unwrap_or_else(|| username.clone());
            let owner = store.create_owner(&Owner::new(&username, display_name, city))?;
            Ok(format!("Created owner {}", owner.username))
        }
        OwnerAction::Show { username } => Ok(render::owner_card(&store.owner(&username)?)),
        OwnerAction::List => {
            let owners = store.owners()?;
            Ok(render::list(&owners, |o| {
                format!("{} ({}, {} teams)", o.username, o.display_name, o.teams.len())
            }))
        }
    }
}

fn team(store: &Store, action: TeamAction) -> Result<String> {
    match action {
        TeamAction::Create { owner, name } => {
            let team = store.create_collection(&owner, &name)?;
            Ok(format!("Created team {} for {}", team.name, owner))
        }
        TeamAction::List { owner } => Ok(render::list(&store.collections(&owner)?, render::team_line)),
        TeamAction::Add {
            owner,
            team,
            individual,
        } => {
            let key: IndividualKey = individual.parse()?;
            let Some(found) = store.individual(&key)? else {
                bail!("{} is not in the catalog; ingest it first", key);
            };
            match store.add_to_collection(&owner, &team, found.external_id)? {
                AddOutcome::Added { position } => Ok(format!(
                    "Added #{} {} to {} at position {}",
                    found.external_id,
                    found.name,
                    team,
                    position + 1
                )),
                AddOutcome::TeamFull => Ok(format!(
                    "Team {} is full ({}/{}); {} was not added",
                    team, TEAM_CAPACITY, TEAM_CAPACITY, found.name
                )),
            }
        }
        TeamAction::Remove {
            owner,
            team,
            position,
        } => {
            if position == 0 {
                bail!("positions start at 1");
            }
            match store.remove_from_collection(&owner, &team, position - 1)? {
                Some(id) => Ok(format!("Removed #{} from {}", id, team)),
                None => Ok(format!("{} has no member at position {}", team, position)),
            }
        }
        TeamAction::Delete { owner, team } => {
            if store.delete_collection(&owner, &team)? {
                Ok(format!("Deleted team {}", team))
            } else {
                Ok(format!("{} has no team named {}", owner, team))
            }
        }
    }
}

fn catalog(ctx: &Context, action: CatalogAction) -> Result<String> {
    let store = &ctx.store;
    match action {
        CatalogAction::Create { name } => {
            let catalog = store.create_catalog(&name)?;
            Ok(format!("Catalog {} has {} species", catalog.name, catalog.species.len()))
        }
        CatalogAction::Add { catalog, species } => {
            let stored = store.species(&species)?;
            if store.add_to_catalog(&catalog, &stored.name)? {
                Ok(format!("Added {} to {}", stored.name, catalog))
            } else {
                Ok(format!("{} is already in {}", stored.name, catalog))
            }
        }
        CatalogAction::Show { name } => {
            let species = store.catalog_species(&name)?;
            Ok(render::list(&species, render::species_line))
        }
        CatalogAction::Build { name, keys } => {
            let keys = keys
                .iter()
                .map(|k| k.parse::<IndividualKey>())
                .collect::<std::result::Result<Vec<_>, _>>()?;
            let summary = ctx.ingestor()?.build_catalog(&name, &keys)?;
            Ok(render::summary(&summary))
        }
    }
}

/// `"1"` becomes `"generation-i"`; anything else is lowercased as is.
pub fn generation_name(input: &str) -> String {
    let input = input.trim();
    match input.parse::<u32>() {
        Ok(n) if n > 0 => format!("generation-{}", roman(n)),
        _ => input.to_lowercase(),
    }
}

fn roman(mut n: u32) -> String {
    const NUMERALS: [(u32, &str); 9] = [
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokedex_core::{BaseStats, Individual, Species};

    fn context() -> Context {
        let store = Store::in_memory().unwrap();
        store
            .upsert_species(&Species::new("pikachu", vec!["electric".to_string()]))
            .unwrap();
        store
            .insert_individual(
                &Individual {
                    external_id: 25,
                    name: "pikachu".to_string(),
                    species: "pikachu".to_string(),
                    height: 4,
                    weight: 60,
                    types: vec!["electric".to_string()],
                    stats: BaseStats::from_pairs([("hp", 35)]),
                },
                &[],
                &[],
            )
            .unwrap();
        Context::new(store, Config::default())
    }

    fn team_cmd(action: TeamAction) -> Command {
        Command::Team { action }
    }

    #[test]
    fn test_generation_name() {
        assert_eq!(generation_name("1"), "generation-i");
        assert_eq!(generation_name("4"), "generation-iv");
        assert_eq!(generation_name("9"), "generation-ix");
        assert_eq!(generation_name(" Generation-II "), "generation-ii");
        assert_eq!(generation_name("0"), "0");
    }

    #[test]
    fn test_team_flow() {
        let ctx = context();
        execute(
            &ctx,
            Command::Owner {
                action: OwnerAction::Create {
                    username: "Ash".to_string(),
                    display_name: None,
                    city: "Pallet".to_string(),
                },
            },
        )
        .unwrap();
        execute(
            &ctx,
            team_cmd(TeamAction::Create {
                owner: "ash".to_string(),
                name: "Kanto".to_string(),
            }),
        )
        .unwrap();

        let add = || {
            execute(
                &ctx,
                team_cmd(TeamAction::Add {
                    owner: "ash".to_string(),
                    team: "kanto".to_string(),
                    individual: "Pikachu".to_string(),
                }),
            )
            .unwrap()
        };
        assert!(add().contains("position 1"));
        for _ in 1..TEAM_CAPACITY {
            add();
        }
        assert!(add().contains("is full"));

        let missing = execute(
            &ctx,
            team_cmd(TeamAction::Add {
                owner: "ash".to_string(),
                team: "kanto".to_string(),
                individual: "150".to_string(),
            }),
        );
        assert!(missing.unwrap_err().to_string().contains("ingest it first"));

        let removed = execute(
            &ctx,
            team_cmd(TeamAction::Remove {
                owner: "ash".to_string(),
                team: "kanto".to_string(),
                position: 1,
            }),
        )
        .unwrap();
        assert_eq!(removed, "Removed #25 from kanto");

        let listed = execute(
            &ctx,
            team_cmd(TeamAction::List {
                owner: "ash".to_string(),
            }),
        )
        .unwrap();
        assert!(listed.contains("Kanto (5/6)"));
    }

    #[test]
    fn test_search_and_stats() {
        let ctx = context();
        let found = execute(
            &ctx,
            Command::Search {
                by: SearchBy::Name {
                    fragment: "PIKA".to_string(),
                },
            },
        )
        .unwrap();
        assert!(found.contains("pikachu [electric]"));

        let by_stat = execute(
            &ctx,
            Command::Search {
                by: SearchBy::Stat {
                    stat: "hp".to_string(),
                    min: 30,
                    max: 40,
                },
            },
        )
        .unwrap();
        assert!(by_stat.contains("#25 pikachu"));

        let none = execute(&ctx, Command::Search { by: SearchBy::Legendary }).unwrap();
        assert_eq!(none, "(none)");

        let stats = execute(&ctx, Command::Stats).unwrap();
        assert!(stats.contains("species: 1"));
        assert!(stats.contains("individuals: 1"));
    }

    #[test]
    fn test_catalog_add_and_show() {
        let ctx = context();
        execute(
            &ctx,
            Command::Catalog {
                action: CatalogAction::Create {
                    name: "Favourites".to_string(),
                },
            },
        )
        .unwrap();
        let added = execute(
            &ctx,
            Command::Catalog {
                action: CatalogAction::Add {
                    catalog: "favourites".to_string(),
                    species: "Pikachu".to_string(),
                },
            },
        )
        .unwrap();
        assert_eq!(added, "Added pikachu to favourites");

        let shown = execute(
            &ctx,
            Command::Catalog {
                action: CatalogAction::Show {
                    name: "FAVOURITES".to_string(),
                },
            },
        )
        .unwrap();
        assert!(shown.contains("pikachu"));
    }
}
