//! Interactive menu over the same commands as the CLI

use anyhow::Result;
use dialoguer::{console::Term, Input, Select};

use crate::commands::{self, Context};
use crate::{CatalogAction, Command, OwnerAction, SearchBy, TeamAction};

#[derive(Debug, Clone, Copy)]
enum MenuItem {
    Ingest,
    IngestRange,
    IngestType,
    IngestGeneration,
    SearchName,
    SearchType,
    SearchGeneration,
    SearchStat,
    SearchAbility,
    Show,
    Stats,
    CreateOwner,
    ShowOwner,
    CreateTeam,
    AddToTeam,
    RemoveFromTeam,
    ShowCatalog,
    Quit,
}

impl MenuItem {
    const ALL: [MenuItem; 18] = [
        MenuItem::Ingest,
        MenuItem::IngestRange,
        MenuItem::IngestType,
        MenuItem::IngestGeneration,
        MenuItem::SearchName,
        MenuItem::SearchType,
        MenuItem::SearchGeneration,
        MenuItem::SearchStat,
        MenuItem::SearchAbility,
        MenuItem::Show,
        MenuItem::Stats,
        MenuItem::CreateOwner,
        MenuItem::ShowOwner,
        MenuItem::CreateTeam,
        MenuItem::AddToTeam,
        MenuItem::RemoveFromTeam,
        MenuItem::ShowCatalog,
        MenuItem::Quit,
    ];

    fn label(&self) -> &'static str {
        match self {
            MenuItem::Ingest => "Fetch an individual",
            MenuItem::IngestRange => "Fetch a range of IDs",
            MenuItem::IngestType => "Fetch by type",
            MenuItem::IngestGeneration => "Fetch by generation",
            MenuItem::SearchName => "Search species by name",
            MenuItem::SearchType => "Search species by type",
            MenuItem::SearchGeneration => "Search species by generation",
            MenuItem::SearchStat => "Search individuals by stat range",
            MenuItem::SearchAbility => "Search individuals by ability",
            MenuItem::Show => "Show a species",
            MenuItem::Stats => "Catalog statistics",
            MenuItem::CreateOwner => "Create an owner",
            MenuItem::ShowOwner => "Show an owner",
            MenuItem::CreateTeam => "Create a team",
            MenuItem::AddToTeam => "Add to a team",
            MenuItem::RemoveFromTeam => "Remove from a team",
            MenuItem::ShowCatalog => "Show a catalog",
            MenuItem::Quit => "Quit",
        }
    }
}

fn ask(prompt: &str) -> Result<String> {
    let answer: String = Input::new()
        .with_prompt(prompt)
        .interact_text_on(&Term::stderr())?;
    Ok(answer.trim().to_string())
}

fn ask_number<T>(prompt: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: ToString,
{
    let answer: String = Input::new()
        .with_prompt(prompt)
        .validate_with(|input: &String| {
            input
                .trim()
                .parse::<T>()
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text_on(&Term::stderr())?;
    answer
        .trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!(e.to_string()))
}

fn ask_limit() -> Result<Option<usize>> {
    let answer: String = Input::new()
        .with_prompt("Limit (blank for the default)")
        .allow_empty(true)
        .interact_text_on(&Term::stderr())?;
    Ok(answer.trim().parse().ok())
}

/// Build the command for a menu choice; `None` quits
fn prompt_command(item: MenuItem) -> Result<Option<Command>> {
    let command = match item {
        MenuItem::Quit => return Ok(None),
        MenuItem::Ingest => Command::Ingest {
            key: ask("ID or name")?,
        },
        MenuItem::IngestRange => Command::IngestRange {
            start: ask_number("First ID")?,
            end: ask_number("Last ID")?,
        },
        MenuItem::IngestType => Command::IngestType {
            type_tag: ask("Type")?,
            limit: ask_limit()?,
        },
        MenuItem::IngestGeneration => Command::IngestGeneration {
            number: ask_number("Generation number")?,
            limit: ask_limit()?,
        },
        MenuItem::SearchName => Command::Search {
            by: SearchBy::Name {
                fragment: ask("Name contains")?,
            },
        },
        MenuItem::SearchType => Command::Search {
            by: SearchBy::Type {
                type_tag: ask("Type")?,
            },
        },
        MenuItem::SearchGeneration => Command::Search {
            by: SearchBy::Generation {
                generation: ask("Generation (number or name)")?,
            },
        },
        MenuItem::SearchStat => Command::Search {
            by: SearchBy::Stat {
                stat: ask("Stat (hp, attack, defense, spa, spd, speed)")?,
                min: ask_number("Minimum")?,
                max: ask_number("Maximum")?,
            },
        },
        MenuItem::SearchAbility => Command::Search {
            by: SearchBy::Ability {
                fragment: ask("Ability contains")?,
            },
        },
        MenuItem::Show => Command::Show {
            species: ask("Species")?,
        },
        MenuItem::Stats => Command::Stats,
        MenuItem::CreateOwner => Command::Owner {
            action: OwnerAction::Create {
                username: ask("Username")?,
                display_name: Some(ask("Display name")?),
                city: ask("City")?,
            },
        },
        MenuItem::ShowOwner => Command::Owner {
            action: OwnerAction::Show {
                username: ask("Username")?,
            },
        },
        MenuItem::CreateTeam => Command::Team {
            action: TeamAction::Create {
                owner: ask("Owner")?,
                name: ask("Team name")?,
            },
        },
        MenuItem::AddToTeam => Command::Team {
            action: TeamAction::Add {
                owner: ask("Owner")?,
                team: ask("Team name")?,
                individual: ask("Individual ID or name")?,
            },
        },
        MenuItem::RemoveFromTeam => Command::Team {
            action: TeamAction::Remove {
                owner: ask("Owner")?,
                team: ask("Team name")?,
                position: ask_number("Position (from 1)")?,
            },
        },
        MenuItem::ShowCatalog => Command::Catalog {
            action: CatalogAction::Show {
                name: ask("Catalog")?,
            },
        },
    };
    Ok(Some(command))
}

/// Loop until the user quits. Command failures are printed, not fatal.
pub fn run(ctx: &Context) -> Result<()> {
    let labels: Vec<&str> = MenuItem::ALL.iter().map(|item| item.label()).collect();
    loop {
        let choice = Select::new()
            .with_prompt("Pokedex")
            .items(&labels)
            .default(0)
            .interact_on(&Term::stderr())?;

        let Some(command) = prompt_command(MenuItem::ALL[choice])? else {
            break;
        };
        match commands::execute(ctx, command) {
            Ok(output) => println!("{}", output),
            Err(e) => eprintln!("Error: {:#}", e),
        }
    }
    Ok(())
}
