use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pokedex_db::Store;

mod commands;
mod config;
mod logging;
mod menu;
mod render;

use config::Config;

#[derive(Parser)]
#[command(name = "pokedex", about = "Local species catalog fed from PokeAPI")]
struct Cli {
    /// Configuration file (RON); defaults apply when it does not exist
    #[arg(long, global = true, default_value = "pokedex.ron")]
    config: PathBuf,
    /// Catalog database, overrides the configured path
    #[arg(long, global = true)]
    database: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Fetch one individual by external ID or name
    Ingest { key: String },
    /// Fetch every external ID in an inclusive range
    IngestRange { start: u32, end: u32 },
    /// Fetch members of a type
    IngestType {
        type_tag: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Fetch members of a generation
    IngestGeneration {
        number: u32,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Search the local catalog
    Search {
        #[command(subcommand)]
        by: SearchBy,
    },
    /// Show a species card
    Show { species: String },
    /// List the type tags in use
    Types,
    /// List the generations in use
    Generations,
    /// Show row counts
    Stats,
    /// Manage owners
    Owner {
        #[command(subcommand)]
        action: OwnerAction,
    },
    /// Manage an owner's teams
    Team {
        #[command(subcommand)]
        action: TeamAction,
    },
    /// Manage named species catalogs
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Interactive menu
    Menu,
}

#[derive(Debug, Clone, Subcommand)]
pub enum SearchBy {
    /// Species whose name contains the text
    Name { fragment: String },
    Type { type_tag: String },
    /// Generation number (`1`) or name (`generation-i`)
    Generation { generation: String },
    Legendary,
    Mythical,
    Baby,
    /// Individuals with a base stat in `[min, max]`
    Stat { stat: String, min: u16, max: u16 },
    /// Individuals with an ability whose name contains the text
    Ability { fragment: String },
    /// Species seen with a move
    Move { name: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum OwnerAction {
    Create {
        username: String,
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long, default_value = "")]
        city: String,
    },
    Show { username: String },
    List,
}

#[derive(Debug, Clone, Subcommand)]
pub enum TeamAction {
    Create { owner: String, name: String },
    List { owner: String },
    /// Add a stored individual (ID or name)
    Add {
        owner: String,
        team: String,
        individual: String,
    },
    /// Remove the member at a 1-based position
    Remove {
        owner: String,
        team: String,
        position: usize,
    },
    Delete { owner: String, team: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum CatalogAction {
    Create { name: String },
    /// Add a stored species
    Add { catalog: String, species: String },
    Show { name: String },
    /// Ingest keys and list their species in the catalog
    Build {
        name: String,
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(database) = &cli.database {
        config.database = database.display().to_string();
    }
    logging::init_tracing(config.log_filter.as_deref());

    let store = Store::open(&config.database)
        .with_context(|| format!("opening catalog {}", config.database))?;
    tracing::debug!(database = %config.database, "catalog ready");

    let ctx = commands::Context::new(store, config);
    let result = match cli.command {
        Command::Menu => menu::run(&ctx),
        command => commands::run(&ctx, command),
    };
    drop(ctx);
    result
}
