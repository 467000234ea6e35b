//! Plain-text rendering for terminal output

use pokedex_core::{Individual, Owner, Species, Team, TeamState, TEAM_CAPACITY};
use pokedex_db::CatalogCounts;
use pokedex_ingest::{BatchSummary, IngestOutcome};
use std::fmt::Write;

/// Rows shown before a list is cut short
pub const DISPLAY_LIMIT: usize = 20;

/// Render one line per item, at most [`DISPLAY_LIMIT`] of them
pub fn list<T>(items: &[T], line: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    let mut out = String::new();
    for item in items.iter().take(DISPLAY_LIMIT) {
        let _ = writeln!(out, "  {}", line(item));
    }
    if items.len() > DISPLAY_LIMIT {
        let _ = writeln!(out, "  ... and {} more", items.len() - DISPLAY_LIMIT);
    }
    out.trim_end().to_string()
}

pub fn species_line(species: &Species) -> String {
    format!(
        "{} [{}] {}",
        species.name,
        species.types.join("/"),
        species.generation
    )
}

pub fn individual_line(individual: &Individual) -> String {
    format!(
        "#{} {} ({}) total {}",
        individual.external_id,
        individual.name,
        individual.species,
        individual.stats.total()
    )
}

/// Full species card
pub fn species_card(species: &Species) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", species.name.to_uppercase());
    let _ = writeln!(out, "  Types:      {}", species.types.join(", "));
    let _ = writeln!(out, "  Generation: {}", species.generation);
    let _ = writeln!(out, "  Habitat:    {}", species.habitat);

    let mut flags = Vec::new();
    if species.is_legendary {
        flags.push("legendary");
    }
    if species.is_mythical {
        flags.push("mythical");
    }
    if species.is_baby {
        flags.push("baby");
    }
    if !flags.is_empty() {
        let _ = writeln!(out, "  Flags:      {}", flags.join(", "));
    }

    let gender = match species.gender_ratio {
        Some(female) => format!("{:.1}% female", female * 100.0),
        None => "genderless".to_string(),
    };
    let _ = writeln!(out, "  Gender:     {}", gender);

    if !species.stats.is_empty() {
        let _ = writeln!(out, "  Base stats:");
        for (stat, value) in species.stats.iter() {
            let _ = writeln!(out, "    {:<8} {:>3}", stat.label(), value);
        }
        let _ = writeln!(out, "    {:<8} {:>3}", "Total", species.stats.total());
    }

    let _ = writeln!(out, "  Weak to:    {}", or_none(&species.weak_against));
    let _ = writeln!(out, "  Strong vs:  {}", or_none(&species.strong_against));

    let moves: Vec<String> = species.moves.iter().cloned().collect();
    let abilities: Vec<String> = species.abilities.iter().cloned().collect();
    let _ = writeln!(out, "  Moves:      {}", or_none(&moves));
    let _ = writeln!(out, "  Abilities:  {}", or_none(&abilities));
    if let Some(chain) = &species.evolution_chain {
        let _ = writeln!(out, "  Evolution:  {}", chain);
    }
    if !species.sprite.is_empty() {
        let _ = writeln!(out, "  Sprite:     {}", species.sprite);
    }
    out.trim_end().to_string()
}

fn or_none(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

pub fn team_line(team: &Team) -> String {
    let members: Vec<String> = team.members().iter().map(|id| format!("#{}", id)).collect();
    let fill = match team.state() {
        TeamState::Full => format!("{}/{}, full", TEAM_CAPACITY, TEAM_CAPACITY),
        TeamState::Partial(n) => format!("{}/{}", n, TEAM_CAPACITY),
        TeamState::Empty => format!("0/{}", TEAM_CAPACITY),
    };
    format!("{} ({}): {}", team.name, fill, or_none(&members))
}

pub fn owner_card(owner: &Owner) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", owner.display_name, owner.username);
    if !owner.city.is_empty() {
        let _ = writeln!(out, "  City: {}", owner.city);
    }
    let _ = writeln!(
        out,
        "  Registered: {}",
        owner.registered_at.format("%Y-%m-%d")
    );
    let _ = writeln!(out, "  Teams:");
    let _ = write!(out, "{}", list(&owner.teams, team_line));
    out
}

pub fn counts(counts: &CatalogCounts) -> String {
    format!(
        "species: {}\nindividuals: {}\nmoves: {}\nabilities: {}\nowners: {}\nteams: {}\ncatalogs: {}",
        counts.species,
        counts.individuals,
        counts.moves,
        counts.abilities,
        counts.owners,
        counts.collections,
        counts.catalogs
    )
}

pub fn outcome(outcome: &IngestOutcome) -> String {
    match outcome {
        IngestOutcome::Ingested(report) => {
            let mut out = format!(
                "Ingested #{} {} ({}): {} moves, {} abilities",
                report.external_id,
                report.name,
                report.species,
                report.moves_linked.len(),
                report.abilities_linked.len()
            );
            for skipped in &report.skipped {
                let _ = write!(out, "\n  skipped {}", skipped);
            }
            out
        }
        IngestOutcome::AlreadyPresent {
            external_id, name, ..
        } => format!("#{} {} is already in the catalog", external_id, name),
    }
}

pub fn summary(summary: &BatchSummary) -> String {
    let mut out = summary.to_string();
    if !summary.failed.is_empty() {
        let failed: Vec<(&String, &String)> = summary.failed.iter().collect();
        let _ = write!(
            out,
            "\nFailed:\n{}",
            list(&failed, |(key, error)| format!("{}: {}", key, error))
        );
    }
    if !summary.not_listed.is_empty() {
        let not_listed: Vec<(&String, &String)> = summary.not_listed.iter().collect();
        let _ = write!(
            out,
            "\nNot added to the catalog:\n{}",
            list(&not_listed, |(key, error)| format!("{}: {}", key, error))
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokedex_core::BaseStats;

    #[test]
    fn test_list_truncates_with_remainder() {
        let items: Vec<u32> = (1..=25).collect();
        let out = list(&items, |i| i.to_string());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), DISPLAY_LIMIT + 1);
        assert_eq!(lines[0], "  1");
        assert_eq!(lines[DISPLAY_LIMIT], "  ... and 5 more");

        let short = list(&items[..3], |i| i.to_string());
        assert!(!short.contains("more"));
        assert_eq!(list::<u32>(&[], |i| i.to_string()), "(none)");
    }

    #[test]
    fn test_species_card() {
        let mut species = Species::new("pikachu", vec!["electric".to_string()]);
        species.stats = BaseStats::from_pairs([("hp", 35), ("speed", 90)]);
        species.is_baby = false;
        let card = species_card(&species);
        assert!(card.starts_with("PIKACHU"));
        assert!(card.contains("Weak to:    ground"));
        assert!(card.contains("Total    125"));
        assert!(card.contains("50.0% female"));
        assert!(!card.contains("Flags"));
    }

    #[test]
    fn test_team_line() {
        let mut team = Team::new("Kanto");
        let _ = team.add(25);
        let _ = team.add(1);
        assert_eq!(team_line(&team), "Kanto (2/6): #25, #1");
        assert_eq!(team_line(&Team::new("Empty")), "Empty (0/6): -");

        for id in 2..=5 {
            let _ = team.add(id);
        }
        assert!(team_line(&team).starts_with("Kanto (6/6, full): #25"));
    }
}
