//! PokeAPI client with retry, exponential backoff and timeout.

use crate::error::{Error, Result};
use crate::records::{RawAbility, RawIndividual, RawMove, RawSpeciesMeta, RawSprites, RemoteSource};
use pokedex_core::IndividualKey;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the HTTP source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL of the API, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum number of retry attempts after the first request.
    pub max_retries: u32,
    /// Initial backoff (doubles each retry).
    pub initial_backoff_ms: u64,
    /// Backoff ceiling.
    pub max_backoff_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://pokeapi.co/api/v2".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 10_000,
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(20);
        let millis = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }
}

/// What to do with a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusClass {
    Success,
    NotFound,
    Retry,
    Reject,
}

fn classify(status: StatusCode) -> StatusClass {
    if status.is_success() {
        StatusClass::Success
    } else if status == StatusCode::NOT_FOUND {
        StatusClass::NotFound
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        StatusClass::Retry
    } else {
        StatusClass::Reject
    }
}

/// Blocking PokeAPI client.
#[derive(Debug)]
pub struct PokeApiClient {
    config: SourceConfig,
    http: reqwest::blocking::Client,
}

impl PokeApiClient {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("pokedex/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transient(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// GET a resource and decode it, retrying transient failures.
    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let mut last_err = String::new();

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff = self.config.backoff_for(attempt);
                tracing::debug!(
                    "source: retry attempt {}/{} for {} after {:?}",
                    attempt,
                    self.config.max_retries,
                    path,
                    backoff
                );
                std::thread::sleep(backoff);
            }

            let resp = match self.http.get(&url).send() {
                Ok(resp) => resp,
                Err(e) => {
                    last_err = e.to_string();
                    continue;
                }
            };

            let status = resp.status();
            match classify(status) {
                StatusClass::Success => match resp.json::<T>() {
                    Ok(value) => return Ok(value),
                    Err(e) if e.is_decode() => {
                        return Err(Error::Decode(format!("{}: {}", path, e)))
                    }
                    Err(e) => last_err = e.to_string(),
                },
                StatusClass::NotFound => {
                    return Err(Error::NotFound {
                        resource: path.to_string(),
                    })
                }
                StatusClass::Reject => {
                    return Err(Error::Request {
                        status: status.as_u16(),
                        url,
                    })
                }
                StatusClass::Retry => last_err = format!("HTTP {}", status),
            }
        }

        Err(Error::Transient(format!(
            "all {} retries exhausted for {}: {}",
            self.config.max_retries, path, last_err
        )))
    }
}

impl RemoteSource for PokeApiClient {
    fn individual(&self, key: &IndividualKey) -> Result<RawIndividual> {
        let dto: PokemonDto = self.get_json(&format!("pokemon/{}", key.as_path_segment()))?;
        Ok(dto.into_raw())
    }

    fn species_metadata(&self, species: &str) -> Result<RawSpeciesMeta> {
        let dto: SpeciesDto = self.get_json(&format!("pokemon-species/{}", species))?;
        Ok(dto.into_raw())
    }

    fn move_details(&self, name: &str) -> Result<RawMove> {
        let dto: MoveDto = self.get_json(&format!("move/{}", name))?;
        Ok(dto.into_raw())
    }

    fn ability_details(&self, name: &str) -> Result<RawAbility> {
        let dto: AbilityDto = self.get_json(&format!("ability/{}", name))?;
        Ok(dto.into_raw())
    }

    fn members_by_type(&self, type_tag: &str, limit: usize) -> Result<Vec<IndividualKey>> {
        let dto: TypeDto = self.get_json(&format!("type/{}", type_tag.trim().to_lowercase()))?;
        Ok(dto
            .pokemon
            .into_iter()
            .take(limit)
            .map(|m| m.pokemon.key())
            .collect())
    }

    fn members_by_generation(&self, number: u32, limit: usize) -> Result<Vec<IndividualKey>> {
        let dto: GenerationDto = self.get_json(&format!("generation/{}", number))?;
        let mut keys: Vec<IndividualKey> = dto
            .pokemon_species
            .into_iter()
            .map(|s| s.key())
            .collect();
        // The API lists generation members unordered.
        keys.sort_by_key(|k| k.as_id().unwrap_or(u32::MAX));
        keys.truncate(limit);
        Ok(keys)
    }
}

// --- Wire shapes ---

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
    #[serde(default)]
    url: String,
}

impl NamedResource {
    /// Numeric ID from a resource URL such as `.../pokemon-species/25/`.
    fn id(&self) -> Option<u32> {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .and_then(|segment| segment.parse().ok())
    }

    /// Species and default-form individuals share IDs, so prefer the ID.
    fn key(&self) -> IndividualKey {
        match self.id() {
            Some(id) => IndividualKey::Id(id),
            None => IndividualKey::name(&self.name),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UrlResource {
    url: String,
}

#[derive(Debug, Deserialize)]
struct TypeSlotDto {
    slot: u8,
    #[serde(rename = "type")]
    type_: NamedResource,
}

#[derive(Debug, Deserialize)]
struct AbilitySlotDto {
    ability: NamedResource,
}

#[derive(Debug, Deserialize)]
struct MoveSlotDto {
    #[serde(rename = "move")]
    move_: NamedResource,
}

#[derive(Debug, Deserialize)]
struct StatDto {
    base_stat: u16,
    stat: NamedResource,
}

#[derive(Debug, Default, Deserialize)]
struct SpritesDto {
    front_default: Option<String>,
    back_default: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PokemonDto {
    id: u32,
    name: String,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    weight: u32,
    species: NamedResource,
    #[serde(default)]
    types: Vec<TypeSlotDto>,
    #[serde(default)]
    abilities: Vec<AbilitySlotDto>,
    #[serde(default)]
    moves: Vec<MoveSlotDto>,
    #[serde(default)]
    stats: Vec<StatDto>,
    #[serde(default)]
    sprites: SpritesDto,
}

impl PokemonDto {
    fn into_raw(mut self) -> RawIndividual {
        self.types.sort_by_key(|t| t.slot);
        RawIndividual {
            id: self.id,
            name: self.name,
            species_name: self.species.name,
            types: self.types.into_iter().map(|t| t.type_.name).collect(),
            abilities: self.abilities.into_iter().map(|a| a.ability.name).collect(),
            moves: self.moves.into_iter().map(|m| m.move_.name).collect(),
            height: self.height,
            weight: self.weight,
            stats: self
                .stats
                .into_iter()
                .map(|s| (s.stat.name, s.base_stat))
                .collect(),
            sprites: RawSprites {
                front: self.sprites.front_default,
                back: self.sprites.back_default,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpeciesDto {
    #[serde(default)]
    is_legendary: bool,
    #[serde(default)]
    is_mythical: bool,
    #[serde(default)]
    is_baby: bool,
    generation: Option<NamedResource>,
    habitat: Option<NamedResource>,
    /// Female eighths, -1 for genderless
    #[serde(default = "genderless")]
    gender_rate: i8,
    evolution_chain: Option<UrlResource>,
}

fn genderless() -> i8 {
    -1
}

impl SpeciesDto {
    fn into_raw(self) -> RawSpeciesMeta {
        RawSpeciesMeta {
            is_legendary: self.is_legendary,
            is_mythical: self.is_mythical,
            is_baby: self.is_baby,
            generation: self.generation.map(|g| g.name),
            habitat: self.habitat.map(|h| h.name),
            gender_rate: u8::try_from(self.gender_rate).ok(),
            evolution_chain: self.evolution_chain.map(|c| c.url),
        }
    }
}

#[derive(Debug, Deserialize)]
struct EffectEntryDto {
    effect: String,
    #[serde(default)]
    short_effect: String,
    language: NamedResource,
}

/// English entry, else the first one.
fn english(entries: &[EffectEntryDto]) -> Option<&EffectEntryDto> {
    entries
        .iter()
        .find(|e| e.language.name == "en")
        .or_else(|| entries.first())
}

#[derive(Debug, Deserialize)]
struct MoveDto {
    name: String,
    power: Option<u16>,
    accuracy: Option<u8>,
    pp: Option<u8>,
    effect_chance: Option<u8>,
    #[serde(rename = "type")]
    type_: Option<NamedResource>,
    #[serde(default)]
    effect_entries: Vec<EffectEntryDto>,
}

impl MoveDto {
    fn into_raw(self) -> RawMove {
        let mut effect_text = english(&self.effect_entries)
            .map(|e| e.effect.clone())
            .unwrap_or_default();
        if let Some(chance) = self.effect_chance {
            effect_text = effect_text.replace("$effect_chance", &chance.to_string());
        }
        RawMove {
            name: self.name,
            effect_text,
            power: self.power,
            accuracy: self.accuracy,
            pp: self.pp,
            type_tag: self
                .type_
                .map(|t| t.name)
                .unwrap_or_else(|| pokedex_core::UNKNOWN.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AbilityDto {
    name: String,
    #[serde(default)]
    effect_entries: Vec<EffectEntryDto>,
}

impl AbilityDto {
    fn into_raw(self) -> RawAbility {
        let entry = english(&self.effect_entries);
        RawAbility {
            effect_text: entry.map(|e| e.effect.clone()).unwrap_or_default(),
            short_effect: entry.map(|e| e.short_effect.clone()).unwrap_or_default(),
            name: self.name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TypeMemberDto {
    pokemon: NamedResource,
}

#[derive(Debug, Deserialize)]
struct TypeDto {
    #[serde(default)]
    pokemon: Vec<TypeMemberDto>,
}

#[derive(Debug, Deserialize)]
struct GenerationDto {
    #[serde(default)]
    pokemon_species: Vec<NamedResource>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Answer every connection on a loopback port with the same response.
    fn serve(status: &'static str, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                counter.fetch_add(1, Ordering::SeqCst);
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        (base_url, hits)
    }

    fn local_client(base_url: String) -> PokeApiClient {
        PokeApiClient::new(SourceConfig {
            base_url,
            timeout_secs: 5,
            max_retries: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
        })
        .unwrap()
    }

    #[test]
    fn test_malformed_body_is_decode_error_without_retry() {
        let (base_url, hits) = serve("200 OK", r#"{"id": "not a number""#);
        let client = local_client(base_url);

        let err = client.individual(&IndividualKey::Id(1)).unwrap_err();
        assert!(matches!(err, Error::Decode(_)), "got {err:?}");
        assert!(!err.is_transient());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_server_errors_are_retried_then_transient() {
        let (base_url, hits) = serve("503 Service Unavailable", "");
        let client = local_client(base_url);

        let err = client.move_details("tackle").unwrap_err();
        assert!(err.is_transient(), "got {err:?}");
        assert_eq!(hits.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_missing_resource_is_not_retried() {
        let (base_url, hits) = serve("404 Not Found", "");
        let client = local_client(base_url);

        let err = client.ability_details("nothing").unwrap_err();
        assert!(err.is_not_found(), "got {err:?}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_doubles_up_to_ceiling() {
        let config = SourceConfig::default();
        assert_eq!(config.backoff_for(1), Duration::from_millis(500));
        assert_eq!(config.backoff_for(2), Duration::from_millis(1000));
        assert_eq!(config.backoff_for(3), Duration::from_millis(2000));
        assert_eq!(config.backoff_for(10), Duration::from_millis(10_000));
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(classify(StatusCode::OK), StatusClass::Success);
        assert_eq!(classify(StatusCode::NOT_FOUND), StatusClass::NotFound);
        assert_eq!(classify(StatusCode::BAD_GATEWAY), StatusClass::Retry);
        assert_eq!(classify(StatusCode::TOO_MANY_REQUESTS), StatusClass::Retry);
        assert_eq!(classify(StatusCode::BAD_REQUEST), StatusClass::Reject);
    }

    #[test]
    fn test_url_join_tolerates_slashes() {
        let client = PokeApiClient::new(SourceConfig {
            base_url: "http://localhost:8080/api/v2/".to_string(),
            ..SourceConfig::default()
        })
        .unwrap();
        assert_eq!(client.url("/pokemon/25"), "http://localhost:8080/api/v2/pokemon/25");
    }

    #[test]
    fn test_decode_pokemon_orders_types_by_slot() {
        let body = r#"{
            "id": 6, "name": "charizard", "height": 17, "weight": 905,
            "species": {"name": "charizard", "url": "https://pokeapi.co/api/v2/pokemon-species/6/"},
            "types": [
                {"slot": 2, "type": {"name": "flying", "url": ""}},
                {"slot": 1, "type": {"name": "fire", "url": ""}}
            ],
            "abilities": [{"ability": {"name": "blaze", "url": ""}, "is_hidden": false, "slot": 1}],
            "moves": [{"move": {"name": "mega-punch", "url": ""}}, {"move": {"name": "fire-punch", "url": ""}}],
            "stats": [{"base_stat": 78, "effort": 0, "stat": {"name": "hp", "url": ""}}],
            "sprites": {"front_default": "front.png", "back_default": null}
        }"#;
        let raw = serde_json::from_str::<PokemonDto>(body).unwrap().into_raw();
        assert_eq!(raw.types, vec!["fire", "flying"]);
        assert_eq!(raw.moves, vec!["mega-punch", "fire-punch"]);
        assert_eq!(raw.stats, vec![("hp".to_string(), 78)]);
        assert_eq!(raw.sprites.front.as_deref(), Some("front.png"));
        assert_eq!(raw.sprites.back, None);
    }

    #[test]
    fn test_decode_species_handles_genderless_and_missing_habitat() {
        let body = r#"{
            "is_legendary": true, "is_mythical": false, "is_baby": false,
            "generation": {"name": "generation-i", "url": ""},
            "habitat": null,
            "gender_rate": -1,
            "evolution_chain": {"url": "https://pokeapi.co/api/v2/evolution-chain/72/"}
        }"#;
        let meta = serde_json::from_str::<SpeciesDto>(body).unwrap().into_raw();
        assert!(meta.is_legendary);
        assert_eq!(meta.generation.as_deref(), Some("generation-i"));
        assert_eq!(meta.habitat, None);
        assert_eq!(meta.gender_ratio(), None);
        assert!(meta.evolution_chain.unwrap().ends_with("/72/"));
    }

    #[test]
    fn test_decode_move_prefers_english_effect() {
        let body = r#"{
            "name": "thunder-shock", "power": 40, "accuracy": 100, "pp": 30, "effect_chance": 10,
            "type": {"name": "electric", "url": ""},
            "effect_entries": [
                {"effect": "Kann paralysieren.", "short_effect": "", "language": {"name": "de", "url": ""}},
                {"effect": "Has a $effect_chance% chance to paralyze.", "short_effect": "", "language": {"name": "en", "url": ""}}
            ]
        }"#;
        let raw = serde_json::from_str::<MoveDto>(body).unwrap().into_raw();
        assert_eq!(raw.effect_text, "Has a 10% chance to paralyze.");
        assert_eq!(raw.type_tag, "electric");
        assert_eq!(raw.power, Some(40));
    }

    #[test]
    fn test_status_moves_have_no_power() {
        let body = r#"{"name": "growl", "power": null, "accuracy": 100, "pp": 40,
            "effect_chance": null, "type": {"name": "normal", "url": ""}, "effect_entries": []}"#;
        let raw = serde_json::from_str::<MoveDto>(body).unwrap().into_raw();
        assert_eq!(raw.power, None);
        assert_eq!(raw.effect_text, "");
    }

    #[test]
    fn test_member_keys_prefer_ids_from_urls() {
        let body = r#"{"pokemon_species": [
            {"name": "chikorita", "url": "https://pokeapi.co/api/v2/pokemon-species/152/"},
            {"name": "weird", "url": ""}
        ]}"#;
        let dto: GenerationDto = serde_json::from_str(body).unwrap();
        let keys: Vec<IndividualKey> = dto.pokemon_species.iter().map(|s| s.key()).collect();
        assert_eq!(keys, vec![IndividualKey::Id(152), IndividualKey::name("weird")]);
    }
}
