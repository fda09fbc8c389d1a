//! Remote service backed by a JSON document, for offline use

use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{Credentials, RemoteService};

#[derive(Debug, Default, Deserialize)]
struct Account {
    email: String,
    password: String,
}

#[derive(Debug, Default, Deserialize)]
struct FixtureData {
    #[serde(default)]
    account: Account,
    #[serde(default)]
    library: Vec<Value>,
    #[serde(default)]
    catalog: Vec<Value>,
    #[serde(default)]
    artists: Vec<Value>,
    #[serde(default)]
    playlists: Vec<Value>,
    /// Station tracks keyed by seed track id
    #[serde(default)]
    stations: HashMap<String, Vec<Value>>,
    #[serde(default = "default_stream_base")]
    stream_url_base: String,
}

fn default_stream_base() -> String {
    "https://stream.invalid/track".to_string()
}

struct FixtureState {
    data: FixtureData,
    authenticated: bool,
    /// Station id to seed track id
    created_stations: HashMap<String, String>,
}

/// In-memory remote service loaded from a JSON file.
///
/// Library mutations are kept in memory and lost when the process exits.
pub struct FixtureRemote {
    state: RwLock<FixtureState>,
}

impl FixtureRemote {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("parsing fixture {}", path.display()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let data: FixtureData = serde_json::from_value(value).context("invalid fixture layout")?;
        tracing::debug!(
            library = data.library.len(),
            catalog = data.catalog.len(),
            playlists = data.playlists.len(),
            "Fixture loaded"
        );
        Ok(Self {
            state: RwLock::new(FixtureState {
                data,
                authenticated: false,
                created_stations: HashMap::new(),
            }),
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, FixtureState>> {
        self.state.read().map_err(|_| anyhow!("fixture state poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, FixtureState>> {
        self.state.write().map_err(|_| anyhow!("fixture state poisoned"))
    }

    fn authorized(&self) -> Result<RwLockReadGuard<'_, FixtureState>> {
        let state = self.read()?;
        if !state.authenticated {
            bail!("not authenticated");
        }
        Ok(state)
    }
}

fn field<'a>(value: &'a Value, name: &str) -> Option<&'a str> {
    value.get(name).and_then(Value::as_str)
}

fn matches_any_id(value: &Value, id: &str) -> bool {
    ["id", "storeId", "trackId"]
        .into_iter()
        .any(|name| field(value, name) == Some(id))
}

fn contains_ignore_case(value: &Value, name: &str, needle: &str) -> bool {
    field(value, name).is_some_and(|text| text.to_lowercase().contains(needle))
}

impl RemoteService for FixtureRemote {
    fn login(&self, credentials: &Credentials) -> Result<bool> {
        let mut state = self.write()?;
        let ok = credentials.email == state.data.account.email
            && credentials.password == state.data.account.password;
        state.authenticated = ok;
        Ok(ok)
    }

    fn logout(&self) -> Result<bool> {
        self.write()?.authenticated = false;
        Ok(true)
    }

    fn is_authenticated(&self) -> bool {
        self.read().map(|state| state.authenticated).unwrap_or(false)
    }

    fn get_all_songs(&self) -> Result<Value> {
        Ok(Value::Array(self.authorized()?.data.library.clone()))
    }

    fn get_all_user_playlist_contents(&self) -> Result<Value> {
        Ok(Value::Array(self.authorized()?.data.playlists.clone()))
    }

    fn get_station_tracks(&self, station_id: &str, num_tracks: usize) -> Result<Value> {
        let state = self.authorized()?;
        let seed = state
            .created_stations
            .get(station_id)
            .with_context(|| format!("unknown station {}", station_id))?;
        let tracks: Vec<Value> = state
            .data
            .stations
            .get(seed)
            .map(|tracks| tracks.iter().take(num_tracks).cloned().collect())
            .unwrap_or_default();
        Ok(Value::Array(tracks))
    }

    fn create_station(&self, name: &str, track_id: &str) -> Result<String> {
        drop(self.authorized()?);
        let mut state = self.write()?;
        let station_id = format!("station-{}", state.created_stations.len() + 1);
        tracing::debug!(station_id = %station_id, name, track_id, "Fixture station created");
        state.created_stations.insert(station_id.clone(), track_id.to_string());
        Ok(station_id)
    }

    fn search(&self, query: &str) -> Result<Value> {
        let state = self.authorized()?;
        let needle = query.to_lowercase();

        let song_hits: Vec<Value> = state
            .data
            .library
            .iter()
            .chain(state.data.catalog.iter())
            .filter(|track| {
                contains_ignore_case(track, "title", &needle) || contains_ignore_case(track, "artist", &needle)
            })
            .map(|track| json!({ "track": track }))
            .collect();
        let artist_hits: Vec<Value> = state
            .data
            .artists
            .iter()
            .filter(|artist| contains_ignore_case(artist, "name", &needle))
            .map(|artist| json!({ "artist": artist }))
            .collect();

        Ok(json!({ "song_hits": song_hits, "artist_hits": artist_hits }))
    }

    fn get_stream_url(&self, id: &str) -> Result<String> {
        let state = self.authorized()?;
        Ok(format!("{}/{}", state.data.stream_url_base, id))
    }

    fn add_store_tracks(&self, id: &str) -> Result<bool> {
        drop(self.authorized()?);
        let mut state = self.write()?;
        if state.data.library.iter().any(|track| matches_any_id(track, id)) {
            return Ok(false);
        }
        let Some(mut track) = state
            .data
            .catalog
            .iter()
            .find(|track| matches_any_id(track, id))
            .cloned()
        else {
            bail!("track {} is not in the catalog", id);
        };
        if let Some(object) = track.as_object_mut() {
            object.insert("id".to_string(), Value::String(format!("lib-{}", id)));
        }
        state.data.library.push(track);
        Ok(true)
    }

    fn delete_songs(&self, id: &str) -> Result<bool> {
        drop(self.authorized()?);
        let mut state = self.write()?;
        let before = state.data.library.len();
        state.data.library.retain(|track| !matches_any_id(track, id));
        Ok(state.data.library.len() != before)
    }
}
