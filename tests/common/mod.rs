#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use serde_json::{Value, json};

use gmusic_rs::{ClientConfig, Credentials, Dispatcher, RemoteService, Session};

pub const PASSWORD: &str = "secret";

/// Remote service double that records every call.
pub struct MockRemote {
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
    authenticated: AtomicBool,
    mutation_result: AtomicBool,
    library: Mutex<Value>,
    playlists: Mutex<Value>,
    station_requests: Mutex<Vec<(String, usize)>>,
}

impl MockRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            authenticated: AtomicBool::new(false),
            mutation_result: AtomicBool::new(true),
            library: Mutex::new(library_data()),
            playlists: Mutex::new(json!([])),
            station_requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls.lock().unwrap().get(operation).copied().unwrap_or(0)
    }

    /// Make `operation` return an error from now on.
    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn set_playlists(&self, playlists: Value) {
        *self.playlists.lock().unwrap() = playlists;
    }

    pub fn set_mutation_result(&self, changed: bool) {
        self.mutation_result.store(changed, Ordering::SeqCst);
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::SeqCst);
    }

    pub fn station_requests(&self) -> Vec<(String, usize)> {
        self.station_requests.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str) -> Result<()> {
        *self.calls.lock().unwrap().entry(operation).or_insert(0) += 1;
        if self.failing.lock().unwrap().contains(operation) {
            bail!("{} failed: service unavailable", operation);
        }
        Ok(())
    }
}

impl RemoteService for MockRemote {
    fn login(&self, credentials: &Credentials) -> Result<bool> {
        self.record("login")?;
        let ok = credentials.password == PASSWORD;
        self.authenticated.store(ok, Ordering::SeqCst);
        Ok(ok)
    }

    fn logout(&self) -> Result<bool> {
        self.record("logout")?;
        self.authenticated.store(false, Ordering::SeqCst);
        Ok(true)
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    fn get_all_songs(&self) -> Result<Value> {
        self.record("get_all_songs")?;
        Ok(self.library.lock().unwrap().clone())
    }

    fn get_all_user_playlist_contents(&self) -> Result<Value> {
        self.record("get_all_user_playlist_contents")?;
        Ok(self.playlists.lock().unwrap().clone())
    }

    fn get_station_tracks(&self, station_id: &str, num_tracks: usize) -> Result<Value> {
        self.record("get_station_tracks")?;
        self.station_requests
            .lock()
            .unwrap()
            .push((station_id.to_string(), num_tracks));
        Ok(json!([
            { "storeId": "radio-1", "title": "Radio One", "artist": "R", "durationMillis": "1000" },
            { "storeId": "radio-2", "title": "Radio Two", "artist": "R", "durationMillis": "2000" },
        ]))
    }

    fn create_station(&self, name: &str, track_id: &str) -> Result<String> {
        self.record("create_station")?;
        Ok(format!("{}|{}", name, track_id))
    }

    fn search(&self, query: &str) -> Result<Value> {
        self.record("search")?;
        Ok(json!({
            "song_hits": [
                { "track": { "storeId": "store-9", "title": query, "artist": "Hit", "durationMillis": "3000" } }
            ],
            "artist_hits": [
                { "artist": { "artistId": "artist-1", "name": "Hit" } }
            ]
        }))
    }

    fn get_stream_url(&self, id: &str) -> Result<String> {
        self.record("get_stream_url")?;
        Ok(format!("https://stream.test/{}", id))
    }

    fn add_store_tracks(&self, _id: &str) -> Result<bool> {
        self.record("add_store_tracks")?;
        Ok(self.mutation_result.load(Ordering::SeqCst))
    }

    fn delete_songs(&self, _id: &str) -> Result<bool> {
        self.record("delete_songs")?;
        Ok(self.mutation_result.load(Ordering::SeqCst))
    }
}

pub fn library_data() -> Value {
    json!([
        { "id": "lib-1", "storeId": "store-1", "title": "First", "artist": "Alpha", "durationMillis": "1000" },
        { "id": "lib-2", "storeId": "store-2", "title": "Second", "artist": "Beta", "durationMillis": "2000" },
        { "id": "lib-3", "title": "Third", "artist": "Gamma", "durationMillis": "3000" },
    ])
}

pub fn credentials(password: &str) -> Credentials {
    Credentials {
        email: "me@example.com".to_string(),
        password: password.to_string(),
        device_id: "test-device".to_string(),
    }
}

/// Session over `remote`; must be called inside a tokio runtime.
pub fn session(remote: &Arc<MockRemote>) -> Arc<Session> {
    let config = ClientConfig {
        station_track_limit: 25,
        ..ClientConfig::default()
    };
    Session::new(remote.clone(), config, Dispatcher::current().unwrap())
}
