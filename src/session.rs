//! Remote session client with library/playlist caching
//!
//! Every operation has a blocking form, which is the canonical implementation,
//! and an `*_async` form that runs it through the [`Dispatcher`] and reports
//! to a callback.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::events::EventHook;
use crate::lock::OperationLock;
use crate::model::{Playlist, SearchResults, Station, Track, find_track};
use crate::remote::{Credentials, RemoteService};
use crate::{log_api_request, log_api_result};

/// Notifications fired by the session
pub struct SessionEvents {
    /// Cached tracks and playlists were dropped; anything obtained earlier is stale.
    pub caches_invalidated: EventHook<()>,
    /// Authentication state flipped; payload is the new state.
    pub auth_state_changed: EventHook<bool>,
}

impl SessionEvents {
    fn new() -> Self {
        Self {
            caches_invalidated: EventHook::new("caches_invalidated"),
            auth_state_changed: EventHook::new("auth_state_changed"),
        }
    }
}

#[derive(Default)]
struct CacheState {
    tracks: Option<Arc<Vec<Track>>>,
    playlists: Option<Arc<Vec<Playlist>>>,
}

impl CacheState {
    fn clear(&mut self) {
        self.tracks = None;
        self.playlists = None;
    }
}

/// The single client of the remote service.
///
/// Construct once at startup and share the returned `Arc`. All cache reads
/// and writes, including the remote calls that feed them, go through one
/// lock. Events are fired after that lock is released.
pub struct Session {
    remote: Arc<dyn RemoteService>,
    config: ClientConfig,
    dispatcher: Dispatcher,
    caches: OperationLock<CacheState>,
    station_lock: OperationLock,
    events: SessionEvents,
}

impl Session {
    pub fn new(remote: Arc<dyn RemoteService>, config: ClientConfig, dispatcher: Dispatcher) -> Arc<Self> {
        Arc::new(Self {
            remote,
            config,
            dispatcher,
            caches: OperationLock::new("session_caches", CacheState::default()),
            station_lock: OperationLock::unit("create_station"),
            events: SessionEvents::new(),
        })
    }

    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ========================================================================
    // Cache state
    // ========================================================================

    /// Drop cached tracks and playlists and notify subscribers.
    pub fn invalidate_caches(&self) {
        self.caches.run(CacheState::clear);
        self.notify_invalidated();
    }

    fn notify_invalidated(&self) {
        tracing::info!("Caches invalidated");
        self.events.caches_invalidated.fire(&());
    }

    /// Library snapshot if cached, without touching the remote service.
    pub fn cached_tracks(&self) -> Option<Arc<Vec<Track>>> {
        self.caches.run(|caches| caches.tracks.clone())
    }

    pub fn cached_playlists(&self) -> Option<Arc<Vec<Playlist>>> {
        self.caches.run(|caches| caches.playlists.clone())
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.remote.is_authenticated()
    }

    /// Replace the current session with a fresh login.
    ///
    /// Caches are cleared whether or not authentication succeeds. The prior
    /// state is captured after the old session is logged out, so
    /// `auth_state_changed(true)` fires on every successful login and a
    /// failed login never fires.
    pub fn login(&self, credentials: &Credentials) -> Result<bool> {
        let (was_authenticated, now_authenticated, result) =
            self.caches.run(|caches| -> Result<(bool, bool, anyhow::Result<bool>)> {
                log_api_request!("logout");
                self.remote.logout()?;
                caches.clear();
                let was_authenticated = self.remote.is_authenticated();

                log_api_request!("login", email = %credentials.email, device_id = %credentials.device_id);
                let result = self.remote.login(credentials);
                log_api_result!("login", result);

                Ok((was_authenticated, self.remote.is_authenticated(), result))
            })?;

        self.notify_invalidated();
        self.notify_auth_state(was_authenticated, now_authenticated);
        Ok(result?)
    }

    pub fn logout(&self) -> Result<bool> {
        let (was_authenticated, now_authenticated, result) = self.caches.run(|caches| {
            let was_authenticated = self.remote.is_authenticated();
            log_api_request!("logout");
            let result = self.remote.logout();
            log_api_result!("logout", result);
            caches.clear();
            (was_authenticated, self.remote.is_authenticated(), result)
        });

        self.notify_invalidated();
        self.notify_auth_state(was_authenticated, now_authenticated);
        Ok(result?)
    }

    fn notify_auth_state(&self, was_authenticated: bool, now_authenticated: bool) {
        if was_authenticated != now_authenticated {
            tracing::info!(authenticated = now_authenticated, "Authentication state changed");
            self.events.auth_state_changed.fire(&now_authenticated);
        }
    }

    // ========================================================================
    // Library and playlists
    // ========================================================================

    /// Every track in "my library", fetched once per cache lifetime.
    pub fn get_all_tracks(&self) -> Result<Arc<Vec<Track>>> {
        self.caches.run(|caches| self.load_tracks(caches))
    }

    fn load_tracks(&self, caches: &mut CacheState) -> Result<Arc<Vec<Track>>> {
        if let Some(tracks) = &caches.tracks {
            tracing::trace!(count = tracks.len(), "Library cache hit");
            return Ok(Arc::clone(tracks));
        }

        log_api_request!("get_all_songs");
        let data = self.remote.get_all_songs();
        log_api_result!("get_all_songs", data);

        let tracks = Arc::new(Track::from_data_many(data?)?);
        tracing::info!(count = tracks.len(), "Library cache populated");
        caches.tracks = Some(Arc::clone(&tracks));
        Ok(tracks)
    }

    /// Every user playlist, with bare entries resolved against the library.
    ///
    /// Populates the library cache first if needed.
    pub fn get_all_user_playlist_contents(&self) -> Result<Arc<Vec<Playlist>>> {
        self.caches.run(|caches| -> Result<Arc<Vec<Playlist>>> {
            if let Some(playlists) = &caches.playlists {
                tracing::trace!(count = playlists.len(), "Playlist cache hit");
                return Ok(Arc::clone(playlists));
            }

            let library = self.load_tracks(caches)?;

            log_api_request!("get_all_user_playlist_contents");
            let data = self.remote.get_all_user_playlist_contents();
            log_api_result!("get_all_user_playlist_contents", data);

            let playlists = Arc::new(Playlist::from_data_many(data?, &library)?);
            let unresolved: usize = playlists.iter().map(|p| p.unresolved().len()).sum();
            if unresolved > 0 {
                tracing::warn!(unresolved, "Some playlist entries could not be resolved");
            }
            tracing::info!(count = playlists.len(), "Playlist cache populated");

            caches.playlists = Some(Arc::clone(&playlists));
            Ok(playlists)
        })
    }

    /// Library tracks keyed by [`Track::id`]. Empty if the library is not cached.
    pub fn get_cached_tracks_map(&self) -> Result<HashMap<String, Track>> {
        let Some(tracks) = self.cached_tracks() else {
            return Ok(HashMap::new());
        };
        tracks
            .iter()
            .map(|track| -> Result<(String, Track)> { Ok((track.id()?.to_string(), track.clone())) })
            .collect()
    }

    /// Find a cached library track by library id, store id or track id.
    pub fn get_track_by_id(&self, any_id: &str) -> Option<Track> {
        self.caches.run(|caches| {
            caches
                .tracks
                .as_deref()
                .and_then(|tracks| find_track(tracks, any_id))
                .cloned()
        })
    }

    /// Whether any of the track's identifiers is present in the cached library.
    pub fn is_in_my_library(&self, track: &Track) -> bool {
        let ids = [&track.library_id, &track.track_id, &track.store_id];
        ids.into_iter()
            .flatten()
            .any(|id| self.get_track_by_id(id).is_some())
    }

    pub fn add_to_my_library(&self, track: &Track) -> Result<bool> {
        let id = track.id()?;
        self.mutate_library("add_store_tracks", || self.remote.add_store_tracks(id))
    }

    pub fn remove_from_my_library(&self, track: &Track) -> Result<bool> {
        let id = track.id()?;
        self.mutate_library("delete_songs", || self.remote.delete_songs(id))
    }

    /// Run a library-changing remote call; a successful change makes both
    /// caches stale.
    fn mutate_library(&self, operation: &'static str, call: impl FnOnce() -> anyhow::Result<bool>) -> Result<bool> {
        let changed = self.caches.run(|caches| -> Result<bool> {
            log_api_request!(operation);
            let result = call();
            log_api_result!(operation, result);
            let changed = result?;
            if changed {
                caches.clear();
            }
            Ok(changed)
        })?;

        if changed {
            self.notify_invalidated();
        }
        Ok(changed)
    }

    // ========================================================================
    // Stateless calls
    // ========================================================================

    /// Playable URL for a track id. Valid for a limited time only.
    pub fn get_stream_url(&self, id: &str) -> Result<String> {
        log_api_request!("get_stream_url", id);
        let url = self.remote.get_stream_url(id);
        log_api_result!("get_stream_url", url);
        Ok(url?)
    }

    pub fn search(&self, query: &str) -> Result<SearchResults> {
        log_api_request!("search", query);
        let data = self.remote.search(query);
        log_api_result!("search", data);
        SearchResults::from_data(data?)
    }

    // ========================================================================
    // Stations
    // ========================================================================

    /// Create a station seeded from `track` and load its tracks.
    pub fn create_station(&self, track: &Track) -> Result<Station> {
        self.station_lock.run(|_| -> Result<Station> {
            let name = format!("Station - {}", track.title);
            let seed = track.id()?;

            log_api_request!("create_station", name = %name, seed);
            let station_id = self.remote.create_station(&name, seed);
            log_api_result!("create_station", station_id);

            let mut station = Station::new(station_id?);
            self.load_station_tracks(&mut station)?;
            Ok(station)
        })
    }

    /// Fetch the station's tracks, replacing any loaded earlier.
    pub fn load_station_tracks(&self, station: &mut Station) -> Result<()> {
        let limit = self.config.station_track_limit;
        log_api_request!("get_station_tracks", station_id = station.id(), limit);
        let data = self.remote.get_station_tracks(station.id(), limit);
        log_api_result!("get_station_tracks", data);

        let tracks = Track::from_data_many(data?)?;
        tracing::debug!(station_id = station.id(), count = tracks.len(), "Station loaded");
        station.set_tracks(tracks);
        Ok(())
    }

    // ========================================================================
    // Async variants
    // ========================================================================

    fn spawn<T, F, C, X>(self: &Arc<Self>, operation: &'static str, op: F, callback: C, extra: X)
    where
        T: Send + 'static,
        F: FnOnce(&Session) -> Result<T> + Send + 'static,
        C: FnOnce(Result<T>, X) + Send + 'static,
        X: Send + 'static,
    {
        let session = Arc::clone(self);
        self.dispatcher
            .dispatch(operation, move || op(session.as_ref()), callback, extra);
    }

    pub fn login_async<C, X>(self: &Arc<Self>, credentials: Credentials, callback: C, extra: X)
    where
        C: FnOnce(Result<bool>, X) + Send + 'static,
        X: Send + 'static,
    {
        self.spawn("login", move |s| s.login(&credentials), callback, extra);
    }

    pub fn logout_async<C, X>(self: &Arc<Self>, callback: C, extra: X)
    where
        C: FnOnce(Result<bool>, X) + Send + 'static,
        X: Send + 'static,
    {
        self.spawn("logout", Session::logout, callback, extra);
    }

    pub fn get_all_tracks_async<C, X>(self: &Arc<Self>, callback: C, extra: X)
    where
        C: FnOnce(Result<Arc<Vec<Track>>>, X) + Send + 'static,
        X: Send + 'static,
    {
        self.spawn("get_all_tracks", Session::get_all_tracks, callback, extra);
    }

    pub fn get_all_user_playlist_contents_async<C, X>(self: &Arc<Self>, callback: C, extra: X)
    where
        C: FnOnce(Result<Arc<Vec<Playlist>>>, X) + Send + 'static,
        X: Send + 'static,
    {
        self.spawn(
            "get_all_user_playlist_contents",
            Session::get_all_user_playlist_contents,
            callback,
            extra,
        );
    }

    pub fn get_stream_url_async<C, X>(self: &Arc<Self>, id: String, callback: C, extra: X)
    where
        C: FnOnce(Result<String>, X) + Send + 'static,
        X: Send + 'static,
    {
        self.spawn("get_stream_url", move |s| s.get_stream_url(&id), callback, extra);
    }

    /// Stream URL for `track`; the track is handed back to the callback.
    pub fn get_track_stream_url_async<C>(self: &Arc<Self>, track: Track, callback: C)
    where
        C: FnOnce(Result<String>, Track) + Send + 'static,
    {
        match track.id().map(str::to_string) {
            Ok(id) => self.get_stream_url_async(id, callback, track),
            Err(e) => self
                .dispatcher
                .dispatch("get_stream_url", move || Err(e), callback, track),
        }
    }

    pub fn search_async<C, X>(self: &Arc<Self>, query: String, callback: C, extra: X)
    where
        C: FnOnce(Result<SearchResults>, X) + Send + 'static,
        X: Send + 'static,
    {
        self.spawn("search", move |s| s.search(&query), callback, extra);
    }

    pub fn add_to_my_library_async<C, X>(self: &Arc<Self>, track: Track, callback: C, extra: X)
    where
        C: FnOnce(Result<bool>, X) + Send + 'static,
        X: Send + 'static,
    {
        self.spawn("add_to_my_library", move |s| s.add_to_my_library(&track), callback, extra);
    }

    pub fn remove_from_my_library_async<C, X>(self: &Arc<Self>, track: Track, callback: C, extra: X)
    where
        C: FnOnce(Result<bool>, X) + Send + 'static,
        X: Send + 'static,
    {
        self.spawn(
            "remove_from_my_library",
            move |s| s.remove_from_my_library(&track),
            callback,
            extra,
        );
    }

    pub fn create_station_async<C, X>(self: &Arc<Self>, track: Track, callback: C, extra: X)
    where
        C: FnOnce(Result<Station>, X) + Send + 'static,
        X: Send + 'static,
    {
        self.spawn("create_station", move |s| s.create_station(&track), callback, extra);
    }

    /// Load tracks into an owned station and hand it back once loaded.
    pub fn load_station_tracks_async<C, X>(self: &Arc<Self>, station: Station, callback: C, extra: X)
    where
        C: FnOnce(Result<Station>, X) + Send + 'static,
        X: Send + 'static,
    {
        self.spawn(
            "load_station_tracks",
            move |s| {
                let mut station = station;
                s.load_station_tracks(&mut station)?;
                Ok(station)
            },
            callback,
            extra,
        );
    }
}
