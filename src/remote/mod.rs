//! Boundary to the remote music service
//!
//! The wire protocol belongs to the remote client library. This crate only
//! sees structured JSON responses or errors through [`RemoteService`].

mod fixture;

use anyhow::Result;
use serde_json::Value;

pub use fixture::FixtureRemote;

/// Login details sent to the remote service
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub device_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("device_id", &self.device_id)
            .finish()
    }
}

/// Blocking calls into the remote service.
///
/// Every method either returns a structured response or an error. Calls may
/// block on network I/O; the session never invokes them from an async task
/// directly.
pub trait RemoteService: Send + Sync {
    /// Returns whether authentication succeeded.
    fn login(&self, credentials: &Credentials) -> Result<bool>;

    fn logout(&self) -> Result<bool>;

    fn is_authenticated(&self) -> bool;

    /// Every track in the user's library.
    fn get_all_songs(&self) -> Result<Value>;

    /// Every user playlist with its entries.
    fn get_all_user_playlist_contents(&self) -> Result<Value>;

    fn get_station_tracks(&self, station_id: &str, num_tracks: usize) -> Result<Value>;

    /// Returns the id of the new station.
    fn create_station(&self, name: &str, track_id: &str) -> Result<String>;

    fn search(&self, query: &str) -> Result<Value>;

    fn get_stream_url(&self, id: &str) -> Result<String>;

    /// Returns whether the library was changed.
    fn add_store_tracks(&self, id: &str) -> Result<bool>;

    /// Returns whether the library was changed.
    fn delete_songs(&self, id: &str) -> Result<bool>;
}
