//! Model module - entities returned by the remote service
//!
//! - `data`: serde shapes of remote responses
//! - `track`: tracks and their identity rules
//! - `artist`, `station`, `search`: the remaining catalog entities
//! - `playlist`: playlists and reconciliation of their entries with the library

pub mod data;
mod track;
mod artist;
mod playlist;
mod station;
mod search;

pub use track::{Track, TrackKind, find_track};
pub use artist::Artist;
pub use playlist::{Playlist, reconcile_entry};
pub use station::Station;
pub use search::SearchResults;
