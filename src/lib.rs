//! Client and cache layer for a remote music catalog.
//!
//! - `model`: tracks, artists, playlists, stations and search results
//! - `remote`: the blocking remote service boundary
//! - `session`: the cached, thread-safe client with async variants
//! - `dispatch`, `lock`, `events`: the concurrency building blocks it uses
//! - `config`, `logging`, `error`: ambient setup

pub mod logging;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod lock;
pub mod model;
pub mod remote;
pub mod session;

pub use config::ClientConfig;
pub use dispatch::Dispatcher;
pub use error::{ClientError, Result};
pub use events::{EventHook, Subscription};
pub use model::{Artist, Playlist, SearchResults, Station, Track, TrackKind};
pub use remote::{Credentials, FixtureRemote, RemoteService};
pub use session::{Session, SessionEvents};
