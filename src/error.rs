//! Error taxonomy for the client layer

use thiserror::Error;

/// Everything that can go wrong between the caller and the remote service.
///
/// Lookups that simply find nothing are not errors and return `Option`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A track with none of its identifiers set.
    #[error("none of \"id\", \"track_id\" and \"store_id\" were set for this track")]
    MissingIdentifier,

    /// Station tracks were read before `load_station_tracks` ran.
    #[error("station {station_id} has no tracks loaded yet")]
    TracksNotLoaded { station_id: String },

    /// A playlist entry references a track that is not in the library cache.
    #[error("playlist entry references unknown library track {track_id}")]
    UnknownLibraryTrack { track_id: String },

    /// The remote response did not have the expected shape.
    #[error("malformed {what} in remote response: {source}")]
    Malformed {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The synchronous core panicked inside a background execution unit.
    #[error("operation aborted: {0}")]
    Aborted(String),

    #[error(transparent)]
    Remote(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    pub(crate) fn malformed(what: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self::Malformed { what, source }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}
