//! Playlists and reconciliation of their entries against the library cache

use serde_json::Value;

use super::data::{PlaylistData, PlaylistEntryData};
use super::track::{Track, find_track};
use crate::error::{ClientError, Result};

/// A remotely stored playlist. Track order is playback order.
#[derive(Clone, Debug)]
pub struct Playlist {
    id: String,
    pub name: String,
    pub tracks: Vec<Track>,
    unresolved: Vec<String>,
}

impl Playlist {
    /// Parse every playlist in a listing, resolving bare entries against `library`.
    pub fn from_data_many(data: Value, library: &[Track]) -> Result<Vec<Self>> {
        let data: Vec<PlaylistData> =
            serde_json::from_value(data).map_err(ClientError::malformed("playlist list"))?;
        data.into_iter()
            .map(|playlist| Self::from_playlist_data(playlist, library))
            .collect()
    }

    pub fn from_data(data: Value, library: &[Track]) -> Result<Self> {
        let data: PlaylistData =
            serde_json::from_value(data).map_err(ClientError::malformed("playlist"))?;
        Self::from_playlist_data(data, library)
    }

    fn from_playlist_data(data: PlaylistData, library: &[Track]) -> Result<Self> {
        let mut tracks = Vec::with_capacity(data.tracks.len());
        let mut unresolved = Vec::new();

        for entry in data.tracks {
            match reconcile_entry(entry, library) {
                Ok(track) => tracks.push(track),
                Err(ClientError::UnknownLibraryTrack { track_id }) => {
                    tracing::warn!(
                        playlist_id = %data.id,
                        track_id = %track_id,
                        "Playlist entry references a track missing from the library"
                    );
                    unresolved.push(track_id);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Self {
            id: data.id,
            name: data.name,
            tracks,
            unresolved,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Track ids of entries that could not be resolved against the library,
    /// in playlist order.
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Turn one playlist entry into a track.
///
/// Embedded track data is parsed as is. A bare entry is looked up in the
/// library; the found track is copied and only the copy's `track_id` is
/// replaced with the entry's.
pub fn reconcile_entry(entry: PlaylistEntryData, library: &[Track]) -> Result<Track> {
    if let Some(data) = entry.track {
        return Track::try_from(data);
    }

    let mut track = find_track(library, &entry.track_id)
        .cloned()
        .ok_or_else(|| ClientError::UnknownLibraryTrack {
            track_id: entry.track_id.clone(),
        })?;
    track.track_id = Some(entry.track_id);
    Ok(track)
}
