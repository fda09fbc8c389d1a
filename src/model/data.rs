//! Response shapes returned by the remote service.
//!
//! These mirror the JSON the remote client library hands back. They are
//! converted into the entity types before leaving the crate.

use serde::{Deserialize, Deserializer};

/// A single track as it appears in library listings, station listings,
/// search hits and embedded playlist entries.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackData {
    pub id: Option<String>,
    pub track_id: Option<String>,
    pub store_id: Option<String>,
    pub title: String,
    pub artist: String,
    #[serde(deserialize_with = "millis")]
    pub duration_millis: u64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistData {
    pub artist_id: String,
    pub name: String,
}

/// One entry of a playlist. Entries for tracks that are also in the user's
/// library come back without the embedded `track` object.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistEntryData {
    pub track_id: String,
    pub track: Option<TrackData>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlaylistData {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tracks: Vec<PlaylistEntryData>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SongHit {
    pub track: TrackData,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ArtistHit {
    pub artist: ArtistData,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchData {
    #[serde(default)]
    pub song_hits: Vec<SongHit>,
    #[serde(default)]
    pub artist_hits: Vec<ArtistHit>,
}

/// Durations arrive as decimal strings from some endpoints and as numbers
/// from others.
fn millis<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Number(u64),
        Text(String),
    }

    match Millis::deserialize(deserializer)? {
        Millis::Number(n) => Ok(n),
        Millis::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}
