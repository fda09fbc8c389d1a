use serde_json::Value;

use super::artist::Artist;
use super::data::SearchData;
use super::track::Track;
use crate::error::{ClientError, Result};

/// Tracks and artists found for a query
#[derive(Clone, Debug, Default)]
pub struct SearchResults {
    tracks: Vec<Track>,
    artists: Vec<Artist>,
}

impl SearchResults {
    pub fn new(tracks: Vec<Track>, artists: Vec<Artist>) -> Self {
        Self { tracks, artists }
    }

    pub fn from_data(data: Value) -> Result<Self> {
        let data: SearchData =
            serde_json::from_value(data).map_err(ClientError::malformed("search results"))?;

        let tracks = data
            .song_hits
            .into_iter()
            .map(|hit| Track::try_from(hit.track))
            .collect::<Result<Vec<_>>>()?;
        let artists: Vec<Artist> = data.artist_hits.into_iter().map(|hit| hit.artist.into()).collect();

        Ok(Self::new(tracks, artists))
    }

    pub fn get_tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn get_artists(&self) -> &[Artist] {
        &self.artists
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty() && self.artists.is_empty()
    }
}
