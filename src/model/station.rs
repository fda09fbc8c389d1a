use super::track::Track;
use crate::error::{ClientError, Result};

/// A server-generated radio seeded from a track.
///
/// Stations start out empty; tracks only become readable once
/// `Session::load_station_tracks` has run.
#[derive(Clone, Debug)]
pub struct Station {
    id: String,
    tracks: Option<Vec<Track>>,
}

impl Station {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tracks: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_loaded(&self) -> bool {
        self.tracks.is_some()
    }

    pub fn get_tracks(&self) -> Result<&[Track]> {
        self.tracks.as_deref().ok_or_else(|| ClientError::TracksNotLoaded {
            station_id: self.id.clone(),
        })
    }

    /// Replace the loaded tracks. Called again on every reload.
    pub(crate) fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = Some(tracks);
    }
}
