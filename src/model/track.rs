//! Track entity and its identity rules

use std::fmt;

use serde_json::Value;

use super::data::TrackData;
use crate::error::{ClientError, Result};

/// Where a track's authoritative identifier comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackKind {
    /// Identified by a playlist entry's track id
    Playlist,
    /// Identified by a catalog store id
    Store,
    /// Identified by a library item id (uploaded or saved track)
    Uploaded,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackKind::Playlist => "playlist",
            TrackKind::Store => "store",
            TrackKind::Uploaded => "uploaded",
        };
        f.write_str(name)
    }
}

/// A single track from the catalog, the library or a playlist.
///
/// At least one of `library_id`, `track_id` and `store_id` is expected to be
/// set. More than one may be populated after playlist reconciliation.
#[derive(Clone, Debug)]
pub struct Track {
    pub library_id: Option<String>,
    pub track_id: Option<String>,
    pub store_id: Option<String>,
    pub title: String,
    pub artist: String,
    pub duration_ms: u64,
}

impl Track {
    /// Parse a single track from a remote response fragment.
    pub fn from_data(data: Value) -> Result<Self> {
        let data: TrackData = serde_json::from_value(data).map_err(ClientError::malformed("track"))?;
        Self::try_from(data)
    }

    /// Parse a list of tracks, failing on the first malformed entry.
    pub fn from_data_many(data: Value) -> Result<Vec<Self>> {
        let data: Vec<TrackData> =
            serde_json::from_value(data).map_err(ClientError::malformed("track list"))?;
        data.into_iter().map(Self::try_from).collect()
    }

    /// Library id, else playlist track id, else store id.
    pub fn id(&self) -> Result<&str> {
        self.library_id
            .as_deref()
            .or(self.track_id.as_deref())
            .or(self.store_id.as_deref())
            .ok_or(ClientError::MissingIdentifier)
    }

    pub fn kind(&self) -> Result<TrackKind> {
        if self.track_id.is_some() {
            Ok(TrackKind::Playlist)
        } else if self.store_id.is_some() {
            Ok(TrackKind::Store)
        } else if self.library_id.is_some() {
            Ok(TrackKind::Uploaded)
        } else {
            Err(ClientError::MissingIdentifier)
        }
    }

    /// True if `any_id` equals any of the three identifiers.
    pub fn matches_id(&self, any_id: &str) -> bool {
        [&self.library_id, &self.track_id, &self.store_id]
            .into_iter()
            .any(|id| id.as_deref() == Some(any_id))
    }
}

impl TryFrom<TrackData> for Track {
    type Error = ClientError;

    fn try_from(data: TrackData) -> Result<Self> {
        let track = Track {
            library_id: non_empty(data.id),
            track_id: non_empty(data.track_id),
            store_id: non_empty(data.store_id),
            title: data.title,
            artist: data.artist,
            duration_ms: data.duration_millis,
        };
        track.id()?;
        Ok(track)
    }
}

/// Linear scan of `tracks` for one matching `any_id` by any identifier.
pub fn find_track<'a>(tracks: &'a [Track], any_id: &str) -> Option<&'a Track> {
    tracks.iter().find(|track| track.matches_id(any_id))
}

fn non_empty(id: Option<String>) -> Option<String> {
    id.filter(|s| !s.is_empty())
}

/// Tracks compare by the highest-priority identifier populated on either
/// side: track id, then store id, then library id. Tracks without any
/// identifier are never equal, so there is no `Eq`.
impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        let keys = [
            (&self.track_id, &other.track_id),
            (&self.store_id, &other.store_id),
            (&self.library_id, &other.library_id),
        ];
        keys.into_iter()
            .find(|(a, b)| a.is_some() || b.is_some())
            .is_some_and(|(a, b)| a == b)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Ok(kind) => write!(f, "<Track \"{} - {}\" from {}>", self.artist, self.title, kind),
            Err(_) => write!(f, "<Track \"{} - {}\" without id>", self.artist, self.title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn track(library_id: Option<&str>, track_id: Option<&str>, store_id: Option<&str>) -> Track {
        Track {
            library_id: library_id.map(String::from),
            track_id: track_id.map(String::from),
            store_id: store_id.map(String::from),
            title: "Title".to_string(),
            artist: "Artist".to_string(),
            duration_ms: 1000,
        }
    }

    #[test]
    fn id_follows_precedence() {
        assert_eq!(track(Some("l"), Some("t"), Some("s")).id().unwrap(), "l");
        assert_eq!(track(None, Some("t"), Some("s")).id().unwrap(), "t");
        assert_eq!(track(None, None, Some("s")).id().unwrap(), "s");
        assert!(matches!(
            track(None, None, None).id(),
            Err(ClientError::MissingIdentifier)
        ));
    }

    #[test]
    fn kind_follows_precedence() {
        assert_eq!(track(Some("l"), Some("t"), None).kind().unwrap(), TrackKind::Playlist);
        assert_eq!(track(Some("l"), None, Some("s")).kind().unwrap(), TrackKind::Store);
        assert_eq!(track(Some("l"), None, None).kind().unwrap(), TrackKind::Uploaded);
        assert!(track(None, None, None).kind().is_err());
    }

    #[test]
    fn equality_uses_highest_priority_identifier() {
        let a = track(Some("l1"), Some("t"), None);
        let mut b = track(Some("l2"), Some("t"), Some("s"));
        b.title = "Something else".to_string();
        assert_eq!(a, b);
        assert_eq!(b, a);

        let c = track(Some("l"), None, Some("s1"));
        let d = track(Some("l"), None, Some("s2"));
        assert_ne!(c, d);

        assert_eq!(track(Some("l"), None, None), track(Some("l"), None, None));
    }

    #[test]
    fn equality_is_symmetric_when_only_one_side_has_the_key() {
        let with_track_id = track(None, Some("t"), Some("s"));
        let store_only = track(None, None, Some("s"));
        assert_eq!(with_track_id == store_only, store_only == with_track_id);
        assert_ne!(with_track_id, store_only);
    }

    #[test]
    fn tracks_without_identifiers_are_never_equal() {
        let empty = track(None, None, None);
        assert_ne!(empty, empty.clone());
    }

    #[test]
    fn from_data_rejects_missing_identifiers() {
        let result = Track::from_data(json!({
            "title": "t", "artist": "a", "durationMillis": "1"
        }));
        assert!(matches!(result, Err(ClientError::MissingIdentifier)));

        let result = Track::from_data(json!({
            "id": "", "title": "t", "artist": "a", "durationMillis": "1"
        }));
        assert!(matches!(result, Err(ClientError::MissingIdentifier)));
    }

    #[test]
    fn from_data_rejects_wrong_shape() {
        let result = Track::from_data(json!({ "id": "x" }));
        assert!(matches!(result, Err(ClientError::Malformed { what: "track", .. })));
    }

    #[test]
    fn from_data_many_parses_in_order() {
        let tracks = Track::from_data_many(json!([
            { "id": "1", "title": "One", "artist": "A", "durationMillis": "100" },
            { "storeId": "2", "title": "Two", "artist": "B", "durationMillis": 200 },
        ]))
        .unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].title, "One");
        assert_eq!(tracks[1].kind().unwrap(), TrackKind::Store);
    }

    #[test]
    fn display_names_the_kind() {
        let t = track(None, None, Some("s"));
        assert_eq!(t.to_string(), "<Track \"Artist - Title\" from store>");
    }

    #[test]
    fn matches_any_identifier() {
        let t = track(Some("l"), Some("t"), Some("s"));
        assert!(t.matches_id("l"));
        assert!(t.matches_id("t"));
        assert!(t.matches_id("s"));
        assert!(!t.matches_id("x"));
    }
}
