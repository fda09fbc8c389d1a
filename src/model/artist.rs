use super::data::ArtistData;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artist {
    id: String,
    pub name: String,
}

impl Artist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl From<ArtistData> for Artist {
    fn from(data: ArtistData) -> Self {
        Self::new(data.artist_id, data.name)
    }
}
