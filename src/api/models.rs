//! Wire shapes of the upstream artist API.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::data::errors::ValidationError;

/// Root document of the API: URLs of the four resources. Absent keys decode
/// as empty so [`ApiIndex::validate`] can name the missing one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiIndex {
    pub artists: String,
    pub locations: String,
    pub dates: String,
    pub relation: String,
}

impl ApiIndex {
    /// Every resource URL must be present before any dependent fetch starts.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("artists", &self.artists),
            ("locations", &self.locations),
            ("dates", &self.dates),
            ("relation", &self.relation),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::EmptyUrl(field));
            }
        }
        Ok(())
    }
}

/// An artist as returned by the `artists` resource. The last three fields are
/// URLs of the per-artist enrichment resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArtist {
    pub id: i32,
    pub image: String,
    pub name: String,
    pub members: Vec<String>,
    pub creation_date: i32,
    pub first_album: String,
    #[serde(default)]
    pub locations: String,
    #[serde(default)]
    pub concert_dates: String,
    #[serde(default)]
    pub relations: String,
}

impl RawArtist {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |reason: &'static str| ValidationError::InvalidArtist {
            id: self.id,
            reason,
        };
        if self.id <= 0 {
            return Err(invalid("id must be positive"));
        }
        if self.name.trim().is_empty() {
            return Err(invalid("name is required"));
        }
        if self.creation_date <= 0 {
            return Err(invalid("creation date must be positive"));
        }
        if self.members.is_empty() {
            return Err(invalid("at least one member is required"));
        }
        Ok(())
    }
}

/// Raw concert locations of one artist, e.g. `"los_angeles-usa"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub locations: Vec<String>,
}

/// Raw concert dates of one artist, e.g. `"*23-08-2019"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRecord {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub dates: Vec<String>,
}

/// Raw location → dates relation of one artist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationRecord {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub dates_locations: IndexMap<String, Vec<String>>,
}

/// Envelope of the bulk variants: `{"index": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Indexed<T> {
    pub index: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_requires_every_url() {
        let mut index = ApiIndex {
            artists: "http://x/artists".into(),
            locations: "http://x/locations".into(),
            dates: "http://x/dates".into(),
            relation: "http://x/relation".into(),
        };
        assert!(index.validate().is_ok());

        index.dates = "  ".into();
        assert!(matches!(
            index.validate(),
            Err(ValidationError::EmptyUrl("dates"))
        ));

        let missing: ApiIndex = serde_json::from_str(
            r#"{"artists": "http://x/artists", "locations": "http://x/locations", "dates": "http://x/dates"}"#,
        )
        .unwrap();
        assert!(matches!(
            missing.validate(),
            Err(ValidationError::EmptyUrl("relation"))
        ));
    }

    #[test]
    fn artist_decodes_from_upstream_shape() {
        let json = r#"{
            "id": 1,
            "image": "https://groupietrackers.herokuapp.com/api/images/queen.jpeg",
            "name": "Queen",
            "members": ["Freddie Mercury", "Brian May"],
            "creationDate": 1970,
            "firstAlbum": "14-12-1973",
            "locations": "https://groupietrackers.herokuapp.com/api/locations/1",
            "concertDates": "https://groupietrackers.herokuapp.com/api/dates/1",
            "relations": "https://groupietrackers.herokuapp.com/api/relation/1"
        }"#;
        let artist: RawArtist = serde_json::from_str(json).unwrap();
        assert_eq!(artist.creation_date, 1970);
        assert_eq!(artist.first_album, "14-12-1973");
        assert!(artist.validate().is_ok());
    }

    #[test]
    fn artist_without_members_is_rejected() {
        let artist = RawArtist {
            id: 3,
            image: String::new(),
            name: "Nobody".into(),
            members: vec![],
            creation_date: 2000,
            first_album: "01-01-2001".into(),
            locations: String::new(),
            concert_dates: String::new(),
            relations: String::new(),
        };
        assert!(matches!(
            artist.validate(),
            Err(ValidationError::InvalidArtist { id: 3, .. })
        ));
    }

    #[test]
    fn relation_keeps_upstream_order() {
        let json = r#"{"id": 1, "datesLocations": {
            "north_carolina-usa": ["23-08-2019"],
            "georgia-usa": ["22-08-2019"]
        }}"#;
        let rel: RelationRecord = serde_json::from_str(json).unwrap();
        let keys: Vec<_> = rel.dates_locations.keys().cloned().collect();
        assert_eq!(keys, ["north_carolina-usa", "georgia-usa"]);
    }
}
