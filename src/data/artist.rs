//! The enriched artist record served to every read path.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::api::RawArtist;
use crate::data::format::{extract_year, format_date, format_location, format_relation};
use crate::data::gazetteer;

/// Member counts at or above this value share one filter bucket.
pub const MAX_MEMBER_BUCKET: usize = 8;

/// An artist with its concert locations, dates and relations attached.
///
/// Only constructed through [`Artist::enrich`], so a published artist always
/// carries all three enrichment fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub members: Vec<String>,
    pub creation_date: i32,
    pub first_album: String,
    /// Formatted, e.g. `"Los Angeles, Usa"`.
    pub locations: Vec<String>,
    /// US/AU state → the formatted locations in it the artist played.
    pub location_states: BTreeMap<String, Vec<String>>,
    /// Formatted, e.g. `"August 23, 2019"`.
    pub dates: Vec<String>,
    /// Formatted location → formatted dates, in upstream order.
    pub relations: IndexMap<String, Vec<String>>,
}

impl Artist {
    pub fn enrich(
        raw: RawArtist,
        locations: &[String],
        dates: &[String],
        relations: &IndexMap<String, Vec<String>>,
    ) -> Self {
        let locations: Vec<String> = locations.iter().map(|l| format_location(l)).collect();
        Self {
            id: raw.id,
            name: raw.name,
            image: raw.image,
            members: raw.members,
            creation_date: raw.creation_date,
            first_album: raw.first_album,
            location_states: group_by_state(&locations),
            locations,
            dates: dates.iter().map(|d| format_date(d)).collect(),
            relations: format_relation(relations),
        }
    }

    /// Member count clamped to [`MAX_MEMBER_BUCKET`].
    pub fn member_bucket(&self) -> usize {
        self.members.len().min(MAX_MEMBER_BUCKET)
    }

    pub fn first_album_year(&self) -> Option<i32> {
        extract_year(&self.first_album)
    }

    /// Case-insensitive exact match against a formatted location.
    pub fn played_at(&self, location: &str) -> bool {
        let location = location.trim().to_lowercase();
        self.locations.iter().any(|l| l.to_lowercase() == location)
    }

    /// Whether any concert location lies in the given state.
    pub fn played_in_state(&self, state: &str) -> bool {
        gazetteer::canonical_state(state)
            .is_some_and(|state| self.location_states.contains_key(state))
    }

    /// Locations deduplicated case-insensitively, first spelling kept.
    pub fn distinct_locations(&self) -> Vec<&str> {
        let mut seen: Vec<String> = Vec::with_capacity(self.locations.len());
        let mut out = Vec::with_capacity(self.locations.len());
        for location in &self.locations {
            let key = location.to_lowercase();
            if !seen.contains(&key) {
                seen.push(key);
                out.push(location.as_str());
            }
        }
        out
    }
}

/// List-view projection of an [`Artist`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistCard {
    pub id: i32,
    pub name: String,
    pub image: String,
}

impl From<&Artist> for ArtistCard {
    fn from(artist: &Artist) -> Self {
        Self {
            id: artist.id,
            name: artist.name.clone(),
            image: artist.image.clone(),
        }
    }
}

fn group_by_state(locations: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut states: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for location in locations {
        for state in gazetteer::states_for_location(location) {
            let cities = states.entry(state.to_string()).or_default();
            if !cities.contains(location) {
                cities.push(location.clone());
            }
        }
    }
    states
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build an already-enriched artist from formatted locations.
    pub(crate) fn artist(
        id: i32,
        name: &str,
        members: &[&str],
        creation_date: i32,
        first_album: &str,
        locations: &[&str],
    ) -> Artist {
        let locations: Vec<String> = locations.iter().map(|l| l.to_string()).collect();
        Artist {
            id,
            name: name.to_string(),
            image: format!("https://img.example/{id}.jpeg"),
            members: members.iter().map(|m| m.to_string()).collect(),
            creation_date,
            first_album: first_album.to_string(),
            location_states: group_by_state(&locations),
            locations,
            dates: Vec::new(),
            relations: IndexMap::new(),
        }
    }

    #[test]
    fn enrich_formats_every_field() {
        let raw = RawArtist {
            id: 1,
            image: "img".into(),
            name: "Queen".into(),
            members: vec!["Freddie Mercury".into()],
            creation_date: 1970,
            first_album: "14-12-1973".into(),
            locations: String::new(),
            concert_dates: String::new(),
            relations: String::new(),
        };
        let mut relations = IndexMap::new();
        relations.insert("osaka-japan".to_string(), vec!["*28-01-2020".to_string()]);

        let artist = Artist::enrich(
            raw,
            &["osaka-japan".to_string()],
            &["*28-01-2020".to_string()],
            &relations,
        );

        assert_eq!(artist.locations, ["Osaka, Japan"]);
        assert_eq!(artist.dates, ["January 28, 2020"]);
        assert_eq!(artist.relations["Osaka, Japan"], ["January 28, 2020"]);
        assert!(artist.location_states.is_empty());
        assert_eq!(artist.first_album_year(), Some(1973));
    }

    #[test]
    fn member_bucket_is_capped() {
        let members: Vec<String> = (0..11).map(|i| format!("m{i}")).collect();
        let refs: Vec<&str> = members.iter().map(String::as_str).collect();
        let big = artist(1, "Big Band", &refs, 1960, "01-01-1961", &[]);
        assert_eq!(big.member_bucket(), MAX_MEMBER_BUCKET);

        let duo = artist(2, "Duo", &["a", "b"], 1960, "01-01-1961", &[]);
        assert_eq!(duo.member_bucket(), 2);
    }

    #[test]
    fn location_matching_ignores_case() {
        let a = artist(1, "A", &["a"], 2000, "01-01-2001", &["Seattle, Usa"]);
        assert!(a.played_at("seattle, usa"));
        assert!(!a.played_at("Seattle"));
        assert!(a.played_in_state("washington"));
        assert!(!a.played_in_state("California"));
        assert_eq!(a.location_states["Washington"], ["Seattle, Usa"]);
    }

    #[test]
    fn distinct_locations_keeps_first_spelling() {
        let a = artist(
            1,
            "A",
            &["a"],
            2000,
            "01-01-2001",
            &["Lyon, France", "LYON, FRANCE", "Paris, France"],
        );
        assert_eq!(a.distinct_locations(), ["Lyon, France", "Paris, France"]);
    }
}
