//! Multi-field artist search with typed, priority-grouped results.

use std::sync::Arc;

use serde::Serialize;

use crate::data::artist::Artist;

/// Result categories, declared in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SearchResultKind {
    #[serde(rename = "artist/band")]
    Artist,
    #[serde(rename = "member")]
    Member,
    #[serde(rename = "location")]
    Location,
    #[serde(rename = "creation date")]
    CreationDate,
    #[serde(rename = "first album")]
    FirstAlbum,
}

impl SearchResultKind {
    pub fn label(self) -> &'static str {
        match self {
            SearchResultKind::Artist => "artist/band",
            SearchResultKind::Member => "member",
            SearchResultKind::Location => "location",
            SearchResultKind::CreationDate => "creation date",
            SearchResultKind::FirstAlbum => "first album",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: SearchResultKind,
    pub artist_name: String,
    pub description: String,
    pub artist_id: i32,
}

/// How a lowercased query is compared against a field.
#[derive(Debug, Clone)]
enum Matcher {
    Prefix(String),
    Substring(String),
}

impl Matcher {
    fn new(query: &str) -> Option<Self> {
        let query = query.trim().to_lowercase();
        match query.chars().count() {
            0 => None,
            1 => Some(Matcher::Prefix(query)),
            _ => Some(Matcher::Substring(query)),
        }
    }

    fn matches(&self, field: &str) -> bool {
        let field = field.to_lowercase();
        match self {
            Matcher::Prefix(q) => field.starts_with(q.as_str()),
            Matcher::Substring(q) => field.contains(q.as_str()),
        }
    }
}

/// Search names, members, locations, creation years and first albums.
///
/// Results are grouped by [`SearchResultKind`] order; within a group the
/// input order of `artists` is kept.
pub fn search(artists: &[Arc<Artist>], query: &str) -> Vec<SearchResult> {
    let Some(matcher) = Matcher::new(query) else {
        return Vec::new();
    };

    let mut groups: [Vec<SearchResult>; 5] = Default::default();
    let mut push = |kind: SearchResultKind, artist: &Artist, text: String, description: String| {
        groups[kind as usize].push(SearchResult {
            text,
            kind,
            artist_name: artist.name.clone(),
            description,
            artist_id: artist.id,
        });
    };

    for artist in artists.iter().map(Arc::as_ref) {
        if matcher.matches(&artist.name) {
            push(
                SearchResultKind::Artist,
                artist,
                artist.name.clone(),
                format!("Band formed in {}", artist.creation_date),
            );
        }

        for member in artist.members.iter().filter(|m| matcher.matches(m)) {
            push(
                SearchResultKind::Member,
                artist,
                member.clone(),
                format!("Member of {}", artist.name),
            );
        }

        for location in artist
            .distinct_locations()
            .into_iter()
            .filter(|l| matcher.matches(l))
        {
            push(
                SearchResultKind::Location,
                artist,
                location.to_string(),
                format!("Concert location for {}", artist.name),
            );
        }

        // Years are too dense for single-character prefixes
        if matches!(matcher, Matcher::Substring(_))
            && matcher.matches(&artist.creation_date.to_string())
        {
            push(
                SearchResultKind::CreationDate,
                artist,
                format!("{} ({})", artist.name, artist.creation_date),
                format!("Band formed in {}", artist.creation_date),
            );
        }

        if matcher.matches(&artist.first_album) {
            push(
                SearchResultKind::FirstAlbum,
                artist,
                format!("{} - {}", artist.name, artist.first_album),
                format!("First album by {}", artist.name),
            );
        }
    }

    groups.into_iter().flatten().collect()
}
