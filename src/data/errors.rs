//! Error taxonomy of the data layer.

use crate::api::FetchError;

/// Input that fails a structural check: malformed API index, bad artist
/// record, or an unusable filter parameter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("API index is missing the `{0}` URL")]
    EmptyUrl(&'static str),
    #[error("artist {id} is invalid: {reason}")]
    InvalidArtist { id: i32, reason: &'static str },
    #[error("artist id {0} appears more than once")]
    DuplicateArtist(i32),
    #[error("{field} range is inverted: {start} > {end}")]
    InvertedRange {
        field: &'static str,
        start: i32,
        end: i32,
    },
    #[error("invalid value for {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },
}

/// A refresh cycle that could not produce a complete dataset.
///
/// Any variant means nothing was published; the previous dataset stays live.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to fetch API index")]
    Index(#[source] FetchError),
    #[error("failed to fetch {resource}")]
    Resource {
        resource: &'static str,
        #[source]
        source: FetchError,
    },
    #[error("failed to fetch {resource} for artist {artist_id}")]
    Artist {
        artist_id: i32,
        resource: &'static str,
        #[source]
        source: FetchError,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("enrichment task did not complete")]
    Task(#[from] tokio::task::JoinError),
}

/// Lookup of an unknown artist or coordinate target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} {key} not found")]
pub struct NotFoundError {
    pub kind: &'static str,
    pub key: String,
}

impl NotFoundError {
    pub fn artist(id: i32) -> Self {
        Self {
            kind: "artist",
            key: id.to_string(),
        }
    }
}
