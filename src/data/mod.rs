//! In-memory artist dataset: enrichment, indexing, filtering and search.

pub mod artist;
pub mod errors;
pub mod filter;
pub mod format;
pub mod gazetteer;
pub mod repository;
pub mod search;

pub use artist::{Artist, ArtistCard, MAX_MEMBER_BUCKET};
pub use errors::{LoadError, NotFoundError, ValidationError};
pub use filter::{FilterParams, YearRange};
pub use repository::{ArtistRepository, Catalog, DEFAULT_MIN_YEAR, EnrichmentMode};
pub use search::{SearchResult, SearchResultKind};
