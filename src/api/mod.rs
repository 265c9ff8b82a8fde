//! Client for the upstream artist API: one GET + JSON decode per call, with a
//! fixed per-request timeout and no retries.

pub mod client;
pub mod errors;
pub mod json;
pub mod middleware;
pub mod models;

pub use client::{GroupieClient, UpstreamSource, build_http_client, get_json};
pub use errors::FetchError;
pub use models::{ApiIndex, DateRecord, LocationRecord, RawArtist, RelationRecord};
