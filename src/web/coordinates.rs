use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

use crate::state::AppState;
use crate::web::error::{ApiError, parse_id};
use crate::web::routes::{cache, with_cache_control};

#[derive(Debug, Deserialize)]
pub(super) struct CoordinatesQuery {
    id: Option<String>,
}

/// `GET /api/coordinates?id=`
///
/// Locations that cannot be geocoded are omitted from the response. Answers
/// 503 until the first load has finished.
pub(super) async fn artist_coordinates(
    State(state): State<AppState>,
    Query(query): Query<CoordinatesQuery>,
) -> Result<Response, ApiError> {
    if !state.store.is_ready() {
        return Err(ApiError::not_ready());
    }
    let id = parse_id(query.id.as_deref())?;
    let coordinates = state.store.artist_coordinates(id).await?;
    Ok(with_cache_control(coordinates, cache::DETAIL))
}
