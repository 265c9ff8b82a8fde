//! HTML page handlers.

use std::time::{Duration, Instant};

use axum::extract::{Query, RawForm, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::Datelike;
use serde::Deserialize;
use tracing::debug;

use crate::data::filter::filter_catalog;
use crate::data::{ArtistCard, Catalog};
use crate::state::AppState;
use crate::utils::log_if_slow;
use crate::web::error::{PageError, parse_id};
use crate::web::filter_form::{FilterForm, YearBounds};
use crate::web::render;
use crate::web::routes::{cache, with_cache_control};

const SLOW_QUERY: Duration = Duration::from_millis(50);

fn year_bounds(catalog: &Catalog) -> YearBounds {
    let (min_creation, min_album) = catalog.min_years();
    YearBounds {
        min_creation,
        min_album,
        max_year: chrono::Utc::now().year(),
    }
}

/// `GET /`
pub(super) async fn home(State(state): State<AppState>) -> Html<String> {
    let catalog = state.store.snapshot();
    let cards: Vec<ArtistCard> = catalog.artists().iter().map(|a| a.as_ref().into()).collect();
    Html(render::listing_page(
        &cards,
        &FilterForm::default(),
        year_bounds(&catalog),
        catalog.unique_locations(),
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct ArtistQuery {
    id: Option<String>,
}

/// `GET /artist?id=`
pub(super) async fn artist(
    State(state): State<AppState>,
    Query(query): Query<ArtistQuery>,
) -> Result<Html<String>, PageError> {
    let id = parse_id(query.id.as_deref())?;
    let artist = state.store.artist(id)?;
    Ok(Html(render::artist_page(&artist)))
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    #[serde(default)]
    q: String,
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
}

/// `GET /search?q=`
///
/// JSON for `X-Requested-With: XMLHttpRequest`, otherwise a results page. A
/// single page result redirects straight to its artist.
pub(super) async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Response {
    let start = Instant::now();
    let results = state.store.search(&query.q);
    log_if_slow(start, SLOW_QUERY, "search");
    debug!(query = %query.q, results = results.len(), "Search");

    if wants_json(&headers) {
        return with_cache_control(results, cache::SEARCH);
    }
    if let [only] = results.as_slice() {
        return Redirect::to(&format!("/artist?id={}", only.artist_id)).into_response();
    }
    Html(render::search_page(query.q.trim(), &results)).into_response()
}

/// `GET|POST /filter`
///
/// `RawForm` reads the query string for GET and the body for POST.
pub(super) async fn filter(
    State(state): State<AppState>,
    RawForm(body): RawForm,
) -> Result<Html<String>, PageError> {
    let form = FilterForm::parse(&body)?;
    let catalog = state.store.snapshot();
    let bounds = year_bounds(&catalog);
    let params = form.to_params(bounds)?;

    let start = Instant::now();
    let artists = filter_catalog(&catalog, &params);
    log_if_slow(start, SLOW_QUERY, "filter");
    debug!(?params, matched = artists.len(), "Filter");

    let cards: Vec<ArtistCard> = artists.iter().map(|a| a.as_ref().into()).collect();
    Ok(Html(render::listing_page(
        &cards,
        &form,
        bounds,
        catalog.unique_locations(),
    )))
}

/// Fallback for unknown routes.
pub(super) async fn not_found() -> PageError {
    PageError::NoRoute
}
