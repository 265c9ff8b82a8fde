//! Router construction and shared response utilities.

use std::time::Duration;

use axum::http::HeaderValue;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer};

use crate::state::AppState;
use crate::web::middleware::request_id::RequestIdLayer;
use crate::web::{coordinates, pages, status};

/// Cache-Control presets for public endpoints.
pub mod cache {
    /// Search suggestions change only on refresh.
    pub const SEARCH: &str = "public, max-age=60, stale-while-revalidate=120";
    /// Per-artist detail data.
    pub const DETAIL: &str = "public, max-age=300, stale-while-revalidate=300";
}

/// Wraps a JSON response with a `Cache-Control` header.
pub fn with_cache_control<T: serde::Serialize>(value: T, header: &'static str) -> Response {
    let mut response = Json(value).into_response();
    response.headers_mut().insert(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(header),
    );
    response
}

/// Creates the web server router
pub fn create_router(app_state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(status::health))
        .route("/status", get(status::status))
        .route("/coordinates", get(coordinates::artist_coordinates))
        .with_state(app_state.clone());

    let router = Router::new()
        .route("/", get(pages::home))
        .route("/artist", get(pages::artist))
        .route("/search", get(pages::search))
        .route("/filter", get(pages::filter).post(pages::filter))
        .nest("/api", api_router)
        .fallback(pages::not_found)
        .with_state(app_state);

    router.layer((
        // Outermost: per-request ID span + severity-proportional response logging.
        RequestIdLayer,
        CompressionLayer::new()
            .zstd(true)
            .br(true)
            .gzip(true)
            .quality(tower_http::CompressionLevel::Fastest),
        // Uncached coordinate lookups are paced by the geocoder rate limit
        TimeoutLayer::new(Duration::from_secs(60)),
    ))
}
