//! Health and status handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::trace;

use crate::state::AppState;
use crate::utils::fmt_duration;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatasetStatus {
    Loading,
    Ready,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    status: DatasetStatus,
    version: &'static str,
    commit: &'static str,
    artists: usize,
    locations: usize,
    cached_coordinates: usize,
    loaded_at: Option<DateTime<Utc>>,
    uptime: String,
}

/// Health check endpoint. 503 until the first load completes.
pub(super) async fn health(State(state): State<AppState>) -> Response {
    trace!("health check requested");
    let status = if state.store.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = Json(json!({
        "status": if status.is_success() { "healthy" } else { "starting" },
        "timestamp": Utc::now().to_rfc3339(),
    }));
    (status, body).into_response()
}

/// Dataset and cache overview.
pub(super) async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let catalog = state.store.snapshot();
    Json(StatusResponse {
        status: if state.store.is_ready() {
            DatasetStatus::Ready
        } else {
            DatasetStatus::Loading
        },
        version: env!("CARGO_PKG_VERSION"),
        commit: env!("GIT_COMMIT_SHORT"),
        artists: catalog.len(),
        locations: catalog.unique_locations().len(),
        cached_coordinates: state.store.coordinates().cache_size(),
        loaded_at: catalog.loaded_at(),
        uptime: fmt_duration(state.started_at.elapsed()),
    })
}
