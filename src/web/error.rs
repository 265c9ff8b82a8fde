//! Error responses: JSON for `/api`, rendered pages for everything else.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use serde::Serialize;

use crate::data::{NotFoundError, ValidationError};
use crate::web::render;

/// Machine-readable error codes for JSON endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
    InvalidParameter,
    NotFound,
    NotReady,
}

impl ApiErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ApiErrorCode::InvalidParameter => StatusCode::BAD_REQUEST,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::InvalidParameter, message)
    }

    pub fn not_ready() -> Self {
        Self::new(ApiErrorCode::NotReady, "artist data is still loading")
    }
}

impl From<NotFoundError> for ApiError {
    fn from(e: NotFoundError) -> Self {
        Self::new(ApiErrorCode::NotFound, e.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::invalid_parameter(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Failure of an HTML page handler, rendered as an error page.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error("page not found")]
    NoRoute,
}

impl From<ValidationError> for PageError {
    fn from(e: ValidationError) -> Self {
        PageError::BadRequest(e.to_string())
    }
}

impl PageError {
    fn status(&self) -> StatusCode {
        match self {
            PageError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PageError::NotFound(_) | PageError::NoRoute => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Html(render::error_page(status, &self.to_string()))).into_response()
    }
}

/// Parse a required integer id parameter.
pub fn parse_id(raw: Option<&str>) -> Result<i32, ValidationError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ValidationError::InvalidValue {
            field: "id",
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_must_be_positive_integer() {
        assert_eq!(parse_id(Some(" 12 ")), Ok(12));
        assert!(parse_id(Some("abc")).is_err());
        assert!(parse_id(Some("-3")).is_err());
        assert!(parse_id(None).is_err());
    }

    #[test]
    fn api_error_status_follows_code() {
        let response = ApiError::from(NotFoundError::artist(4)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError::invalid_parameter("bad").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
