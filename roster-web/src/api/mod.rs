//! HTTP API handlers for roster-web

pub mod auth;
pub mod health;
pub mod people;
pub mod snapshot;
pub mod tasks;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use roster_common::Error;

/// Error wrapper mapping common errors to HTTP responses.
///
/// The body carries a stable `message` code plus a human-readable detail,
/// the contract the client already speaks.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            Error::InvalidData(_) => (StatusCode::BAD_REQUEST, "INVALID_DATA"),
            Error::DuplicateName(_) => (StatusCode::BAD_REQUEST, "DUPLICATE_NAME"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Error::Database(_) | Error::Io(_) | Error::Persistence(_) | Error::Config(_) => {
                // Persistence failures are reported, never silently repaired
                error!("request failed: {}", self.0);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = Json(json!({
            "message": code,
            "detail": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
