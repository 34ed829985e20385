//! Session-cookie authentication
//!
//! Login checks the password against the salted hash in the settings
//! table, then hands out an opaque session token in an HttpOnly cookie.
//! The middleware guards every /api route except login itself.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::api::ApiError;
use crate::AppState;

pub const SESSION_COOKIE: &str = "roster_session";
const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let ok = roster_common::auth::verify_password(&state.db, &body.password).await?;
    if !ok {
        warn!("login rejected: bad password");
        let body = Json(json!({ "message": "INVALID_CREDENTIALS" }));
        return Ok((StatusCode::UNAUTHORIZED, body).into_response());
    }

    let token = state.issue_session();
    let cookie = format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={SESSION_MAX_AGE_SECS}"
    );
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "ok": true })),
    )
        .into_response())
}

/// POST /api/auth/logout
///
/// Forgets the session token and expires the cookie.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.revoke_session(&token);
    }
    let cookie = format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "ok": true })),
    )
        .into_response()
}

/// Session middleware for the protected routes
pub async fn session_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = session_token(request.headers())
        .map(|token| state.session_is_valid(&token))
        .unwrap_or(false);

    if !authorized {
        let body = Json(json!({ "message": "UNAUTHORIZED" }));
        return (StatusCode::UNAUTHORIZED, body).into_response();
    }

    next.run(request).await
}

/// Pull the session token out of the Cookie header, if present
fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}
