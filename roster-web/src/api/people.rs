//! People CRUD and partner recommendation endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use roster_common::db::store;
use roster_common::engine::{rank_partners, RankMode};
use roster_common::Error;

use crate::api::ApiError;
use crate::AppState;

/// POST /api/people
///
/// Creates a person with a server-assigned id. Rejects blank names and
/// case-insensitive duplicates before any write.
pub async fn create_person(
    State(state): State<AppState>,
    Json(input): Json<roster_common::model::PersonInput>,
) -> Result<Json<Value>, ApiError> {
    let person = store::insert_person(&state.db, &input).await?;
    Ok(Json(json!({ "person": person })))
}

/// PUT /api/people/:id
pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<roster_common::model::PersonInput>,
) -> Result<Json<Value>, ApiError> {
    store::update_person(&state.db, &id, &input).await?;
    Ok(Json(json!({ "ok": true })))
}

/// DELETE /api/people/:id
///
/// Cascades server-side: the person's assignments are removed and tasks
/// left without any assignee are deleted, all in one transaction.
pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    store::delete_person(&state.db, &id).await?;
    Ok(Json(json!({ "ok": true })))
}

#[derive(Debug, Deserialize)]
pub struct PartnerQuery {
    /// "matching" (default) or "all"
    #[serde(default)]
    pub mode: Option<String>,
    /// Free-text name filter
    #[serde(default)]
    pub q: Option<String>,
}

/// GET /api/people/:id/partners
///
/// Ranked partner candidates for the person, best-first.
pub async fn list_partners(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PartnerQuery>,
) -> Result<Json<Value>, ApiError> {
    let (people, tasks) = store::load_snapshot(&state.db).await?;
    let requester = people
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| Error::NotFound(format!("person {id}")))?;

    let mode = match query.mode.as_deref() {
        Some("all") => RankMode::All,
        _ => RankMode::Matching,
    };
    let partners = rank_partners(requester, &people, &tasks, mode, query.q.as_deref());
    Ok(Json(json!({ "partners": partners })))
}
