//! Full-snapshot read and bulk replace
//!
//! The client keeps one in-memory aggregate and saves it with a debounced
//! PUT of the whole snapshot; the replace is atomic server-side.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use roster_common::db::store;
use roster_common::model::{Person, Task};

use crate::api::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SnapshotPayload {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// GET /api/db
pub async fn get_db(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let (people, tasks) = store::load_snapshot(&state.db).await?;
    Ok(Json(json!({ "people": people, "tasks": tasks })))
}

/// PUT /api/db
///
/// Replaces both sets wholesale. Tasks referencing people missing from
/// the payload are pruned; the whole batch commits or rolls back as one.
pub async fn put_db(
    State(state): State<AppState>,
    Json(payload): Json<SnapshotPayload>,
) -> Result<Json<Value>, ApiError> {
    store::replace_snapshot(&state.db, &payload.people, &payload.tasks).await?;
    Ok(Json(json!({ "ok": true })))
}
