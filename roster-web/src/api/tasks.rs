//! Task CRUD and status endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use roster_common::db::store;
use roster_common::engine::{apply_status, StatusScope};
use roster_common::model::{AssignmentStatus, TaskInput};
use roster_common::Error;

use crate::api::ApiError;
use crate::AppState;

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<TaskInput>,
) -> Result<Json<Value>, ApiError> {
    store::insert_task(&state.db, &input).await?;
    Ok(Json(json!({ "ok": true })))
}

/// PUT /api/tasks/:id
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<TaskInput>,
) -> Result<Json<Value>, ApiError> {
    store::update_task(&state.db, &id, &input).await?;
    Ok(Json(json!({ "ok": true })))
}

/// DELETE /api/tasks/:id
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    store::delete_task(&state.db, &id).await?;
    Ok(Json(json!({ "ok": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub task_id: String,
    pub status: AssignmentStatus,
    /// Present: assignment-level edit for this person only.
    /// Absent: task-level write applied to every assignment.
    #[serde(default)]
    pub person_id: Option<String>,
}

/// POST /api/tasks/status
pub async fn set_status(
    State(state): State<AppState>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Value>, ApiError> {
    match body.person_id {
        None => {
            store::set_task_status(&state.db, &body.task_id, body.status).await?;
        }
        Some(person_id) => {
            let task = store::get_task(&state.db, &body.task_id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("task {}", body.task_id)))?;
            let task = apply_status(task, StatusScope::Assignment { person_id }, body.status)?;
            store::save_task_projection(&state.db, &task).await?;
        }
    }
    Ok(Json(json!({ "ok": true })))
}
