use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use subline_core::assign::{assign, AssignOutcome, AssignRequest};
use subline_core::types::{AssignmentRecord, AssignmentStatus, ItemId, UserId};

use crate::error::AppError;
use crate::routes::{blocking, json_body};
use crate::state::AppState;

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignBody {
    #[serde(default)]
    pub user_ids: Option<Vec<UserId>>,
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
    #[serde(default)]
    pub count: Option<serde_json::Value>,
}

/// POST /api/assignments — allocate unassigned activities to users.
pub async fn create_assignments(
    State(app): State<AppState>,
    payload: Result<Json<AssignBody>, JsonRejection>,
) -> Result<Json<AssignOutcome>, AppError> {
    let body = json_body(payload)?;
    let request = AssignRequest::from_raw(
        body.user_ids,
        body.from_date.as_deref(),
        body.to_date.as_deref(),
        body.count.as_ref(),
        app.config.assignment.max_count,
    )?;

    let store = app.store.clone();
    let outcome = blocking(move || assign(store.as_ref(), &request, chrono::Utc::now())).await?;
    Ok(Json(outcome))
}

/// GET /api/users/:user_id/assignments — records assigned to one user.
pub async fn list_user_assignments(
    State(app): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<AssignmentRecord>>, AppError> {
    let store = app.store.clone();
    let records = blocking(move || store.assignments_for_user(user_id)).await?;
    Ok(Json(records))
}

#[derive(serde::Deserialize)]
pub struct StatusBody {
    pub status: String,
}

/// PUT /api/users/:user_id/assignments/:item_id — move an assignment along.
pub async fn update_assignment_status(
    State(app): State<AppState>,
    Path((user_id, item_id)): Path<(UserId, ItemId)>,
    payload: Result<Json<StatusBody>, JsonRejection>,
) -> Result<Json<AssignmentRecord>, AppError> {
    let status: AssignmentStatus = json_body(payload)?.status.parse()?;
    let store = app.store.clone();
    let record =
        blocking(move || store.update_assignment_status(user_id, item_id, status)).await?;
    Ok(Json(record))
}
