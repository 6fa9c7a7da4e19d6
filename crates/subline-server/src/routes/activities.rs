use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use subline_core::store::ImportRow;
use subline_core::types::{ActivityItem, DateRange};

use crate::error::AppError;
use crate::routes::{blocking, json_body};
use crate::state::AppState;

/// POST /api/activities — import (upsert) a batch of activities.
pub async fn import_activities(
    State(app): State<AppState>,
    payload: Result<Json<Vec<ImportRow>>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let rows = json_body(payload)?;
    if rows.is_empty() {
        return Err(AppError::bad_request("no activities in request"));
    }
    let items = rows
        .into_iter()
        .map(ImportRow::into_item)
        .collect::<subline_core::Result<Vec<ActivityItem>>>()?;

    let store = app.store.clone();
    let imported = blocking(move || store.import_items(&items)).await?;
    Ok(Json(serde_json::json!({ "imported": imported })))
}

#[derive(serde::Deserialize)]
pub struct ListQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

/// GET /api/activities — list activities, optionally within `from..=to`.
pub async fn list_activities(
    State(app): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<ActivityItem>>, AppError> {
    let range = match (&q.from, &q.to) {
        (None, None) => None,
        _ => Some(DateRange::parse(q.from.as_deref(), q.to.as_deref())?),
    };
    let store = app.store.clone();
    let items = blocking(move || store.list_items(range)).await?;
    Ok(Json(items))
}
