use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::middleware::JsonPayload;
use crate::types::{SoltLine, SoltTab, SoltView};
use crate::{DeskError, router::DeskState};

/// GET /api/rfq/{id}/solt
pub async fn get_solt(
    State(state): State<DeskState>,
    Path(rfq_id): Path<i64>,
) -> Result<Json<SoltView>, DeskError> {
    Ok(Json(state.solt.list(rfq_id).await?))
}

/// PATCH /api/rfq/{id}/solt/tab/{tab_index} with `{"name": "..."}`
pub async fn patch_tab(
    State(state): State<DeskState>,
    Path((rfq_id, tab_index)): Path<(i64, i64)>,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<SoltTab>, DeskError> {
    let name = payload.get("name").and_then(Value::as_str).unwrap_or("");
    Ok(Json(state.solt.rename_tab(rfq_id, tab_index, name).await?))
}

/// POST /api/rfq/{id}/solt/line -> 201 with the stored line.
pub async fn add_line(
    State(state): State<DeskState>,
    Path(rfq_id): Path<i64>,
    JsonPayload(payload): JsonPayload,
) -> Result<(StatusCode, Json<SoltLine>), DeskError> {
    let line = state.solt.add_line(rfq_id, payload).await?;
    Ok((StatusCode::CREATED, Json(line)))
}

/// PATCH /api/rfq/{id}/solt/line/{line_id}
pub async fn patch_line(
    State(state): State<DeskState>,
    Path((rfq_id, line_id)): Path<(i64, i64)>,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<SoltLine>, DeskError> {
    Ok(Json(state.solt.update_line(rfq_id, line_id, payload).await?))
}

/// DELETE /api/rfq/{id}/solt/line/{line_id} -> always `{"ok": true}`.
pub async fn delete_line(
    State(state): State<DeskState>,
    Path((rfq_id, line_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, DeskError> {
    state.solt.delete_line(rfq_id, line_id).await?;
    Ok(Json(json!({ "ok": true })))
}
