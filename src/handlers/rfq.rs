use axum::{
    Json,
    extract::{Path, State},
};

use crate::middleware::JsonPayload;
use crate::types::RfqRecord;
use crate::{DeskError, router::DeskState};

/// GET /api/rfq/{id}
pub async fn get_rfq(
    State(state): State<DeskState>,
    Path(rfq_id): Path<i64>,
) -> Result<Json<RfqRecord>, DeskError> {
    Ok(Json(state.rfq.get(rfq_id).await?))
}

/// PATCH /api/rfq/{id} -> merges allow-listed fields; 400 when none remain, 404 for unknown ids.
pub async fn patch_rfq(
    State(state): State<DeskState>,
    Path(rfq_id): Path<i64>,
    JsonPayload(payload): JsonPayload,
) -> Result<Json<RfqRecord>, DeskError> {
    Ok(Json(state.rfq.update(rfq_id, payload).await?))
}
