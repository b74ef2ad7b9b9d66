use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};
use tower_http::trace::TraceLayer;

use crate::db::SharedStorage;
use crate::handlers::{health, rfq, solt};
use crate::service::{RfqService, SoltService};

/// Request-handler state, built once at startup.
#[derive(Clone)]
pub struct DeskState {
    pub rfq: RfqService,
    pub solt: SoltService,
}

impl DeskState {
    pub fn new(storage: SharedStorage) -> Self {
        Self {
            rfq: RfqService::new(storage.clone()),
            solt: SoltService::new(storage),
        }
    }
}

pub fn desk_router(state: DeskState, body_limit: usize) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/rfq/{id}", get(rfq::get_rfq).patch(rfq::patch_rfq))
        .route("/api/rfq/{id}/solt", get(solt::get_solt))
        .route("/api/rfq/{id}/solt/tab/{tab_index}", patch(solt::patch_tab))
        .route("/api/rfq/{id}/solt/line", post(solt::add_line))
        .route(
            "/api/rfq/{id}/solt/line/{line_id}",
            patch(solt::patch_line).delete(solt::delete_line),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
