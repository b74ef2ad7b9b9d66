use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum DeskError {
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl DeskError {
    pub fn validation(message: impl Into<String>) -> Self {
        DeskError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            DeskError::NotFound => StatusCode::NOT_FOUND,
            DeskError::Validation(_) => StatusCode::BAD_REQUEST,
            DeskError::Database(_)
            | DeskError::Io(_)
            | DeskError::Json(_)
            | DeskError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<figment::Error> for DeskError {
    fn from(e: figment::Error) -> Self {
        DeskError::Config(Box::new(e))
    }
}

impl IntoResponse for DeskError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match self {
            DeskError::NotFound | DeskError::Validation(_) => self.to_string(),
            other => {
                error!(error = %other, "request failed");
                "internal error".to_string()
            }
        };
        (status, Json(ApiErrorResponse { error: message })).into_response()
    }
}

/// Error body returned by every endpoint: `{"error": "..."}`.
#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: String,
}
