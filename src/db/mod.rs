//! Persistence layer: one storage interface, two adapters.
//!
//! Layout:
//! - `json_file.rs`: flat JSON files, rewritten atomically on every mutation
//! - `sqlite.rs`: SQLite via a sqlx pool
//! - `models.rs`: row structs for the SQLite adapter
//! - `schema.rs`: SQL DDL for initializing the database

pub mod json_file;
pub mod models;
pub mod schema;
pub mod sqlite;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::{Backend, StorageConfig};
use crate::error::DeskError;
use crate::types::{NewLine, RfqRecord, SoltLine, SoltTab};

pub use json_file::JsonFileStorage;
pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePool, SqliteStorage};

/// Backend-agnostic record access. Adapters persist and fetch; they hold no business rules.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_rfq(&self, rfq_id: i64) -> Result<Option<RfqRecord>, DeskError>;

    /// Insert or replace the given fields of a record.
    async fn save_rfq(&self, record: &RfqRecord) -> Result<(), DeskError>;

    async fn list_tabs(&self, rfq_id: i64) -> Result<Vec<SoltTab>, DeskError>;

    /// Create the tab, or rename it if it already exists.
    async fn upsert_tab(&self, rfq_id: i64, tab: &SoltTab) -> Result<(), DeskError>;

    async fn list_lines(&self, rfq_id: i64) -> Result<Vec<SoltLine>, DeskError>;

    async fn get_line(&self, rfq_id: i64, line_id: i64) -> Result<Option<SoltLine>, DeskError>;

    /// Persist a new line under a fresh, never reused id.
    async fn insert_line(&self, line: NewLine) -> Result<SoltLine, DeskError>;

    async fn save_line(&self, line: &SoltLine) -> Result<(), DeskError>;

    /// Remove the line if present.
    async fn delete_line(&self, rfq_id: i64, line_id: i64) -> Result<(), DeskError>;
}

pub type SharedStorage = Arc<dyn Storage>;

/// Open the adapter selected by configuration.
pub async fn open(cfg: &StorageConfig) -> Result<SharedStorage, DeskError> {
    match cfg.backend {
        Backend::Json => {
            info!(data_dir = %cfg.data_dir.display(), "using JSON file storage");
            let storage = JsonFileStorage::open(&cfg.data_dir).await?;
            Ok(Arc::new(storage))
        }
        Backend::Sqlite => {
            info!(database_url = %cfg.database_url, "using SQLite storage");
            let storage = SqliteStorage::connect(&cfg.database_url).await?;
            storage.init_schema().await?;
            Ok(Arc::new(storage))
        }
    }
}
