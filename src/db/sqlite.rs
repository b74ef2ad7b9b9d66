use crate::db::Storage;
use crate::db::models::{DbSoltLine, DbSoltTab};
use crate::db::schema::SQLITE_INIT;
use crate::error::DeskError;
use crate::types::{NewLine, RfqField, RfqRecord, SoltLine, SoltTab};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, QueryBuilder, Row, Sqlite};
use std::str::FromStr;
use tracing::debug;

pub type SqlitePool = Pool<Sqlite>;

const LINE_COLUMNS: &str = "id, rfq_id, tab_index, line_no, item, qty, uom, unit_price, \
                            currency, line_total, note";

#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `database_url`, creating the database file (and its directory) if missing.
    pub async fn connect(database_url: &str) -> Result<Self, DeskError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let in_memory = database_url.contains(":memory:");
        if !in_memory
            && let Some(parent) = connect_opts.get_filename().parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Every pooled connection to an in-memory database would see its own empty database.
        let max_connections = if in_memory { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_opts)
            .await?;
        Ok(Self::new(pool))
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), DeskError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        debug!("sqlite schema initialized");
        Ok(())
    }

    fn row_to_record(row: SqliteRow) -> Result<RfqRecord, DeskError> {
        let mut record = RfqRecord::new(row.try_get("id")?);
        for field in RfqField::ALL {
            let value: Option<String> = row.try_get(field.as_str())?;
            if let Some(value) = value {
                record.fields.insert(field, value);
            }
        }
        Ok(record)
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn get_rfq(&self, rfq_id: i64) -> Result<Option<RfqRecord>, DeskError> {
        let row = sqlx::query("SELECT * FROM rfq WHERE id = ?")
            .bind(rfq_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_record).transpose()
    }

    /// Upsert by id, touching only the columns present in the record.
    async fn save_rfq(&self, record: &RfqRecord) -> Result<(), DeskError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("INSERT INTO rfq (id");
        for field in record.fields.keys() {
            qb.push(", ").push(field.as_str());
        }
        qb.push(") VALUES (").push_bind(record.id);
        for value in record.fields.values() {
            qb.push(", ").push_bind(value.clone());
        }
        qb.push(")");

        if record.fields.is_empty() {
            qb.push(" ON CONFLICT(id) DO NOTHING");
        } else {
            qb.push(" ON CONFLICT(id) DO UPDATE SET ");
            let mut set = qb.separated(", ");
            for field in record.fields.keys() {
                set.push(format!("{0} = excluded.{0}", field.as_str()));
            }
        }

        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn list_tabs(&self, rfq_id: i64) -> Result<Vec<SoltTab>, DeskError> {
        let rows: Vec<DbSoltTab> = sqlx::query_as(
            "SELECT rfq_id, tab_index, name FROM solt_tab WHERE rfq_id = ? ORDER BY tab_index",
        )
        .bind(rfq_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn upsert_tab(&self, rfq_id: i64, tab: &SoltTab) -> Result<(), DeskError> {
        sqlx::query(
            r#"
            INSERT INTO solt_tab (rfq_id, tab_index, name) VALUES (?, ?, ?)
            ON CONFLICT(rfq_id, tab_index) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(rfq_id)
        .bind(tab.tab_index)
        .bind(&tab.name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_lines(&self, rfq_id: i64) -> Result<Vec<SoltLine>, DeskError> {
        let rows: Vec<DbSoltLine> = sqlx::query_as(&format!(
            "SELECT {LINE_COLUMNS} FROM solt_line WHERE rfq_id = ? \
             ORDER BY tab_index, line_no, id"
        ))
        .bind(rfq_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_line(&self, rfq_id: i64, line_id: i64) -> Result<Option<SoltLine>, DeskError> {
        let row: Option<DbSoltLine> = sqlx::query_as(&format!(
            "SELECT {LINE_COLUMNS} FROM solt_line WHERE id = ? AND rfq_id = ?"
        ))
        .bind(line_id)
        .bind(rfq_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn insert_line(&self, line: NewLine) -> Result<SoltLine, DeskError> {
        let result = sqlx::query(
            r#"
            INSERT INTO solt_line (
                rfq_id, tab_index, line_no, item, qty, uom,
                unit_price, currency, line_total, note
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(line.rfq_id)
        .bind(line.tab_index)
        .bind(line.line_no)
        .bind(&line.item)
        .bind(line.qty)
        .bind(&line.uom)
        .bind(line.unit_price)
        .bind(&line.currency)
        .bind(line.line_total)
        .bind(&line.note)
        .execute(&self.pool)
        .await?;
        Ok(line.into_line(result.last_insert_rowid()))
    }

    async fn save_line(&self, line: &SoltLine) -> Result<(), DeskError> {
        sqlx::query(
            r#"UPDATE solt_line SET
                tab_index = ?,
                line_no = ?,
                item = ?,
                qty = ?,
                uom = ?,
                unit_price = ?,
                currency = ?,
                line_total = ?,
                note = ?
              WHERE id = ? AND rfq_id = ?"#,
        )
        .bind(line.tab_index)
        .bind(line.line_no)
        .bind(&line.item)
        .bind(line.qty)
        .bind(&line.uom)
        .bind(line.unit_price)
        .bind(&line.currency)
        .bind(line.line_total)
        .bind(&line.note)
        .bind(line.id)
        .bind(line.rfq_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_line(&self, rfq_id: i64, line_id: i64) -> Result<(), DeskError> {
        sqlx::query("DELETE FROM solt_line WHERE id = ? AND rfq_id = ?")
            .bind(line_id)
            .bind(rfq_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
