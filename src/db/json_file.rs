use crate::db::Storage;
use crate::error::DeskError;
use crate::types::{NewLine, RfqRecord, SoltLine, SoltTab};
use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const RFQ_FILE: &str = "rfq.json";
pub const SOLT_FILE: &str = "solt.json";

/// `rfq.json`: stringified RFQ id -> record.
type RfqFile = BTreeMap<String, RfqRecord>;
/// `solt.json`: stringified RFQ id -> tabs and lines.
type SoltFile = BTreeMap<String, SoltRecord>;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SoltRecord {
    #[serde(default)]
    tabs: Vec<SoltTab>,
    #[serde(default)]
    lines: Vec<SoltLine>,
    #[serde(default = "first_line_id")]
    next_line_id: i64,
}

fn first_line_id() -> i64 {
    1
}

impl Default for SoltRecord {
    fn default() -> Self {
        Self {
            tabs: Vec::new(),
            lines: Vec::new(),
            next_line_id: first_line_id(),
        }
    }
}

/// Flat-file storage. Each mutation reads the whole file, edits it in memory,
/// and replaces it via write-to-temp + rename. No locking: concurrent writers
/// race and the last one wins.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    rfq_path: PathBuf,
    solt_path: PathBuf,
}

impl JsonFileStorage {
    pub async fn open(data_dir: &Path) -> Result<Self, DeskError> {
        tokio::fs::create_dir_all(data_dir).await?;
        info!(path = %data_dir.display(), "JSON data directory ready");
        Ok(Self {
            rfq_path: data_dir.join(RFQ_FILE),
            solt_path: data_dir.join(SOLT_FILE),
        })
    }

    async fn read<T: DeserializeOwned + Default>(path: &Path) -> Result<T, DeskError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_atomic<T: Serialize>(path: &Path, data: &T) -> Result<(), DeskError> {
        let bytes = serde_json::to_vec_pretty(data)?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        debug!(path = %path.display(), "store file replaced");
        Ok(())
    }

    async fn read_solt(&self, rfq_id: i64) -> Result<SoltRecord, DeskError> {
        let mut store: SoltFile = Self::read(&self.solt_path).await?;
        Ok(store.remove(&rfq_id.to_string()).unwrap_or_default())
    }

    /// Read-modify-write one RFQ's SOLT entry, creating it if absent.
    async fn modify_solt<R: Send>(
        &self,
        rfq_id: i64,
        f: impl FnOnce(&mut SoltRecord, i64) -> R + Send,
    ) -> Result<R, DeskError> {
        let mut store: SoltFile = Self::read(&self.solt_path).await?;
        let next_global_id = store
            .values()
            .map(|r| {
                let max_line = r.lines.iter().map(|l| l.id + 1).max().unwrap_or(1);
                r.next_line_id.max(max_line)
            })
            .max()
            .unwrap_or(1);
        let record = store.entry(rfq_id.to_string()).or_default();
        let out = f(record, next_global_id);
        Self::write_atomic(&self.solt_path, &store).await?;
        Ok(out)
    }
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn get_rfq(&self, rfq_id: i64) -> Result<Option<RfqRecord>, DeskError> {
        let mut store: RfqFile = Self::read(&self.rfq_path).await?;
        Ok(store.remove(&rfq_id.to_string()))
    }

    async fn save_rfq(&self, record: &RfqRecord) -> Result<(), DeskError> {
        let mut store: RfqFile = Self::read(&self.rfq_path).await?;
        store
            .entry(record.id.to_string())
            .and_modify(|existing| existing.merge(record.fields.clone()))
            .or_insert_with(|| record.clone());
        Self::write_atomic(&self.rfq_path, &store).await
    }

    async fn list_tabs(&self, rfq_id: i64) -> Result<Vec<SoltTab>, DeskError> {
        let mut tabs = self.read_solt(rfq_id).await?.tabs;
        tabs.sort_by_key(|t| t.tab_index);
        Ok(tabs)
    }

    async fn upsert_tab(&self, rfq_id: i64, tab: &SoltTab) -> Result<(), DeskError> {
        self.modify_solt(rfq_id, |record, _| {
            match record.tabs.iter_mut().find(|t| t.tab_index == tab.tab_index) {
                Some(existing) => existing.name = tab.name.clone(),
                None => record.tabs.push(tab.clone()),
            }
        })
        .await
    }

    async fn list_lines(&self, rfq_id: i64) -> Result<Vec<SoltLine>, DeskError> {
        Ok(self.read_solt(rfq_id).await?.lines)
    }

    async fn get_line(&self, rfq_id: i64, line_id: i64) -> Result<Option<SoltLine>, DeskError> {
        let lines = self.read_solt(rfq_id).await?.lines;
        Ok(lines.into_iter().find(|l| l.id == line_id))
    }

    async fn insert_line(&self, line: NewLine) -> Result<SoltLine, DeskError> {
        self.modify_solt(line.rfq_id, |record, next_id| {
            let line = line.into_line(next_id);
            record.next_line_id = next_id + 1;
            record.lines.push(line.clone());
            line
        })
        .await
    }

    async fn save_line(&self, line: &SoltLine) -> Result<(), DeskError> {
        self.modify_solt(line.rfq_id, |record, _| {
            if let Some(existing) = record.lines.iter_mut().find(|l| l.id == line.id) {
                *existing = line.clone();
            }
        })
        .await
    }

    async fn delete_line(&self, rfq_id: i64, line_id: i64) -> Result<(), DeskError> {
        self.modify_solt(rfq_id, |record, _| {
            record.lines.retain(|l| l.id != line_id);
        })
        .await
    }
}
