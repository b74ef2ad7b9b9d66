use crate::db::SharedStorage;
use crate::error::DeskError;
use crate::types::{LinePatch, LineRequest, SoltLine, SoltTab, SoltView};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Tabs and line items of an RFQ's scope order line tables.
#[derive(Clone)]
pub struct SoltService {
    storage: SharedStorage,
}

impl SoltService {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    /// Unknown RFQs yield empty tabs and lines.
    pub async fn list(&self, rfq_id: i64) -> Result<SoltView, DeskError> {
        let tabs = self.storage.list_tabs(rfq_id).await?;
        let lines = self.storage.list_lines(rfq_id).await?;
        Ok(SoltView::assemble(rfq_id, tabs, lines))
    }

    pub async fn rename_tab(
        &self,
        rfq_id: i64,
        tab_index: i64,
        name: &str,
    ) -> Result<SoltTab, DeskError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DeskError::validation("name required"));
        }
        let tab = SoltTab {
            tab_index,
            name: name.to_string(),
        };
        self.storage.upsert_tab(rfq_id, &tab).await?;
        info!(rfq_id, tab_index, name, "solt tab renamed");
        Ok(tab)
    }

    /// Append a line to its tab, numbered after the highest existing `line_no`.
    ///
    /// Fails validation when the tab already holds `line_no == i64::MAX`.
    pub async fn add_line(
        &self,
        rfq_id: i64,
        payload: Map<String, Value>,
    ) -> Result<SoltLine, DeskError> {
        let request = LineRequest::from_payload(payload)?;
        let line_no = self
            .storage
            .list_lines(rfq_id)
            .await?
            .iter()
            .filter(|l| l.tab_index == request.tab_index)
            .map(|l| l.line_no)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| DeskError::validation("line_no out of range"))?;

        let line = self
            .storage
            .insert_line(request.numbered(rfq_id, line_no))
            .await?;
        info!(
            rfq_id,
            line_id = line.id,
            tab_index = line.tab_index,
            line_no = line.line_no,
            "solt line added"
        );
        Ok(line)
    }

    pub async fn update_line(
        &self,
        rfq_id: i64,
        line_id: i64,
        payload: Map<String, Value>,
    ) -> Result<SoltLine, DeskError> {
        let patch = LinePatch::from_payload(payload)?;
        if patch.is_empty() {
            debug!(rfq_id, line_id, "line update carried no allowed fields");
            return Err(DeskError::validation("no valid fields"));
        }

        let mut line = self
            .storage
            .get_line(rfq_id, line_id)
            .await?
            .ok_or(DeskError::NotFound)?;
        patch.apply(&mut line);
        self.storage.save_line(&line).await?;
        info!(rfq_id, line_id, line_total = line.line_total, "solt line updated");
        Ok(line)
    }

    /// Succeeds whether or not the line existed.
    pub async fn delete_line(&self, rfq_id: i64, line_id: i64) -> Result<(), DeskError> {
        self.storage.delete_line(rfq_id, line_id).await?;
        info!(rfq_id, line_id, "solt line deleted");
        Ok(())
    }
}
