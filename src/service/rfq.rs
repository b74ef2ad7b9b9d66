use crate::db::SharedStorage;
use crate::error::DeskError;
use crate::types::RfqRecord;
use crate::types::rfq::filter_updates;
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Read and partially update flat RFQ records.
#[derive(Clone)]
pub struct RfqService {
    storage: SharedStorage,
}

impl RfqService {
    pub fn new(storage: SharedStorage) -> Self {
        Self { storage }
    }

    pub async fn get(&self, rfq_id: i64) -> Result<RfqRecord, DeskError> {
        self.storage.get_rfq(rfq_id).await?.ok_or(DeskError::NotFound)
    }

    /// Merge allow-listed fields into an existing record.
    ///
    /// Unknown keys are dropped silently. A payload with nothing left after
    /// filtering is rejected before the record is looked up.
    pub async fn update(
        &self,
        rfq_id: i64,
        payload: Map<String, Value>,
    ) -> Result<RfqRecord, DeskError> {
        let received = payload.len();
        let updates = filter_updates(payload);
        if updates.is_empty() {
            debug!(rfq_id, received, "rfq update carried no allowed fields");
            return Err(DeskError::validation("no valid fields"));
        }

        let mut record = self.get(rfq_id).await?;
        let changed = updates.len();
        record.merge(updates);
        self.storage.save_rfq(&record).await?;

        info!(rfq_id, changed, dropped = received - changed, "rfq updated");
        Ok(record)
    }
}
