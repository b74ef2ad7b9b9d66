//! Demo data written at startup when the store is empty.

use crate::db::Storage;
use crate::error::DeskError;
use crate::types::{NewLine, RfqField, RfqRecord, SoltTab};
use tracing::info;

pub const SEED_RFQ_ID: i64 = 1;

pub fn seed_record() -> RfqRecord {
    let mut record = RfqRecord::new(SEED_RFQ_ID);
    for field in RfqField::ALL {
        record.fields.insert(field, String::new());
    }
    record.fields.insert(RfqField::RfqNumber, "RFQ-0000-0".to_string());
    record
        .fields
        .insert(RfqField::Title, "RFQ — Demo Screen — Revision 0".to_string());
    record.fields.insert(RfqField::Status, "Received".to_string());
    record
}

pub fn seed_tabs() -> Vec<SoltTab> {
    vec![
        SoltTab {
            tab_index: 0,
            name: "Section 1".to_string(),
        },
        SoltTab {
            tab_index: 1,
            name: "Section 2".to_string(),
        },
    ]
}

pub fn seed_lines() -> Vec<NewLine> {
    [
        (0, 1, "Line item A", 1.0, 100.0),
        (0, 2, "Line item B", 2.0, 250.0),
        (1, 1, "Line item C", 5.0, 50.0),
    ]
    .into_iter()
    .map(|(tab_index, line_no, item, qty, unit_price)| NewLine {
        rfq_id: SEED_RFQ_ID,
        tab_index,
        line_no,
        item: Some(item.to_string()),
        qty,
        uom: Some("EA".to_string()),
        unit_price,
        currency: Some("USD".to_string()),
        line_total: qty * unit_price,
        note: String::new(),
    })
    .collect()
}

/// Create the demo RFQ and its SOLT data if they are missing. Existing data is never touched.
pub async fn ensure_seed(storage: &dyn Storage) -> Result<(), DeskError> {
    if storage.get_rfq(SEED_RFQ_ID).await?.is_none() {
        storage.save_rfq(&seed_record()).await?;
        info!(rfq_id = SEED_RFQ_ID, "seeded demo rfq");
    }

    let has_tabs = !storage.list_tabs(SEED_RFQ_ID).await?.is_empty();
    let has_lines = !storage.list_lines(SEED_RFQ_ID).await?.is_empty();
    if !has_tabs && !has_lines {
        for tab in seed_tabs() {
            storage.upsert_tab(SEED_RFQ_ID, &tab).await?;
        }
        let lines = seed_lines();
        let count = lines.len();
        for line in lines {
            storage.insert_line(line).await?;
        }
        info!(rfq_id = SEED_RFQ_ID, lines = count, "seeded demo solt tables");
    }
    Ok(())
}
