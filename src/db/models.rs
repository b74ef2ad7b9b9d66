use crate::types::{SoltLine, SoltTab};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbSoltTab {
    pub rfq_id: i64,
    pub tab_index: i64,
    pub name: String,
}

impl From<DbSoltTab> for SoltTab {
    fn from(d: DbSoltTab) -> Self {
        SoltTab {
            tab_index: d.tab_index,
            name: d.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbSoltLine {
    pub id: i64,
    pub rfq_id: i64,
    pub tab_index: i64,
    pub line_no: i64,
    pub item: Option<String>,
    pub qty: f64,
    pub uom: Option<String>,
    pub unit_price: f64,
    pub currency: Option<String>,
    pub line_total: f64,
    pub note: String,
}

impl From<DbSoltLine> for SoltLine {
    fn from(d: DbSoltLine) -> Self {
        SoltLine {
            id: d.id,
            rfq_id: d.rfq_id,
            tab_index: d.tab_index,
            line_no: d.line_no,
            item: d.item,
            qty: d.qty,
            uom: d.uom,
            unit_price: d.unit_price,
            currency: d.currency,
            line_total: d.line_total,
            note: d.note,
        }
    }
}
