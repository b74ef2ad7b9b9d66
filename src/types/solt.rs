use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::coerce;
use crate::error::DeskError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoltTab {
    pub tab_index: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoltLine {
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
    #[serde(default)]
    pub note: String,
}

/// Response of `GET /api/rfq/{id}/solt`.
#[derive(Debug, Clone, Serialize)]
pub struct SoltView {
    pub rfq_id: i64,
    pub tabs: Vec<SoltTab>,
    pub lines: BTreeMap<i64, Vec<SoltLine>>,
}

impl SoltView {
    /// Group lines by tab, each group ordered by `(line_no, id)`.
    pub fn assemble(rfq_id: i64, mut tabs: Vec<SoltTab>, lines: Vec<SoltLine>) -> Self {
        tabs.sort_by_key(|t| t.tab_index);
        let mut grouped: BTreeMap<i64, Vec<SoltLine>> = BTreeMap::new();
        for line in lines {
            grouped.entry(line.tab_index).or_default().push(line);
        }
        for group in grouped.values_mut() {
            group.sort_by_key(|l| (l.line_no, l.id));
        }
        Self {
            rfq_id,
            tabs,
            lines: grouped,
        }
    }
}

/// A line that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLine {
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

impl NewLine {
    pub fn into_line(self, id: i64) -> SoltLine {
        SoltLine {
            id,
            rfq_id: self.rfq_id,
            tab_index: self.tab_index,
            line_no: self.line_no,
            item: self.item,
            qty: self.qty,
            uom: self.uom,
            unit_price: self.unit_price,
            currency: self.currency,
            line_total: self.line_total,
            note: self.note,
        }
    }
}

/// Body of `POST /api/rfq/{id}/solt/line`, before a line number is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRequest {
    pub tab_index: i64,
    pub item: Option<String>,
    pub qty: f64,
    pub uom: Option<String>,
    pub unit_price: f64,
    pub currency: Option<String>,
    pub note: String,
}

impl LineRequest {
    pub fn from_payload(mut payload: Map<String, Value>) -> Result<Self, DeskError> {
        let tab_index = match payload.get("tab_index") {
            None | Some(Value::Null) => 0,
            Some(v) => integer_field("tab_index", v)?,
        };
        let qty = coerce::float_or_zero(payload.get("qty"));
        let unit_price = coerce::float_or_zero(payload.get("unit_price"));
        let mut take = |key: &str| payload.remove(key).and_then(coerce::optional_text);
        Ok(Self {
            tab_index,
            item: take("item"),
            qty,
            uom: take("uom"),
            unit_price,
            currency: take("currency"),
            note: take("note").unwrap_or_default(),
        })
    }

    pub fn numbered(self, rfq_id: i64, line_no: i64) -> NewLine {
        NewLine {
            rfq_id,
            tab_index: self.tab_index,
            line_no,
            item: self.item,
            qty: self.qty,
            uom: self.uom,
            unit_price: self.unit_price,
            currency: self.currency,
            line_total: coerce::finite_or_zero(self.qty * self.unit_price),
            note: self.note,
        }
    }
}

/// Partial update of a line. `None` means "not supplied".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinePatch {
    pub item: Option<Option<String>>,
    pub qty: Option<f64>,
    pub uom: Option<Option<String>>,
    pub unit_price: Option<f64>,
    pub currency: Option<Option<String>>,
    pub note: Option<String>,
    pub line_total: Option<f64>,
    pub line_no: Option<i64>,
    pub tab_index: Option<i64>,
}

impl LinePatch {
    /// Keep only the writable line fields from a client payload.
    pub fn from_payload(payload: Map<String, Value>) -> Result<Self, DeskError> {
        let mut patch = Self::default();
        for (key, value) in payload {
            match key.as_str() {
                "item" => patch.item = Some(coerce::optional_text(value)),
                "uom" => patch.uom = Some(coerce::optional_text(value)),
                "currency" => patch.currency = Some(coerce::optional_text(value)),
                "note" => patch.note = Some(coerce::text(value)),
                "qty" => patch.qty = Some(coerce::float_or_zero(Some(&value))),
                "unit_price" => patch.unit_price = Some(coerce::float_or_zero(Some(&value))),
                "line_total" => patch.line_total = Some(coerce::float_or_zero(Some(&value))),
                "line_no" => patch.line_no = Some(line_no_field(&value)?),
                "tab_index" => patch.tab_index = Some(integer_field("tab_index", &value)?),
                _ => {}
            }
        }
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to `line`. The total is recomputed when qty or unit price changed,
    /// unless an explicit total was supplied alongside.
    pub fn apply(self, line: &mut SoltLine) {
        let recompute =
            self.line_total.is_none() && (self.qty.is_some() || self.unit_price.is_some());

        if let Some(item) = self.item {
            line.item = item;
        }
        if let Some(qty) = self.qty {
            line.qty = qty;
        }
        if let Some(uom) = self.uom {
            line.uom = uom;
        }
        if let Some(unit_price) = self.unit_price {
            line.unit_price = unit_price;
        }
        if let Some(currency) = self.currency {
            line.currency = currency;
        }
        if let Some(note) = self.note {
            line.note = note;
        }
        if let Some(line_total) = self.line_total {
            line.line_total = line_total;
        }
        if let Some(line_no) = self.line_no {
            line.line_no = line_no;
        }
        if let Some(tab_index) = self.tab_index {
            line.tab_index = tab_index;
        }

        if recompute {
            line.line_total = coerce::finite_or_zero(line.qty * line.unit_price);
        }
    }
}

/// Line numbers are 1-based.
fn line_no_field(value: &Value) -> Result<i64, DeskError> {
    match integer_field("line_no", value)? {
        n if n >= 1 => Ok(n),
        _ => Err(DeskError::validation("line_no must be at least 1")),
    }
}

fn integer_field(name: &str, value: &Value) -> Result<i64, DeskError> {
    coerce::integer(value)
        .ok_or_else(|| DeskError::validation(format!("{name} must be an integer")))
}
