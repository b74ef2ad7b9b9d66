use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::coerce;

/// Business fields of an RFQ record that clients may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RfqField {
    DeviationsComments,
    Supplier,
    Purchaser,
    SupplierComment,
    OfferReference,
    ProjectCx,
    RfqNumber,
    ProjectCountry,
    Status,
    StatusUpdater,
    ProjectName,
    SupplierSubmitterName,
    UpdatedDate,
    Title,
    StatusChangedDate,
    ContactEmail,
    Creator,
    CommodityMdf,
    ValidUntil,
    GrandTotal,
    RfqDueDate,
    SupplierSubmittedDate,
    Wbs,
    Currency,
    OfferSubmitted,
    SupplierGtcComment,
    FirstAcceptedDate,
    CreatedDate,
    SupplierSubmitterEmail,
    OfferDate,
    ContactLastName,
    ContactFirstName,
}

impl RfqField {
    pub const ALL: [RfqField; 32] = [
        RfqField::DeviationsComments,
        RfqField::Supplier,
        RfqField::Purchaser,
        RfqField::SupplierComment,
        RfqField::OfferReference,
        RfqField::ProjectCx,
        RfqField::RfqNumber,
        RfqField::ProjectCountry,
        RfqField::Status,
        RfqField::StatusUpdater,
        RfqField::ProjectName,
        RfqField::SupplierSubmitterName,
        RfqField::UpdatedDate,
        RfqField::Title,
        RfqField::StatusChangedDate,
        RfqField::ContactEmail,
        RfqField::Creator,
        RfqField::CommodityMdf,
        RfqField::ValidUntil,
        RfqField::GrandTotal,
        RfqField::RfqDueDate,
        RfqField::SupplierSubmittedDate,
        RfqField::Wbs,
        RfqField::Currency,
        RfqField::OfferSubmitted,
        RfqField::SupplierGtcComment,
        RfqField::FirstAcceptedDate,
        RfqField::CreatedDate,
        RfqField::SupplierSubmitterEmail,
        RfqField::OfferDate,
        RfqField::ContactLastName,
        RfqField::ContactFirstName,
    ];

    /// Wire name, also used as the SQLite column name.
    pub fn as_str(self) -> &'static str {
        match self {
            RfqField::DeviationsComments => "deviations_comments",
            RfqField::Supplier => "supplier",
            RfqField::Purchaser => "purchaser",
            RfqField::SupplierComment => "supplier_comment",
            RfqField::OfferReference => "offer_reference",
            RfqField::ProjectCx => "project_cx",
            RfqField::RfqNumber => "rfq_number",
            RfqField::ProjectCountry => "project_country",
            RfqField::Status => "status",
            RfqField::StatusUpdater => "status_updater",
            RfqField::ProjectName => "project_name",
            RfqField::SupplierSubmitterName => "supplier_submitter_name",
            RfqField::UpdatedDate => "updated_date",
            RfqField::Title => "title",
            RfqField::StatusChangedDate => "status_changed_date",
            RfqField::ContactEmail => "contact_email",
            RfqField::Creator => "creator",
            RfqField::CommodityMdf => "commodity_mdf",
            RfqField::ValidUntil => "valid_until",
            RfqField::GrandTotal => "grand_total",
            RfqField::RfqDueDate => "rfq_due_date",
            RfqField::SupplierSubmittedDate => "supplier_submitted_date",
            RfqField::Wbs => "wbs",
            RfqField::Currency => "currency",
            RfqField::OfferSubmitted => "offer_submitted",
            RfqField::SupplierGtcComment => "supplier_gtc_comment",
            RfqField::FirstAcceptedDate => "first_accepted_date",
            RfqField::CreatedDate => "created_date",
            RfqField::SupplierSubmitterEmail => "supplier_submitter_email",
            RfqField::OfferDate => "offer_date",
            RfqField::ContactLastName => "contact_last_name",
            RfqField::ContactFirstName => "contact_first_name",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

/// Keep only allow-listed keys, rendering their values as stored text.
pub fn filter_updates(payload: Map<String, Value>) -> BTreeMap<RfqField, String> {
    payload
        .into_iter()
        .filter_map(|(k, v)| RfqField::from_name(&k).map(|f| (f, coerce::text(v))))
        .collect()
}

/// A flat RFQ record: `{"id": 1, "title": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRfqRecord")]
pub struct RfqRecord {
    pub id: i64,
    #[serde(flatten)]
    pub fields: BTreeMap<RfqField, String>,
}

impl RfqRecord {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, field: RfqField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn merge(&mut self, updates: BTreeMap<RfqField, String>) {
        self.fields.extend(updates);
    }
}

/// Persisted shape; tolerates foreign keys and non-string values in hand-edited files.
#[derive(Deserialize)]
struct RawRfqRecord {
    id: i64,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl From<RawRfqRecord> for RfqRecord {
    fn from(raw: RawRfqRecord) -> Self {
        Self {
            id: raw.id,
            fields: filter_updates(raw.rest),
        }
    }
}
