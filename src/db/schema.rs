//! SQL DDL for the RFQ and SOLT tables.

/// SQLite schema with:
/// - `rfq`: `id` plus one TEXT column per allow-listed field
/// - `solt_tab`: one row per `(rfq_id, tab_index)`
/// - `solt_line`: `id` AUTOINCREMENT so deleted ids are never handed out again
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS rfq (
    id INTEGER PRIMARY KEY,
    deviations_comments TEXT NULL,
    supplier TEXT NULL,
    purchaser TEXT NULL,
    supplier_comment TEXT NULL,
    offer_reference TEXT NULL,
    project_cx TEXT NULL,
    rfq_number TEXT NULL,
    project_country TEXT NULL,
    status TEXT NULL,
    status_updater TEXT NULL,
    project_name TEXT NULL,
    supplier_submitter_name TEXT NULL,
    updated_date TEXT NULL,
    title TEXT NULL,
    status_changed_date TEXT NULL,
    contact_email TEXT NULL,
    creator TEXT NULL,
    commodity_mdf TEXT NULL,
    valid_until TEXT NULL,
    grand_total TEXT NULL,
    rfq_due_date TEXT NULL,
    supplier_submitted_date TEXT NULL,
    wbs TEXT NULL,
    currency TEXT NULL,
    offer_submitted TEXT NULL,
    supplier_gtc_comment TEXT NULL,
    first_accepted_date TEXT NULL,
    created_date TEXT NULL,
    supplier_submitter_email TEXT NULL,
    offer_date TEXT NULL,
    contact_last_name TEXT NULL,
    contact_first_name TEXT NULL
);

CREATE TABLE IF NOT EXISTS solt_tab (
    rfq_id INTEGER NOT NULL,
    tab_index INTEGER NOT NULL,
    name TEXT NOT NULL,
    PRIMARY KEY (rfq_id, tab_index)
);

CREATE TABLE IF NOT EXISTS solt_line (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rfq_id INTEGER NOT NULL,
    tab_index INTEGER NOT NULL,
    line_no INTEGER NOT NULL,
    item TEXT NULL,
    qty REAL NOT NULL DEFAULT 0,
    uom TEXT NULL,
    unit_price REAL NOT NULL DEFAULT 0,
    currency TEXT NULL,
    line_total REAL NOT NULL DEFAULT 0,
    note TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_solt_line_rfq_tab ON solt_line(rfq_id, tab_index);
"#;
