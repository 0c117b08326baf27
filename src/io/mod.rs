//! Sheet documents: the tabular import/export boundary of the pipeline.
//!
//! A sheet is stored as JSON, `{ "rows": [[cell, ...], ...] }`, mirroring the
//! cells of a spreadsheet tab. The header row holds the fixed exchange
//! vocabulary below followed by free-form scenario column names.
pub mod export;
pub mod import;

pub use export::{export_table, write_sheet_file};
pub use import::{import_sheet, import_sheet_file, load_sheets, parse_tuple_cell};

use serde::{Serialize, Deserialize};
use serde_json::Value;

pub const FROM_ACTIVITY_NAME: &str = "from activity name";
pub const FROM_REFERENCE_PRODUCT: &str = "from reference product";
pub const FROM_LOCATION: &str = "from location";
pub const FROM_CATEGORIES: &str = "from categories";
pub const FROM_DATABASE: &str = "from database";
pub const FROM_KEY: &str = "from key";
pub const TO_ACTIVITY_NAME: &str = "to activity name";
pub const TO_REFERENCE_PRODUCT: &str = "to reference product";
pub const TO_LOCATION: &str = "to location";
pub const TO_CATEGORIES: &str = "to categories";
pub const TO_DATABASE: &str = "to database";
pub const TO_KEY: &str = "to key";
pub const FLOW_TYPE: &str = "flow type";

/// Every column a scenario difference sheet must carry, in export order.
pub const EXCHANGE_COLUMNS: [&str; 13] = [
    FROM_ACTIVITY_NAME,
    FROM_REFERENCE_PRODUCT,
    FROM_LOCATION,
    FROM_CATEGORIES,
    FROM_DATABASE,
    FROM_KEY,
    TO_ACTIVITY_NAME,
    TO_REFERENCE_PRODUCT,
    TO_LOCATION,
    TO_CATEGORIES,
    TO_DATABASE,
    TO_KEY,
    FLOW_TYPE,
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetDocument {
    pub rows: Vec<Vec<Value>>,
}

impl SheetDocument {
    pub fn from_json_str(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
