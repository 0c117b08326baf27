//! Human-readable renderings for debugging scenario data.
pub mod table;

pub use table::format_table;
