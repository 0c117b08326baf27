//! Combination of several scenario tables into one matrix.
pub mod combiner;
pub mod mode;

pub use combiner::{union_identities, TableCombiner, PRODUCT_SEPARATOR};
pub use mode::CombinationMode;
