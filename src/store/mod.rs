//! Core data model: keys, identities, descriptive rows and scenario tables.
pub mod descriptive;
pub mod table;
pub mod types;

pub use descriptive::{DescriptiveRow, DescriptiveTable, ExchangeSide, Side};
pub use table::{IndexedRows, ScenarioTable};
pub use types::{Categories, EdgeIdentity, EdgeKey, FlowType};
