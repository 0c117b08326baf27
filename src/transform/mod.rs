//! Table-level corrections applied after indexing.
pub mod dedup;
pub mod netting;

pub use dedup::{deduplicate, deduplicate_table};
pub use netting::{net_self_loops, NettingReport};
