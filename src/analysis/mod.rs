//! Run statistics for the reconciliation pipeline.
pub mod report;

pub use report::{PipelineReport, TableReport};
