//! Reconciliation of scenario difference tables into a single scenario matrix.
//!
//! Descriptive tables name their exchanges by activity name, product,
//! location and database. The pipeline resolves those against a catalog,
//! drops repeated exchanges, folds self-loops into production and finally
//! merges several tables by product or addition of their scenario columns.

pub mod analysis;
pub mod catalog;
pub mod combine;
pub mod config;
pub mod display;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod resolve;
pub mod solver;
pub mod store;
pub mod transform;

pub use catalog::{Catalog, InMemoryCatalog};
pub use combine::{CombinationMode, TableCombiner};
pub use config::{DuplicatePolicy, PipelineConfig};
pub use error::{CatalogError, Result, ScenarioError};
pub use pipeline::ScenarioPipeline;
pub use store::{DescriptiveTable, EdgeIdentity, EdgeKey, FlowType, ScenarioTable};
