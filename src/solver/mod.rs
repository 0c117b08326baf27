//! Hand-off of the combined scenario matrix to the downstream solver.
pub mod input;

pub use input::{filter_by_output_databases, scenario_table_from_arrays, ExchangeEdge, SolverInput};
