//! Key resolution and index building: descriptive rows in, keyed rows out.
pub mod builder;
pub mod resolver;

pub use builder::{guess_flow_type, BuildReport, IndexBuilder};
pub use resolver::KeyResolver;
