//! Error types shared by every stage of the reconciliation pipeline.
use crate::store::EdgeKey;
use thiserror::Error;

/// Failures raised by a catalog lookup collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Catalog lookup for {query} matched {} entries: {}", .candidates.len(), format_keys(.candidates))]
    Ambiguous { query: String, candidates: Vec<EdgeKey> },
    #[error("Key {0} is not present in the catalog")]
    UnknownKey(EdgeKey),
    #[error("Catalog backend failure: {0}")]
    Backend(String),
}

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error(
        "Cannot find all keys. {} of {total} exchanges are broken; check both the name and the database of: {}",
        .unresolved.len(), .unresolved.join("; ")
    )]
    UnresolvedKeys { total: usize, unresolved: Vec<String> },
    #[error("Ambiguous catalog match for {query}: candidates {}", format_keys(.candidates))]
    AmbiguousCatalogMatch { query: String, candidates: Vec<EdgeKey> },
    #[error("Duplicate exchange {identity} (rows {first} and {second})")]
    DuplicateEdge { identity: String, first: usize, second: usize },
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Unknown combination mode '{0}'")]
    UnknownCombinationMode(String),
    #[error("Invalid flow type '{value}' in row {row}")]
    InvalidFlowType { row: usize, value: String },
    #[error(transparent)]
    Catalog(CatalogError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<CatalogError> for ScenarioError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Ambiguous { query, candidates } => {
                ScenarioError::AmbiguousCatalogMatch { query, candidates }
            }
            other => ScenarioError::Catalog(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScenarioError>;

fn format_keys(keys: &[EdgeKey]) -> String {
    keys.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(", ")
}
