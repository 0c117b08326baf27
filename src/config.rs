//! Pipeline configuration, loadable from JSON.
use crate::combine::CombinationMode;
use crate::error::Result;
use serde::{Serialize, Deserialize};
use std::path::Path;

/// How repeated edge identities are treated by the deduplicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The last row seen wins; earlier rows are discarded and counted.
    #[default]
    KeepLast,
    /// Any repeated identity is a `DuplicateEdge` error.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Database holding elementary flows.
    pub biosphere_database: String,
    pub mode: CombinationMode,
    pub duplicate_policy: DuplicatePolicy,
    /// Raise on an unrecognized combination mode instead of returning an
    /// empty-columns table.
    pub strict_mode: bool,
    /// Prefix marking rows and columns to skip at import; empty disables it.
    pub row_exclude_marker: String,
    pub column_exclude_marker: String,
    /// How many leading sheet rows are searched for the header row.
    pub header_search_depth: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            biosphere_database: "biosphere3".to_string(),
            mode: CombinationMode::Product,
            duplicate_policy: DuplicatePolicy::KeepLast,
            strict_mode: false,
            row_exclude_marker: "*".to_string(),
            column_exclude_marker: "#".to_string(),
            header_search_depth: 10,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let cfg = PipelineConfig::from_json_str(r#"{ "mode": "addition", "strict_mode": true }"#).unwrap();
        assert_eq!(cfg.mode, CombinationMode::Addition);
        assert!(cfg.strict_mode);
        assert_eq!(cfg.biosphere_database, "biosphere3");
        assert_eq!(cfg.duplicate_policy, DuplicatePolicy::KeepLast);
    }

    #[test]
    fn test_unknown_mode_is_kept_verbatim() {
        let cfg = PipelineConfig::from_json_str(r#"{ "mode": "stacked" }"#).unwrap();
        assert_eq!(cfg.mode, CombinationMode::Unrecognized("stacked".into()));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "biosphere_database": "ecoinvent-biosphere", "duplicate_policy": "reject" }}"#).unwrap();

        let cfg = PipelineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(cfg.biosphere_database, "ecoinvent-biosphere");
        assert_eq!(cfg.duplicate_policy, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_bad_json_is_reported() {
        assert!(PipelineConfig::from_json_str("{ mode: ").is_err());
    }
}
