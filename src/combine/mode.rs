use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

/// How several scenario tables are merged into one matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CombinationMode {
    /// Every combination of one column per table becomes an output column.
    #[default]
    Product,
    /// Only column names present in every table are kept; later tables
    /// override earlier ones row by row.
    Addition,
    /// Any other name. Combining with it yields an empty-columns table, or an
    /// error in strict mode.
    Unrecognized(String),
}

impl CombinationMode {
    pub fn as_str(&self) -> &str {
        match self {
            CombinationMode::Product => "product",
            CombinationMode::Addition => "addition",
            CombinationMode::Unrecognized(s) => s,
        }
    }
}

impl FromStr for CombinationMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "product" => CombinationMode::Product,
            "addition" => CombinationMode::Addition,
            _ => CombinationMode::Unrecognized(s.to_string()),
        })
    }
}

impl From<String> for CombinationMode {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(mode) => mode,
            Err(never) => match never {},
        }
    }
}

impl From<CombinationMode> for String {
    fn from(mode: CombinationMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for CombinationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("product", CombinationMode::Product)]
    #[case("Addition", CombinationMode::Addition)]
    #[case(" product ", CombinationMode::Product)]
    #[case("stack", CombinationMode::Unrecognized("stack".into()))]
    fn test_mode_parsing(#[case] input: &str, #[case] expected: CombinationMode) {
        assert_eq!(input.parse::<CombinationMode>().unwrap(), expected);
    }

    #[test]
    fn test_mode_serializes_as_plain_string() {
        assert_eq!(serde_json::to_string(&CombinationMode::Addition).unwrap(), "\"addition\"");
        let back: CombinationMode = serde_json::from_str("\"product\"").unwrap();
        assert_eq!(back, CombinationMode::Product);
    }
}
