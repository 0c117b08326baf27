use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

/// A resolved network node: (database, code).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    pub database: String,
    pub code: String,
}

impl EdgeKey {
    pub fn new(database: impl Into<String>, code: impl Into<String>) -> Self {
        Self { database: database.into(), code: code.into() }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "('{}', '{}')", self.database, self.code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
    Biosphere,
    Technosphere,
    Production,
}

impl FlowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowType::Biosphere => "biosphere",
            FlowType::Technosphere => "technosphere",
            FlowType::Production => "production",
        }
    }
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "biosphere" => Ok(FlowType::Biosphere),
            "technosphere" => Ok(FlowType::Technosphere),
            "production" => Ok(FlowType::Production),
            other => Err(format!("unknown flow type '{}'", other)),
        }
    }
}

/// Row identity of a scenario table: (input key, output key, flow type).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeIdentity {
    pub input: EdgeKey,
    pub output: EdgeKey,
    pub flow_type: FlowType,
}

impl EdgeIdentity {
    pub fn new(input: EdgeKey, output: EdgeKey, flow_type: FlowType) -> Self {
        Self { input, output, flow_type }
    }

    #[inline]
    pub fn is_self_loop(&self) -> bool { self.input == self.output }

    /// The same edge retyped, e.g. a technosphere self-loop's production twin.
    pub fn with_flow_type(&self, flow_type: FlowType) -> Self {
        Self { input: self.input.clone(), output: self.output.clone(), flow_type }
    }
}

impl fmt::Display for EdgeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} [{}]", self.input, self.output, self.flow_type)
    }
}

/// Elementary-flow compartments, e.g. `("air", "urban air close to ground")`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Categories(pub Vec<String>);

impl fmt::Display for Categories {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|c| format!("'{}'", c)).collect();
        write!(f, "({})", parts.join(", "))
    }
}
