//! Pre-resolution rows: exchanges described by name/product/location/database
//! rather than by key. These only live until the index builder consumes them.

use super::types::{Categories, EdgeKey, FlowType};
use crate::error::{Result, ScenarioError};

/// Which end of an exchange a set of descriptive fields refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    From,
    To,
}

impl Side {
    pub fn prefix(&self) -> &'static str {
        match self { Side::From => "from", Side::To => "to" }
    }
}

/// One end of an exchange. Empty strings stand for blank cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeSide {
    pub name: String,
    pub reference_product: String,
    pub location: String,
    pub categories: Option<Categories>,
    pub database: String,
    pub key: Option<EdgeKey>,
}

impl ExchangeSide {
    pub fn activity(name: &str, product: &str, location: &str, database: &str) -> Self {
        Self {
            name: name.into(),
            reference_product: product.into(),
            location: location.into(),
            database: database.into(),
            ..Default::default()
        }
    }

    pub fn flow(name: &str, categories: &[&str], database: &str) -> Self {
        Self {
            name: name.into(),
            categories: Some(Categories(categories.iter().map(|c| c.to_string()).collect())),
            database: database.into(),
            ..Default::default()
        }
    }

    pub fn keyed(key: EdgeKey) -> Self {
        Self { database: key.database.clone(), key: Some(key), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveRow {
    pub from: ExchangeSide,
    pub to: ExchangeSide,
    pub flow_type: Option<FlowType>,
    pub values: Vec<f64>,
}

impl DescriptiveRow {
    pub fn side(&self, side: Side) -> &ExchangeSide {
        match side { Side::From => &self.from, Side::To => &self.to }
    }

    pub fn has_keys(&self) -> bool {
        self.from.key.is_some() && self.to.key.is_some()
    }
}

/// A scenario difference table as it comes out of the import layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptiveTable {
    pub scenario_columns: Vec<String>,
    pub rows: Vec<DescriptiveRow>,
}

impl DescriptiveTable {
    pub fn new(scenario_columns: Vec<String>) -> Self {
        Self { scenario_columns, rows: Vec::new() }
    }

    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn push(&mut self, row: DescriptiveRow) -> Result<()> {
        if row.values.len() != self.scenario_columns.len() {
            return Err(ScenarioError::MalformedInput(format!(
                "row {} has {} scenario values, table has {} scenario columns",
                self.rows.len(), row.values.len(), self.scenario_columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// True when no row needs catalog resolution.
    pub fn fully_keyed(&self) -> bool {
        self.rows.iter().all(DescriptiveRow::has_keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_rejects_mismatched_width() {
        let mut table = DescriptiveTable::new(vec!["s1".into(), "s2".into()]);
        let row = DescriptiveRow {
            from: ExchangeSide::activity("steel", "steel", "GLO", "db"),
            to: ExchangeSide::activity("car", "car", "DE", "db"),
            flow_type: None,
            values: vec![1.0],
        };
        let err = table.push(row).unwrap_err();
        assert!(err.to_string().contains("1 scenario values"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_fully_keyed() {
        let mut table = DescriptiveTable::new(vec!["s1".into()]);
        let keyed = DescriptiveRow {
            from: ExchangeSide::keyed(EdgeKey::new("db", "a")),
            to: ExchangeSide::keyed(EdgeKey::new("db", "b")),
            flow_type: Some(FlowType::Technosphere),
            values: vec![1.0],
        };
        table.push(keyed.clone()).unwrap();
        assert!(table.fully_keyed());

        let mut partial = keyed;
        partial.to.key = None;
        table.push(partial).unwrap();
        assert!(!table.fully_keyed());
    }
}
