//! table.rs
//! Dense row-major scenario storage keyed by `EdgeIdentity`.

use super::types::EdgeIdentity;
use crate::error::{Result, ScenarioError};
use serde::{Serialize, Deserialize};
use std::collections::HashMap;

/// Keyed rows straight out of the index builder. Identities may repeat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedRows {
    pub columns: Vec<String>,
    pub rows: Vec<(EdgeIdentity, Vec<f64>)>,
}

impl IndexedRows {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
}

/// A scenario table with unique row identities.
///
/// Values are stored in one flat buffer, `identities.len() * columns.len()`
/// long; row `i` occupies `values[i * width..(i + 1) * width]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTable {
    columns: Vec<String>,
    identities: Vec<EdgeIdentity>,
    values: Vec<f64>,

    // Lookup cache (not serialized, rebuilt on load)
    #[serde(skip)]
    positions: HashMap<EdgeIdentity, usize>,
}

impl ScenarioTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, ..Default::default() }
    }

    pub fn with_capacity(columns: Vec<String>, rows: usize) -> Self {
        let width = columns.len();
        Self {
            columns,
            identities: Vec::with_capacity(rows),
            values: Vec::with_capacity(rows * width),
            positions: HashMap::with_capacity(rows),
        }
    }

    /// Rebuilds the identity lookup after deserialization.
    pub fn rebuild_index(&mut self) {
        self.positions = self.identities.iter().cloned().enumerate().map(|(i, id)| (id, i)).collect();
    }

    pub fn columns(&self) -> &[String] { &self.columns }
    pub fn width(&self) -> usize { self.columns.len() }
    pub fn len(&self) -> usize { self.identities.len() }
    pub fn is_empty(&self) -> bool { self.identities.is_empty() }
    pub fn identities(&self) -> &[EdgeIdentity] { &self.identities }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    #[inline]
    pub fn index_of(&self, identity: &EdgeIdentity) -> Option<usize> {
        self.positions.get(identity).copied()
    }

    pub fn contains(&self, identity: &EdgeIdentity) -> bool {
        self.positions.contains_key(identity)
    }

    #[inline]
    pub fn row_at(&self, idx: usize) -> &[f64] {
        let width = self.width();
        &self.values[idx * width..(idx + 1) * width]
    }

    pub fn row(&self, identity: &EdgeIdentity) -> Option<&[f64]> {
        self.index_of(identity).map(|i| self.row_at(i))
    }

    pub fn value(&self, identity: &EdgeIdentity, column: usize) -> Option<f64> {
        self.row(identity).and_then(|r| r.get(column).copied())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EdgeIdentity, &[f64])> {
        self.identities.iter().enumerate().map(move |(i, id)| (id, self.row_at(i)))
    }

    /// The flat row-major value buffer.
    pub fn values(&self) -> &[f64] { &self.values }

    /// Appends a row. Fails if the identity is already present or the row
    /// width does not match the column count.
    pub fn insert(&mut self, identity: EdgeIdentity, values: &[f64]) -> Result<()> {
        self.check_width(values)?;
        if let Some(first) = self.index_of(&identity) {
            return Err(ScenarioError::DuplicateEdge {
                identity: identity.to_string(),
                first,
                second: self.len(),
            });
        }
        self.push_unchecked(identity, values);
        Ok(())
    }

    /// Writes a row, overwriting in place when the identity already exists.
    pub fn upsert(&mut self, identity: EdgeIdentity, values: &[f64]) -> Result<()> {
        self.check_width(values)?;
        match self.index_of(&identity) {
            Some(idx) => {
                let width = self.width();
                self.values[idx * width..(idx + 1) * width].copy_from_slice(values);
            }
            None => self.push_unchecked(identity, values),
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn set_cell(&mut self, row: usize, column: usize, value: f64) {
        let width = self.width();
        self.values[row * width + column] = value;
    }

    /// Builds a new table keeping only the rows accepted by `keep`, in order.
    pub fn filter<F>(&self, mut keep: F) -> ScenarioTable
    where
        F: FnMut(&EdgeIdentity, &[f64]) -> bool,
    {
        let mut out = ScenarioTable::new(self.columns.clone());
        for (id, row) in self.iter() {
            if keep(id, row) {
                out.push_unchecked(id.clone(), row);
            }
        }
        out
    }

    fn push_unchecked(&mut self, identity: EdgeIdentity, values: &[f64]) {
        self.positions.insert(identity.clone(), self.identities.len());
        self.identities.push(identity);
        self.values.extend_from_slice(values);
    }

    fn check_width(&self, values: &[f64]) -> Result<()> {
        if values.len() != self.width() {
            return Err(ScenarioError::MalformedInput(format!(
                "row has {} values, table has {} scenario columns",
                values.len(), self.width()
            )));
        }
        Ok(())
    }
}
