//! Batched translation of descriptive exchange sides into catalog keys.
use crate::catalog::{Catalog, LookupBatch, MatchTuple};
use crate::error::Result;
use crate::store::{DescriptiveTable, EdgeKey, Side};
use std::collections::HashMap;
use tracing::debug;

/// Resolves the descriptive fields of one side of a table to `EdgeKey`s.
///
/// Each side of each table costs exactly one catalog round-trip: the distinct
/// match tuples are collected first and sent as a single `LookupBatch`.
pub struct KeyResolver<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    biosphere_database: &'a str,
}

impl<'a, C: Catalog + ?Sized> KeyResolver<'a, C> {
    pub fn new(catalog: &'a C, biosphere_database: &'a str) -> Self {
        Self { catalog, biosphere_database }
    }

    pub fn match_tuple(&self, table: &DescriptiveTable, row: usize, side: Side) -> MatchTuple {
        MatchTuple::for_side(table.rows[row].side(side), self.biosphere_database)
    }

    /// Collects the distinct match tuples of every row whose `side` is not
    /// already keyed.
    pub fn batch_for(&self, table: &DescriptiveTable, side: Side) -> LookupBatch {
        let mut batch = LookupBatch::default();
        for row in &table.rows {
            let fields = row.side(side);
            if fields.key.is_some() {
                continue;
            }
            batch.tuples.insert(MatchTuple::for_side(fields, self.biosphere_database));
            batch.databases.insert(fields.database.clone());
        }
        batch
    }

    /// Resolves one side of the table. Tuples the catalog cannot match are
    /// absent from the result; the caller decides whether that is fatal.
    pub fn resolve_side(&self, table: &DescriptiveTable, side: Side) -> Result<HashMap<MatchTuple, EdgeKey>> {
        let batch = self.batch_for(table, side);
        if batch.is_empty() {
            return Ok(HashMap::new());
        }
        let resolved = self.catalog.resolve_batch(&batch)?;
        debug!(side = side.prefix(), requested = batch.len(), matched = resolved.len(), "catalog batch resolved");
        Ok(resolved)
    }
}
