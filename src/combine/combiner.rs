//! Merges several keyed, deduplicated and netted tables into one matrix.
use super::mode::CombinationMode;
use crate::config::DuplicatePolicy;
use crate::error::{Result, ScenarioError};
use crate::store::{EdgeIdentity, IndexedRows, ScenarioTable};
use crate::transform::deduplicate;
use smallvec::SmallVec;
use std::collections::HashSet;
use tracing::warn;

/// Separator between the per-table column names of a product column.
pub const PRODUCT_SEPARATOR: &str = " :: ";

/// One column picked from each input table, by index.
type ColumnChoice = SmallVec<[usize; 4]>;

#[derive(Debug, Clone, Default)]
pub struct TableCombiner {
    pub mode: CombinationMode,
    pub duplicate_policy: DuplicatePolicy,
    pub strict: bool,
}

impl TableCombiner {
    pub fn new(mode: CombinationMode) -> Self {
        Self { mode, ..Default::default() }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Combines `tables` in order. Returns the matrix and the number of rows
    /// the post-combination duplicate pass discarded.
    ///
    /// Strict mode rejects an unrecognized mode for any number of tables; a
    /// single table otherwise passes through unchanged.
    pub fn combine(&self, tables: &[ScenarioTable]) -> Result<(ScenarioTable, usize)> {
        if let (true, CombinationMode::Unrecognized(name)) = (self.strict, &self.mode) {
            return Err(ScenarioError::UnknownCombinationMode(name.clone()));
        }
        match tables {
            [] => return Ok((ScenarioTable::default(), 0)),
            [single] => return Ok((single.clone(), 0)),
            _ => {}
        }
        match &self.mode {
            CombinationMode::Product => Ok((product_combine(tables)?, 0)),
            CombinationMode::Addition => addition_combine(tables, self.duplicate_policy),
            CombinationMode::Unrecognized(name) => {
                warn!(mode = %name, "unrecognized combination mode, returning table without scenario columns");
                let mut out = ScenarioTable::new(Vec::new());
                for id in union_identities(tables) {
                    out.insert(id, &[])?;
                }
                Ok((out, 0))
            }
        }
    }
}

/// Every identity of every table, in first-seen order.
pub fn union_identities(tables: &[ScenarioTable]) -> Vec<EdgeIdentity> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for table in tables {
        for id in table.identities() {
            if seen.insert(id) {
                out.push(id.clone());
            }
        }
    }
    out
}

/// Cartesian product of column indices, leftmost table varying slowest.
fn column_choices(tables: &[ScenarioTable]) -> Vec<ColumnChoice> {
    let mut choices: Vec<ColumnChoice> = vec![SmallVec::new()];
    for table in tables {
        choices = choices
            .into_iter()
            .flat_map(|prefix| {
                (0..table.width()).map(move |c| {
                    let mut next = prefix.clone();
                    next.push(c);
                    next
                })
            })
            .collect();
    }
    choices
}

fn product_combine(tables: &[ScenarioTable]) -> Result<ScenarioTable> {
    let choices = column_choices(tables);
    let columns: Vec<String> = choices
        .iter()
        .map(|choice| {
            choice
                .iter()
                .zip(tables)
                .map(|(&c, t)| t.columns()[c].as_str())
                .collect::<Vec<_>>()
                .join(PRODUCT_SEPARATOR)
        })
        .collect();

    let identities = union_identities(tables);
    let mut out = ScenarioTable::with_capacity(columns, identities.len());
    let blank = vec![0.0; out.width()];
    for id in identities {
        out.insert(id, &blank)?;
    }

    // Table i fills every output column from its own chosen column i at the
    // identities it defines; later tables overwrite earlier ones.
    for (t, table) in tables.iter().enumerate() {
        for (id, row) in table.iter() {
            let Some(r) = out.index_of(id) else { continue };
            for (c, choice) in choices.iter().enumerate() {
                out.set_cell(r, c, row[choice[t]]);
            }
        }
    }
    Ok(out)
}

fn addition_combine(tables: &[ScenarioTable], policy: DuplicatePolicy) -> Result<(ScenarioTable, usize)> {
    let columns: Vec<String> = tables[0]
        .columns()
        .iter()
        .filter(|name| tables[1..].iter().all(|t| t.column_index(name).is_some()))
        .cloned()
        .collect();

    let mut rows = IndexedRows::new(columns.clone());
    for table in tables {
        let picks: Vec<usize> = columns.iter().filter_map(|name| table.column_index(name)).collect();
        for (id, row) in table.iter() {
            rows.rows.push((id.clone(), picks.iter().map(|&c| row[c]).collect()));
        }
    }
    deduplicate(&rows, policy)
}
