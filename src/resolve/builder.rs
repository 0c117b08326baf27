//! Turns a descriptive table into keyed rows.
use super::resolver::KeyResolver;
use crate::catalog::Catalog;
use crate::error::{Result, ScenarioError};
use crate::store::{DescriptiveTable, EdgeIdentity, EdgeKey, FlowType, IndexedRows, Side};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub rows: usize,
    /// Exchange sides whose key came from the catalog.
    pub keys_resolved: usize,
    pub flow_types_inferred: usize,
    /// True when every row already carried both keys.
    pub resolution_skipped: bool,
}

/// Best-effort flow type for a row that did not state one.
pub fn guess_flow_type(input: &EdgeKey, output: &EdgeKey, biosphere_database: &str) -> FlowType {
    if output.database == biosphere_database {
        FlowType::Biosphere
    } else if input == output {
        FlowType::Production
    } else {
        FlowType::Technosphere
    }
}

pub struct IndexBuilder<'a, C: Catalog + ?Sized> {
    resolver: KeyResolver<'a, C>,
    biosphere_database: &'a str,
}

impl<'a, C: Catalog + ?Sized> IndexBuilder<'a, C> {
    pub fn new(catalog: &'a C, biosphere_database: &'a str) -> Self {
        Self { resolver: KeyResolver::new(catalog, biosphere_database), biosphere_database }
    }

    /// Resolves keys and flow types for every row.
    ///
    /// Resolution is all-or-nothing: if any row still lacks a key afterwards
    /// the whole table is rejected with every broken side listed.
    pub fn build(&self, table: &DescriptiveTable) -> Result<(IndexedRows, BuildReport)> {
        let mut report = BuildReport { rows: table.len(), ..Default::default() };
        let (from_keys, to_keys) = if table.fully_keyed() {
            report.resolution_skipped = true;
            (self.explicit_keys(table, Side::From), self.explicit_keys(table, Side::To))
        } else {
            let from = self.resolve_keys(table, Side::From, &mut report)?;
            let to = self.resolve_keys(table, Side::To, &mut report)?;
            self.check_resolved(table, &from, &to)?;
            (from, to)
        };

        let mut out = IndexedRows::new(table.scenario_columns.clone());
        out.rows.reserve(table.len());
        for ((row, input), output) in table.rows.iter().zip(from_keys).zip(to_keys) {
            let (Some(input), Some(output)) = (input, output) else {
                // check_resolved guarantees both keys on this path.
                continue;
            };
            let flow_type = match row.flow_type {
                Some(ft) => ft,
                None => {
                    report.flow_types_inferred += 1;
                    guess_flow_type(&input, &output, self.biosphere_database)
                }
            };
            out.rows.push((EdgeIdentity::new(input, output, flow_type), row.values.clone()));
        }

        if report.flow_types_inferred > 0 {
            warn!(inferred = report.flow_types_inferred, "Not all flow types are known, guessed missing flow types");
        }
        info!(rows = report.rows, keys_resolved = report.keys_resolved, "indexed scenario table");
        Ok((out, report))
    }

    fn explicit_keys(&self, table: &DescriptiveTable, side: Side) -> Vec<Option<EdgeKey>> {
        table.rows.iter().map(|r| r.side(side).key.clone()).collect()
    }

    fn resolve_keys(&self, table: &DescriptiveTable, side: Side, report: &mut BuildReport) -> Result<Vec<Option<EdgeKey>>> {
        let matches = self.resolver.resolve_side(table, side)?;
        let keys = (0..table.len())
            .map(|i| match &table.rows[i].side(side).key {
                Some(key) => Some(key.clone()),
                None => {
                    let found = matches.get(&self.resolver.match_tuple(table, i, side)).cloned();
                    if found.is_some() {
                        report.keys_resolved += 1;
                    }
                    found
                }
            })
            .collect();
        Ok(keys)
    }

    fn check_resolved(&self, table: &DescriptiveTable, from: &[Option<EdgeKey>], to: &[Option<EdgeKey>]) -> Result<()> {
        let mut unresolved = Vec::new();
        for (i, (f, t)) in from.iter().zip(to).enumerate() {
            for (side, key) in [(Side::From, f), (Side::To, t)] {
                if key.is_none() {
                    let fields = table.rows[i].side(side);
                    unresolved.push(format!(
                        "row {} {} {} in '{}'",
                        i,
                        side.prefix(),
                        self.resolver.match_tuple(table, i, side),
                        fields.database
                    ));
                }
            }
        }
        if unresolved.is_empty() {
            Ok(())
        } else {
            Err(ScenarioError::UnresolvedKeys { total: table.len(), unresolved })
        }
    }
}
