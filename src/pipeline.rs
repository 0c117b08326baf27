//! End-to-end reconciliation: descriptive tables in, one scenario matrix out.
//!
//! Each table is indexed, deduplicated and netted on its own; those branches
//! run in parallel and join before the combiner sees any of them.
use crate::analysis::{PipelineReport, TableReport};
use crate::catalog::Catalog;
use crate::combine::TableCombiner;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::io::load_sheets;
use crate::resolve::IndexBuilder;
use crate::store::{DescriptiveTable, ScenarioTable};
use crate::transform::{deduplicate, net_self_loops};
use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

pub struct ScenarioPipeline<'a, C: Catalog + Sync + ?Sized> {
    catalog: &'a C,
    config: PipelineConfig,
}

impl<'a, C: Catalog + Sync + ?Sized> ScenarioPipeline<'a, C> {
    pub fn new(catalog: &'a C, config: PipelineConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Indexes, deduplicates and nets a single table.
    pub fn format_table(&self, table: &DescriptiveTable) -> Result<(ScenarioTable, PipelineReport)> {
        let (out, table_report) = self.format_one(table)?;
        let report = PipelineReport {
            rows: out.len(),
            columns: out.width(),
            tables: vec![table_report],
            combined_duplicates_dropped: 0,
        };
        Ok((out, report))
    }

    /// Formats every non-empty table and combines the results in input order.
    ///
    /// Any table failing to resolve fails the whole run.
    pub fn combine_tables(&self, tables: Vec<DescriptiveTable>) -> Result<(ScenarioTable, PipelineReport)> {
        let before = tables.len();
        let tables: Vec<DescriptiveTable> = tables.into_iter().filter(|t| !t.is_empty()).collect();
        if tables.len() < before {
            warn!(dropped = before - tables.len(), "ignoring scenario tables without exchanges");
        }

        let formatted: Vec<(ScenarioTable, TableReport)> =
            tables.par_iter().map(|t| self.format_one(t)).collect::<Result<_>>()?;
        let (formatted, table_reports): (Vec<ScenarioTable>, Vec<TableReport>) = formatted.into_iter().unzip();

        let combiner = TableCombiner::new(self.config.mode.clone())
            .with_duplicate_policy(self.config.duplicate_policy)
            .strict(self.config.strict_mode);
        let (combined, dropped) = combiner.combine(&formatted)?;

        let report = PipelineReport {
            tables: table_reports,
            combined_duplicates_dropped: dropped,
            rows: combined.len(),
            columns: combined.width(),
        };
        info!(rows = report.rows, columns = report.columns, mode = %self.config.mode, "combined scenario tables");
        Ok((combined, report))
    }

    /// Imports sheet files and runs them through `combine_tables`.
    pub fn run_sheets<P: AsRef<Path>>(&self, paths: &[P]) -> Result<(ScenarioTable, PipelineReport)> {
        let tables = load_sheets(paths, &self.config)?;
        self.combine_tables(tables)
    }

    fn format_one(&self, table: &DescriptiveTable) -> Result<(ScenarioTable, TableReport)> {
        let builder = IndexBuilder::new(self.catalog, &self.config.biosphere_database);
        let (indexed, build) = builder.build(table)?;
        let (deduped, dropped) = deduplicate(&indexed, self.config.duplicate_policy)?;
        let (netted, netting) = net_self_loops(&deduped, self.catalog)?;
        debug!(rows_in = table.len(), rows_out = netted.len(), "formatted scenario table");
        let report = TableReport::from_stages(&build, dropped, &netting, netted.len());
        Ok((netted, report))
    }
}
