use crate::resolve::BuildReport;
use crate::transform::NettingReport;
use std::fmt;

/// Counts of the non-fatal corrections made while formatting one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableReport {
    pub rows_read: usize,
    pub keys_resolved: usize,
    pub flow_types_inferred: usize,
    pub duplicates_dropped: usize,
    pub self_loops_netted: usize,
    pub productions_synthesized: usize,
    pub rows_out: usize,
}

impl TableReport {
    pub fn from_stages(build: &BuildReport, duplicates_dropped: usize, netting: &NettingReport, rows_out: usize) -> Self {
        Self {
            rows_read: build.rows,
            keys_resolved: build.keys_resolved,
            flow_types_inferred: build.flow_types_inferred,
            duplicates_dropped,
            self_loops_netted: netting.self_loops_netted,
            productions_synthesized: netting.productions_synthesized,
            rows_out,
        }
    }
}

/// Everything a pipeline run did, per input table plus the combination step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub tables: Vec<TableReport>,
    /// Rows discarded by the duplicate pass after combination.
    pub combined_duplicates_dropped: usize,
    pub rows: usize,
    pub columns: usize,
}

impl PipelineReport {
    pub fn total_inferred(&self) -> usize {
        self.tables.iter().map(|t| t.flow_types_inferred).sum()
    }

    pub fn total_duplicates_dropped(&self) -> usize {
        self.tables.iter().map(|t| t.duplicates_dropped).sum::<usize>() + self.combined_duplicates_dropped
    }

    pub fn total_self_loops_netted(&self) -> usize {
        self.tables.iter().map(|t| t.self_loops_netted).sum()
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scenario matrix: {} exchanges x {} scenarios", self.rows, self.columns)?;
        for (i, t) in self.tables.iter().enumerate() {
            writeln!(
                f,
                "  table {}: {} rows read, {} keys resolved, {} flow types guessed, {} duplicates dropped, {} self-loops netted ({} production rows added)",
                i, t.rows_read, t.keys_resolved, t.flow_types_inferred, t.duplicates_dropped, t.self_loops_netted, t.productions_synthesized
            )?;
        }
        if self.combined_duplicates_dropped > 0 {
            writeln!(f, "  combination: {} duplicates dropped", self.combined_duplicates_dropped)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_and_rendering() {
        let build = BuildReport { rows: 5, keys_resolved: 10, flow_types_inferred: 2, resolution_skipped: false };
        let netting = NettingReport { self_loops_netted: 1, productions_synthesized: 1 };
        let report = PipelineReport {
            tables: vec![TableReport::from_stages(&build, 1, &netting, 4), TableReport::default()],
            combined_duplicates_dropped: 3,
            rows: 4,
            columns: 2,
        };

        assert_eq!(report.total_inferred(), 2);
        assert_eq!(report.total_duplicates_dropped(), 4);
        assert_eq!(report.total_self_loops_netted(), 1);

        let text = report.to_string();
        assert!(text.starts_with("Scenario matrix: 4 exchanges x 2 scenarios"));
        assert!(text.contains("table 0: 5 rows read, 10 keys resolved, 2 flow types guessed"));
        assert!(text.contains("combination: 3 duplicates dropped"));
    }
}
