use crate::store::ScenarioTable;
use std::fmt::Write;

/// Plain-text dump of a scenario table, one exchange per line.
///
/// At most `max_rows` exchanges are printed; the remainder is summarized.
pub fn format_table(table: &ScenarioTable, max_rows: usize) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "SCENARIO TABLE ({} exchanges x {} scenarios)", table.len(), table.width());
    let _ = writeln!(output, "--------------------------------------------------");
    if table.width() > 0 {
        let _ = writeln!(output, "scenarios: {}", table.columns().join(" | "));
    }

    for (id, values) in table.iter().take(max_rows) {
        let cells: Vec<String> = values.iter().map(|v| format!("{:.3}", v)).collect();
        let _ = writeln!(output, "{} = [{}]", id, cells.join(", "));
    }

    if table.len() > max_rows {
        let _ = writeln!(output, "... {} more exchanges", table.len() - max_rows);
    }
    output
}
