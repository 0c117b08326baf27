use super::*;
use crate::error::Result;
use crate::store::ScenarioTable;
use serde_json::json;
use std::path::Path;

/// Renders a scenario table as a keyed sheet. Descriptive fields are left
/// blank; the `from key`/`to key` cells carry the identity, so re-importing
/// the sheet skips catalog resolution.
pub fn export_table(table: &ScenarioTable) -> SheetDocument {
    let mut rows = Vec::with_capacity(table.len() + 1);
    rows.push(
        EXCHANGE_COLUMNS
            .iter()
            .map(|c| json!(c))
            .chain(table.columns().iter().map(|c| json!(c)))
            .collect(),
    );

    for (id, values) in table.iter() {
        let mut row = Vec::with_capacity(EXCHANGE_COLUMNS.len() + values.len());
        // from: name, product, location, categories, database, key
        row.extend([Value::Null, Value::Null, Value::Null, Value::Null]);
        row.push(json!(id.input.database));
        row.push(json!([id.input.database, id.input.code]));
        row.extend([Value::Null, Value::Null, Value::Null, Value::Null]);
        row.push(json!(id.output.database));
        row.push(json!([id.output.database, id.output.code]));
        row.push(json!(id.flow_type.as_str()));
        row.extend(values.iter().map(|v| json!(v)));
        rows.push(row);
    }
    SheetDocument { rows }
}

pub fn write_sheet_file(doc: &SheetDocument, path: impl AsRef<Path>) -> Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), doc)?;
    Ok(())
}
