use super::*;
use crate::config::PipelineConfig;
use crate::error::{Result, ScenarioError};
use crate::store::{Categories, DescriptiveRow, DescriptiveTable, EdgeKey, ExchangeSide, FlowType};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{info, warn};

/// Reads a sheet document from disk and imports it.
pub fn import_sheet_file(path: impl AsRef<Path>, config: &PipelineConfig) -> Result<DescriptiveTable> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let doc = SheetDocument::from_json_str(&content)?;
    import_sheet(&doc, config)
}

/// Imports several sheets, dropping the ones without any exchange.
pub fn load_sheets<P: AsRef<Path>>(paths: &[P], config: &PipelineConfig) -> Result<Vec<DescriptiveTable>> {
    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        let table = import_sheet_file(path, config)?;
        if table.is_empty() {
            warn!(path = %path.as_ref().display(), "skipping scenario sheet without exchanges");
            continue;
        }
        tables.push(table);
    }
    Ok(tables)
}

/// Converts the cells of one sheet into a descriptive table.
///
/// Columns whose header starts with the column exclude marker and rows whose
/// first cell starts with the row exclude marker are dropped before anything
/// else looks at them. An empty marker excludes nothing. Columns with a blank
/// header are ignored.
pub fn import_sheet(doc: &SheetDocument, config: &PipelineConfig) -> Result<DescriptiveTable> {
    let header_idx = find_header(doc, config.header_search_depth)?;
    let header: Vec<String> = doc.rows[header_idx].iter().map(cell_text).collect();

    // blank header cells are spreadsheet padding, not scenarios
    let kept: Vec<usize> = (0..header.len())
        .filter(|&c| !header[c].trim().is_empty() && !is_marked(&header[c], &config.column_exclude_marker))
        .collect();
    let positions: HashMap<&str, usize> = kept.iter().map(|&c| (header[c].as_str(), c)).collect();

    let missing: Vec<&str> = EXCHANGE_COLUMNS.iter().copied().filter(|c| !positions.contains_key(c)).collect();
    if !missing.is_empty() {
        return Err(ScenarioError::MalformedInput(format!(
            "Missing required column(s) for superstructure: {:?}",
            missing
        )));
    }

    let scenario_idx: Vec<usize> = kept
        .iter()
        .copied()
        .filter(|&c| !EXCHANGE_COLUMNS.contains(&header[c].as_str()))
        .collect();
    let scenario_columns: Vec<String> = scenario_idx.iter().map(|&c| clean_scenario_name(&header[c])).collect();
    let mut seen = HashSet::new();
    for name in &scenario_columns {
        if !seen.insert(name.as_str()) {
            return Err(ScenarioError::MalformedInput(format!("Duplicate scenario column '{}'", name)));
        }
    }

    let mut table = DescriptiveTable::new(scenario_columns);
    let mut excluded = 0;
    for (offset, cells) in doc.rows[header_idx + 1..].iter().enumerate() {
        let sheet_row = header_idx + offset + 2;
        let first = cells.first().map(cell_text).unwrap_or_default();
        if is_marked(&first, &config.row_exclude_marker) {
            excluded += 1;
            continue;
        }
        if cells.iter().all(is_blank) {
            continue;
        }
        let cell = |name: &str| cells.get(positions[name]).unwrap_or(&Value::Null);

        let from = read_side(&cell, [FROM_ACTIVITY_NAME, FROM_REFERENCE_PRODUCT, FROM_LOCATION, FROM_CATEGORIES, FROM_DATABASE, FROM_KEY], sheet_row)?;
        let to = read_side(&cell, [TO_ACTIVITY_NAME, TO_REFERENCE_PRODUCT, TO_LOCATION, TO_CATEGORIES, TO_DATABASE, TO_KEY], sheet_row)?;

        let flow_text = cell_text(cell(FLOW_TYPE));
        let flow_type = if flow_text.trim().is_empty() {
            None
        } else {
            Some(flow_text.parse::<FlowType>().map_err(|_| ScenarioError::InvalidFlowType { row: sheet_row, value: flow_text.clone() })?)
        };

        let values = scenario_idx
            .iter()
            .map(|&c| number_cell(cells.get(c).unwrap_or(&Value::Null), sheet_row, &header[c]))
            .collect::<Result<Vec<f64>>>()?;

        table.push(DescriptiveRow { from, to, flow_type, values })?;
    }

    info!(rows = table.len(), excluded, scenarios = table.scenario_columns.len(), "imported scenario sheet");
    Ok(table)
}

/// Parses a tuple-valued cell: `('a', 'b')`, a JSON array, or a bare string.
pub fn parse_tuple_cell(cell: &Value) -> Option<Vec<String>> {
    match cell {
        Value::Null => None,
        Value::Array(items) => Some(items.iter().map(cell_text).collect()),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else if s.starts_with('(') && s.ends_with(')') {
                Some(quoted_parts(&s[1..s.len() - 1]))
            } else {
                Some(vec![s.to_string()])
            }
        }
        other => Some(vec![other.to_string()]),
    }
}

fn quoted_parts(inner: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\'' || c == '"' {
            parts.push(chars.by_ref().take_while(|&n| n != c).collect());
        }
    }
    parts
}

fn find_header(doc: &SheetDocument, depth: usize) -> Result<usize> {
    doc.rows
        .iter()
        .take(depth)
        .position(|row| row.first().map(|c| cell_text(c).starts_with(FROM_ACTIVITY_NAME)).unwrap_or(false))
        .ok_or_else(|| ScenarioError::MalformedInput("Could not find required headers in given document sheet.".into()))
}

fn read_side<'c, F>(cell: &F, names: [&str; 6], sheet_row: usize) -> Result<ExchangeSide>
where
    F: Fn(&str) -> &'c Value,
{
    let key = match parse_tuple_cell(cell(names[5])) {
        None => None,
        Some(parts) => match parts.as_slice() {
            [database, code] => Some(EdgeKey::new(database.clone(), code.clone())),
            _ => {
                return Err(ScenarioError::MalformedInput(format!(
                    "row {}: '{}' must hold (database, code), got {:?}",
                    sheet_row, names[5], parts
                )))
            }
        },
    };
    Ok(ExchangeSide {
        name: cell_text(cell(names[0])),
        reference_product: cell_text(cell(names[1])),
        location: cell_text(cell(names[2])),
        categories: parse_tuple_cell(cell(names[3])).map(Categories),
        database: cell_text(cell(names[4])),
        key,
    })
}

fn number_cell(cell: &Value, sheet_row: usize, column: &str) -> Result<f64> {
    let bad = || ScenarioError::MalformedInput(format!("row {}: non-numeric value {} in scenario column '{}'", sheet_row, cell, column));
    match cell {
        Value::Null => Ok(0.0),
        Value::Number(n) => n.as_f64().ok_or_else(bad),
        Value::String(s) if s.trim().is_empty() => Ok(0.0),
        Value::String(s) => s.trim().parse().map_err(|_| bad()),
        _ => Err(bad()),
    }
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_marked(text: &str, marker: &str) -> bool {
    !marker.is_empty() && text.starts_with(marker)
}

fn is_blank(cell: &Value) -> bool {
    match cell {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Strips spreadsheet line breaks out of scenario names.
pub(crate) fn clean_scenario_name(name: &str) -> String {
    name.replace('\n', " ").replace('\r', "")
}
