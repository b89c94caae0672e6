use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::errors::AppResult;
use crate::table::{LabeledTable, LABEL_COLUMN};

/// Render one cell; missing values and JSON nulls become empty cells.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Write the table as tab-separated text: a header row, then one row per
/// record prefixed with its 0-based position.
pub fn write_tsv<W: Write>(table: &LabeledTable, writer: W) -> AppResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);

    let columns = table.columns();

    let mut header = Vec::with_capacity(columns.len() + 1);
    header.push(String::new());
    header.extend(columns.iter().cloned());
    wtr.write_record(&header)?;

    for (index, (record, label)) in table.rows().iter().enumerate() {
        let mut row = Vec::with_capacity(columns.len() + 1);
        row.push(index.to_string());
        for column in &columns {
            if column == LABEL_COLUMN {
                row.push(label.as_str().to_string());
            } else {
                row.push(cell(record.get(column)));
            }
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_tsv_file(table: &LabeledTable, path: &Path) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    write_tsv(table, file)?;

    log::info!("Wrote {} rows to {}", table.len(), path.display());
    Ok(())
}
