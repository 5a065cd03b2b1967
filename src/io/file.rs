use std::path::Path;

use crate::errors::{GanttError, Result};
use crate::model::{ResolvedTask, TaskTable};
use crate::schedule::{RawRow, Schedule};

/// Load a JSON task table: an array of row objects.
pub fn load_rows_json(path: &Path) -> Result<Vec<RawRow>> {
    let json = std::fs::read_to_string(path)?;
    let rows: Vec<RawRow> = serde_json::from_str(&json)?;
    Ok(rows)
}

/// Save the scheduled table as JSON, rows in table order.
///
/// Each row carries its normalized fields plus the resolved `start`,
/// `finish` and `kind`, so the file can be read back with
/// [`load_rows_json`].
pub fn save_table(table: &TaskTable, schedule: &Schedule, path: &Path) -> Result<()> {
    let rows: Vec<&ResolvedTask> = table
        .iter()
        .filter_map(|r| schedule.get(&r.id))
        .collect();
    let json = serde_json::to_string_pretty(&rows)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load rows from a `.csv` or `.json` task table.
pub fn load_rows(path: &Path) -> Result<Vec<RawRow>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "csv" | "txt" | "tsv" => super::csv_import::import_csv(path),
        "json" => load_rows_json(path),
        other => Err(GanttError::UnsupportedFormat(format!(
            "{} (extension '{other}')",
            path.display()
        ))),
    }
}
