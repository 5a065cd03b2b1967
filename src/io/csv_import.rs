use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{GanttError, Result};
use crate::schedule::normalize::{Column, RawRow};

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs && semicolons > 0 {
        b';'
    } else if tabs > commas {
        b'\t'
    } else {
        b','
    }
}

/// Parse CSV text into raw rows.
///
/// Auto-detects delimiter (comma, semicolon, tab). Headers are kept as
/// written; the normalizer matches them flexibly. Fails only when the text
/// has no recognizable id column.
pub fn rows_from_str(content: &str) -> Result<Vec<RawRow>> {
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if !headers
        .iter()
        .any(|h| Column::from_header(h) == Some(Column::Id))
    {
        return Err(GanttError::MissingIdColumn(headers));
    }

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line = i + 2, error = %e, "skipping unreadable CSV row");
                continue;
            }
        };
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, field)| (h.clone(), Value::String(field.to_string())))
            .collect();
        rows.push(row);
    }

    debug!(rows = rows.len(), delimiter = %(delimiter as char), "CSV task table read");
    Ok(rows)
}

/// Read a CSV task table from disk.
pub fn import_csv(path: &Path) -> Result<Vec<RawRow>> {
    let content = std::fs::read_to_string(path)?;
    rows_from_str(&content)
}
