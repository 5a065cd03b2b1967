//! Row normalizer: raw store rows in, typed [`TaskRecord`]s out.
//!
//! Rows come from whatever backs the task table, so every cell is treated as
//! untrusted. Nothing in here fails: bad cells get a default and rows without
//! an id are dropped.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::debug;

use crate::model::{ColorChoice, TaskRecord, TaskStatus, TaskTable, MAX_DURATION_DAYS, NO_PROJECT};

/// One row as delivered by the store: column name → untyped cell.
pub type RawRow = BTreeMap<String, Value>;

/// The task table columns the scheduler understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Column {
    Id,
    Parent,
    Project,
    Name,
    Predecessor,
    Duration,
    ManualStart,
    Hours,
    Responsible,
    Notes,
    Color,
    Status,
}

impl Column {
    /// Match a header flexibly (case, spaces, dashes and underscores ignored).
    pub fn from_header(header: &str) -> Option<Column> {
        match normalize_header(header).as_str() {
            "id" | "taskid" | "key" | "code" => Some(Column::Id),

            "parent" | "parentid" | "parenttask" | "subtaskof" | "padre" | "idpadre" => {
                Some(Column::Parent)
            }

            "project" | "projectname" | "phase" | "fase" | "proyecto" | "group" => {
                Some(Column::Project)
            }

            "name" | "task" | "taskname" | "tasklabel" | "title" | "label" | "activity"
            | "tarea" => Some(Column::Name),

            "predecessor" | "predecessorid" | "dependency" | "dependson" | "after"
            | "dependencia" | "predecesor" => Some(Column::Predecessor),

            "duration" | "durationdays" | "days" | "duracion" | "dias" | "diasduracion" => {
                Some(Column::Duration)
            }

            // Plain "start" is left out: saved tables carry the resolved start
            // under that name.
            "manualstart" | "manualstartdate" | "inicio" | "fechainicio" => {
                Some(Column::ManualStart)
            }

            "hours" | "estimatedhours" | "effort" | "horas" | "horasestimadas" => {
                Some(Column::Hours)
            }

            "responsible" | "owner" | "assignee" | "assignedto" | "responsable" => {
                Some(Column::Responsible)
            }

            "notes" | "note" | "description" | "details" | "comments" | "notas" => {
                Some(Column::Notes)
            }

            "color" | "colour" | "colorchoice" => Some(Column::Color),

            "status" | "state" | "estado" => Some(Column::Status),

            _ => None,
        }
    }
}

fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

/// Tokens that spreadsheets and dataframes use for "no value".
fn is_null_token(s: &str) -> bool {
    s.is_empty()
        || s.eq_ignore_ascii_case("none")
        || s.eq_ignore_ascii_case("nan")
        || s.eq_ignore_ascii_case("null")
}

/// Text content of a cell, or `None` when the cell is empty or a null token.
pub fn cell_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
    };
    if is_null_token(&text) { None } else { Some(text) }
}

/// Day count; anything unparseable, below 1 or above
/// [`MAX_DURATION_DAYS`] becomes 1.
pub fn parse_duration(text: Option<&str>) -> i64 {
    let Some(text) = text else { return 1 };
    let days = text.parse::<i64>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0 && f.abs() <= MAX_DURATION_DAYS as f64)
            .map(|f| f as i64)
    });
    days.filter(|d| (1..=MAX_DURATION_DAYS).contains(d)).unwrap_or(1)
}

/// Hour estimate; anything unparseable or negative becomes 0.
///
/// Commas that group the integer part in threes (`1,000` or `12,500.5`) are
/// thousands separators. A single comma otherwise is a decimal comma (`7,5`).
pub fn parse_hours(text: Option<&str>) -> f64 {
    let Some(text) = text else { return 0.0 };
    let cleaned = if is_thousands_grouped(text) {
        text.replace(',', "")
    } else if text.matches(',').count() == 1 && !text.contains('.') {
        text.replace(',', ".")
    } else {
        text.to_string()
    };
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|h| h.is_finite() && *h >= 0.0)
        .unwrap_or(0.0)
}

fn is_thousands_grouped(text: &str) -> bool {
    let integer = text.split('.').next().unwrap_or("");
    let mut groups = integer.split(',');
    let Some(lead) = groups.next() else { return false };
    let all_digits = |g: &str| !g.is_empty() && g.bytes().all(|b| b.is_ascii_digit());
    let mut rest = groups.peekable();
    rest.peek().is_some()
        && all_digits(lead)
        && lead.len() <= 3
        && rest.all(|g| g.len() == 3 && all_digits(g))
}

/// Try parsing a date string with several common formats.
///
/// Datetimes are accepted and truncated to their date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d.%m.%Y", "%d-%m-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}

/// Normalize one raw row. `None` means the row has no id and is skipped.
pub fn normalize_row(row: &RawRow) -> Option<TaskRecord> {
    let mut cells: BTreeMap<Column, String> = BTreeMap::new();
    for (header, value) in row {
        let Some(column) = Column::from_header(header) else { continue };
        if let Some(text) = cell_text(value) {
            cells.entry(column).or_insert(text);
        }
    }

    let id = cells.remove(&Column::Id)?;
    let cell = |c: Column| cells.get(&c).cloned();

    let name = cell(Column::Name).unwrap_or_else(|| id.clone());

    Some(TaskRecord {
        parent_id: cell(Column::Parent),
        project: cell(Column::Project).unwrap_or_else(|| NO_PROJECT.to_string()),
        name,
        predecessor_id: cell(Column::Predecessor),
        duration_days: parse_duration(cells.get(&Column::Duration).map(String::as_str)),
        manual_start: cells.get(&Column::ManualStart).and_then(|s| parse_date(s)),
        hours: parse_hours(cells.get(&Column::Hours).map(String::as_str)),
        responsible: cell(Column::Responsible),
        notes: cell(Column::Notes),
        color_choice: cells
            .get(&Column::Color)
            .map(|s| ColorChoice::parse(s))
            .unwrap_or_default(),
        status: cells
            .get(&Column::Status)
            .map(|s| TaskStatus::parse(s))
            .unwrap_or_default(),
        id,
    })
}

/// Normalize every row in store order into a task table.
pub fn normalize_rows<'a>(rows: impl IntoIterator<Item = &'a RawRow>) -> TaskTable {
    let mut table = TaskTable::new();
    let mut skipped = 0usize;
    for row in rows {
        match normalize_row(row) {
            Some(record) => {
                table.insert(record);
            }
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "rows without an id were skipped");
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn blank_id_skips_row() {
        assert_eq!(normalize_row(&row(&[("id", json!("  "))])), None);
        assert_eq!(normalize_row(&row(&[("id", json!("nan"))])), None);
        assert_eq!(normalize_row(&row(&[("name", json!("orphan"))])), None);
    }

    #[test]
    fn full_row_is_typed() {
        let record = normalize_row(&row(&[
            ("ID", json!("T2")),
            ("Fase", json!("Proyecto Alpha")),
            ("Tarea", json!(" Desarrollo ")),
            ("Dependencia", json!("T1")),
            ("Duration Days", json!(3)),
            ("Inicio", json!("2026-02-22 10:00")),
            ("Horas_Estimadas", json!(32)),
            ("Responsable", json!("Carlos")),
            ("Color", json!("Azul")),
            ("Estado", json!("En progreso")),
        ]))
        .unwrap();

        let mut expected = TaskRecord::new("T2", "Desarrollo")
            .with_project("Proyecto Alpha")
            .with_predecessor("T1")
            .with_duration(3)
            .with_manual_start(NaiveDate::from_ymd_opt(2026, 2, 22).unwrap())
            .with_hours(32.0)
            .with_responsible("Carlos");
        expected.color_choice = ColorChoice::Blue;
        expected.status = TaskStatus::InProgress;

        assert_eq!(record, expected);
    }

    #[test]
    fn garbage_cells_get_defaults() {
        let record = normalize_row(&row(&[
            ("id", json!("X")),
            ("parent_id", json!("None")),
            ("project", json!("")),
            ("duration_days", json!("three")),
            ("manual_start", json!("31/02/2026")),
            ("hours", json!("-4")),
            ("color", json!("ultraviolet")),
            ("unknown column", json!("ignored")),
        ]))
        .unwrap();

        assert_eq!(record.parent_id, None);
        assert_eq!(record.project, NO_PROJECT);
        assert_eq!(record.name, "X");
        assert_eq!(record.duration_days, 1);
        assert_eq!(record.manual_start, None);
        assert_eq!(record.hours, 0.0);
        assert_eq!(record.color_choice, ColorChoice::Default);
    }

    #[test]
    fn numeric_parsers_are_lenient() {
        assert_eq!(parse_duration(Some("4")), 4);
        assert_eq!(parse_duration(Some("4.0")), 4);
        assert_eq!(parse_duration(Some("4.5")), 1);
        assert_eq!(parse_duration(Some("0")), 1);
        assert_eq!(parse_duration(Some("-2")), 1);
        assert_eq!(parse_duration(None), 1);
        assert_eq!(parse_duration(Some("36525")), MAX_DURATION_DAYS);
        assert_eq!(parse_duration(Some("100000000")), 1);
        assert_eq!(parse_duration(Some("200000000000000")), 1);
        assert_eq!(parse_duration(Some("1e300")), 1);
        assert_eq!(parse_duration(Some("1e2")), 100);

        assert_eq!(parse_hours(Some("7,5")), 7.5);
        assert_eq!(parse_hours(Some("1,000")), 1000.0);
        assert_eq!(parse_hours(Some("12,500.5")), 12500.5);
        assert_eq!(parse_hours(Some("1,234,567")), 1234567.0);
        assert_eq!(parse_hours(Some("1,5,0")), 0.0);
        assert_eq!(parse_hours(Some("inf")), 0.0);
        assert_eq!(parse_hours(None), 0.0);
    }

    #[test]
    fn dates_in_several_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 2, 20);
        assert_eq!(parse_date("2026-02-20"), expected);
        assert_eq!(parse_date("20/02/2026"), expected);
        assert_eq!(parse_date("2026/02/20"), expected);
        assert_eq!(parse_date("20.02.2026"), expected);
        assert_eq!(parse_date("2026-02-20 09:00"), expected);
        assert_eq!(parse_date("2026-02-20T09:00:00+01:00"), expected);
        assert_eq!(parse_date("next tuesday"), None);
    }

    #[test]
    fn normalize_rows_keeps_first_duplicate() {
        let rows = vec![
            row(&[("id", json!("A")), ("name", json!("one"))]),
            row(&[("id", json!(""))]),
            row(&[("id", json!("A")), ("name", json!("two"))]),
        ];
        let table = normalize_rows(&rows);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("A").unwrap().name, "one");
    }
}
