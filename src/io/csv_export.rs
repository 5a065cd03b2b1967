use std::io::Write;
use std::path::Path;

use crate::errors::Result;
use crate::model::TaskTable;
use crate::schedule::Schedule;

const HEADER: [&str; 12] = [
    "id",
    "parent_id",
    "project",
    "name",
    "predecessor_id",
    "start",
    "finish",
    "duration_days",
    "hours",
    "responsible",
    "status",
    "kind",
];

/// Write the resolved schedule as CSV, one row per task in table order.
///
/// Dates are formatted as YYYY-MM-DD. Returns the number of tasks written.
pub fn write_schedule_csv<W: Write>(table: &TaskTable, schedule: &Schedule, out: W) -> Result<usize> {
    let mut wtr = csv::WriterBuilder::new().from_writer(out);
    wtr.write_record(HEADER)?;

    let mut written = 0;
    for record in table.iter() {
        let Some(task) = schedule.get(&record.id) else { continue };
        let r = &task.record;
        let start = task.start.format("%Y-%m-%d").to_string();
        let finish = task.finish.format("%Y-%m-%d").to_string();
        let duration = r.duration_days.to_string();
        let hours = r.hours.to_string();
        let fields: [&str; 12] = [
            &r.id,
            r.parent_id.as_deref().unwrap_or(""),
            &r.project,
            &r.name,
            r.predecessor_id.as_deref().unwrap_or(""),
            &start,
            &finish,
            &duration,
            &hours,
            r.responsible.as_deref().unwrap_or(""),
            r.status.label(),
            task.kind.label(),
        ];
        wtr.write_record(fields)?;
        written += 1;
    }

    wtr.flush()?;
    Ok(written)
}

/// Export the resolved schedule to a CSV file.
pub fn export_csv(table: &TaskTable, schedule: &Schedule, path: &Path) -> Result<usize> {
    let file = std::fs::File::create(path)?;
    write_schedule_csv(table, schedule, file)
}
