pub mod cli;
pub mod errors;
pub mod io;
pub mod layout;
pub mod logging;
pub mod model;
pub mod schedule;
pub mod settings;
pub mod stats;

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::{CliArgs, OutputFormat};
use crate::layout::{Milestone, RenderRow};
use crate::model::ResolvedTask;
use crate::schedule::{Diagnostic, Plan};
use crate::settings::Settings;
use crate::stats::PortfolioStats;

/// High-level entry point used by `main.rs`.
///
/// Loads settings and the task table, runs one scheduling pass, prints it,
/// and writes whatever exports were asked for.
pub fn run(args: CliArgs) -> Result<()> {
    let settings = Settings::discover(args.config.as_deref())?;
    let today = args
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let rows = io::load_rows(&args.input)
        .with_context(|| format!("reading task table {}", args.input.display()))?;
    info!(rows = rows.len(), path = %args.input.display(), "task table loaded");

    let plan = schedule::plan(&rows, today, &settings);
    let stats = args.stats.then(|| PortfolioStats::from_schedule(&plan.schedule));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Text => print_text(&mut out, &plan, stats.as_ref())?,
        OutputFormat::Json => print_json(&mut out, &plan, stats.as_ref())?,
    }

    if let Some(path) = &args.export_csv {
        let count = io::export_csv(&plan.table, &plan.schedule, path)?;
        info!(count, path = %path.display(), "exported schedule CSV");
    }
    if let Some(path) = &args.save {
        io::save_table(&plan.table, &plan.schedule, path)?;
        info!(path = %path.display(), "saved scheduled task table");
    }

    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    today: chrono::NaiveDate,
    anchor: chrono::NaiveDate,
    tasks: Vec<&'a ResolvedTask>,
    rows: &'a [RenderRow],
    milestones: &'a [Milestone],
    completed: &'a [Milestone],
    diagnostics: &'a [Diagnostic],
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<&'a PortfolioStats>,
}

fn print_json(out: &mut impl Write, plan: &Plan, stats: Option<&PortfolioStats>) -> Result<()> {
    let report = JsonReport {
        today: plan.render.today,
        anchor: plan.schedule.anchor,
        tasks: plan
            .table
            .iter()
            .filter_map(|r| plan.schedule.get(&r.id))
            .collect(),
        rows: &plan.render.rows,
        milestones: &plan.render.milestones,
        completed: &plan.render.completed,
        diagnostics: &plan.schedule.diagnostics,
        stats,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

fn print_text(out: &mut impl Write, plan: &Plan, stats: Option<&PortfolioStats>) -> Result<()> {
    let render = &plan.render;
    writeln!(
        out,
        "schedule for {} ({} tasks, anchor {})",
        render.today,
        plan.schedule.tasks.len(),
        plan.schedule.anchor
    )?;
    writeln!(out)?;

    for row in &render.rows {
        writeln!(
            out,
            "{:<40} {:<24} {} -> {}  {:<6}  {}",
            row.group_key,
            row.label.as_deref().unwrap_or(""),
            row.start,
            row.finish,
            row.phase.label(),
            row.kind.label(),
        )?;
    }

    if !render.milestones.is_empty() {
        writeln!(out)?;
        writeln!(out, "milestones:")?;
        for m in &render.milestones {
            writeln!(out, "  {}  {:<40} {:?}", m.date, m.group_key, m.kind)?;
        }
    }

    if !render.completed.is_empty() {
        writeln!(out)?;
        writeln!(out, "completed:")?;
        for m in &render.completed {
            writeln!(out, "  {}  {}", m.date, m.group_key)?;
        }
    }

    if !plan.schedule.diagnostics.is_empty() {
        writeln!(out)?;
        writeln!(out, "diagnostics:")?;
        for d in &plan.schedule.diagnostics {
            writeln!(out, "  - {d}")?;
        }
    }

    if let Some(stats) = stats {
        writeln!(out)?;
        writeln!(
            out,
            "hours: {} total, {} completed ({:.0}%)",
            stats.total_hours,
            stats.completed_hours,
            stats.completion_ratio() * 100.0
        )?;
        writeln!(
            out,
            "tasks: {} total, {} completed",
            stats.total_tasks, stats.completed_tasks
        )?;
        for p in &stats.projects {
            writeln!(
                out,
                "  {:<30} {:>8} h {:>5} d {:>4} tasks",
                p.project, p.hours, p.duration_days, p.tasks
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::normalize::RawRow;
    use chrono::NaiveDate;
    use serde_json::json;

    fn rows() -> Vec<RawRow> {
        let value = json!([
            {"id": "T1", "project": "Alpha", "name": "Research", "duration_days": 2,
             "manual_start": "2026-02-20", "status": "done", "hours": 16},
            {"id": "T2", "project": "Alpha", "name": "Build", "predecessor_id": "T1",
             "duration_days": 3, "hours": 32},
            {"id": "T3", "project": "Beta", "name": "Loop", "predecessor_id": "T3"},
        ]);
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn text_output_lists_rows_and_diagnostics() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 23).unwrap();
        let plan = schedule::plan(&rows(), today, &Settings::default());
        let stats = PortfolioStats::from_schedule(&plan.schedule);

        let mut buf = Vec::new();
        print_text(&mut buf, &plan, Some(&stats)).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Alpha | Research"));
        assert!(text.contains("2026-02-23 -> 2026-02-25"));
        assert!(text.contains("references itself"));
        assert!(text.contains("tasks: 3 total, 1 completed"));
        assert!(text.contains("completed:\n  2026-02-22  Alpha | Research"));
    }

    #[test]
    fn json_output_is_valid() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 23).unwrap();
        let plan = schedule::plan(&rows(), today, &Settings::default());

        let mut buf = Vec::new();
        print_json(&mut buf, &plan, None).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["tasks"].as_array().unwrap().len(), 3);
        assert_eq!(value["tasks"][1]["start"], "2026-02-22");
        assert_eq!(value["diagnostics"][0]["kind"], "self_reference");
        assert!(value.get("stats").is_none());
        assert_eq!(value["completed"][0]["kind"], "completed");
        assert_eq!(value["completed"][0]["date"], "2026-02-22");
    }
}
