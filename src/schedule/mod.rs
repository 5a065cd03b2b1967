//! Scheduling core.
//!
//! - [`normalize`] turns raw store rows into a [`TaskTable`].
//! - [`resolver`] assigns every task its start and finish.
//! - [`aggregate`] rolls children up into their parents.
//! - [`chain`] walks predecessor and parent links for display grouping.
//! - [`diagnostic`] describes what the resolver had to work around.

pub mod aggregate;
pub mod chain;
pub mod diagnostic;
pub mod normalize;
pub mod resolver;

pub use diagnostic::Diagnostic;
pub use normalize::{normalize_row, normalize_rows, RawRow};
pub use resolver::{resolve, Resolver, Schedule};

use chrono::NaiveDate;
use tracing::info;

use crate::layout::{build_render_table, RenderTable};
use crate::model::TaskTable;
use crate::settings::Settings;

/// Result of one full pass: the table, its schedule, and the render table.
#[derive(Debug, Clone)]
pub struct Plan {
    pub table: TaskTable,
    pub schedule: Schedule,
    pub render: RenderTable,
}

/// Run the whole pipeline over a snapshot of the task store.
pub fn plan<'a>(
    rows: impl IntoIterator<Item = &'a RawRow>,
    today: NaiveDate,
    settings: &Settings,
) -> Plan {
    let table = normalize_rows(rows);
    let schedule = Resolver::new(&table, settings.anchor(today))
        .with_cycle_policy(settings.cycle_policy)
        .resolve_all();
    let render = build_render_table(&table, &schedule, today, settings);
    info!(
        tasks = schedule.tasks.len(),
        rows = render.rows.len(),
        milestones = render.milestones.len(),
        diagnostics = schedule.diagnostics.len(),
        "plan built"
    );
    Plan {
        table,
        schedule,
        render,
    }
}
