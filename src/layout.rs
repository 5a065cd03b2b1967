//! Render table for a timeline chart.
//!
//! Turns a resolved schedule into drawable rows: one row per bar segment,
//! each with a grouping key (which chart row it lands on), a sort key, hover
//! text and a color. Also places milestone markers.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::model::color::resolve_color;
use crate::model::timeline::segment_interval;
use crate::model::{
    DependencyKind, ResolvedTask, SegmentPhase, TaskStatus, TaskTable, TimelineRange,
};
use crate::schedule::chain::{chain_root, lineage};
use crate::schedule::Schedule;
use crate::settings::Settings;

/// Prefix marking parent rows.
pub const PARENT_PREFIX: &str = "📂 ";

/// One level of a task's position: its chain root, then itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SortStep {
    pub chain_start: NaiveDate,
    pub chain_seq: usize,
    pub start: NaiveDate,
    pub seq: usize,
}

/// Orders rows by project, then depth-first along the parent lineage.
///
/// A parent's path is a prefix of its children's paths, so it sorts directly
/// before them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SortKey {
    pub project_rank: usize,
    pub path: Vec<SortStep>,
}

/// One drawable bar segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderRow {
    pub task_id: String,
    pub project: String,
    /// Text shown on the chart row axis.
    pub row_name: String,
    pub group_key: String,
    pub sort_key: SortKey,
    /// Position after sorting.
    pub order: usize,
    /// Bar label; `None` on the first half of a split bar.
    pub label: Option<String>,
    pub start: NaiveDate,
    pub finish: NaiveDate,
    pub display_end: NaiveDateTime,
    pub phase: SegmentPhase,
    pub kind: DependencyKind,
    pub color: &'static str,
    pub hover_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    /// Latest finish of a whole project.
    Project,
    /// Finish of an independent task.
    Task,
    /// Finish of a task whose status is completed.
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub kind: MilestoneKind,
    pub project: String,
    /// Chart row the marker sits on.
    pub root_label: String,
    pub group_key: String,
    pub date: NaiveDate,
}

/// Everything a chart needs to draw one scheduling pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderTable {
    pub today: NaiveDate,
    pub range: TimelineRange,
    /// Projects in display order.
    pub projects: Vec<String>,
    pub rows: Vec<RenderRow>,
    pub milestones: Vec<Milestone>,
    /// One marker per completed task, in display order. Kept apart from
    /// `milestones`.
    pub completed: Vec<Milestone>,
}

/// Per-task layout facts shared by the rows of its segments.
struct Placement {
    row_name: String,
    group_key: String,
    sort_key: SortKey,
    project_rank: usize,
}

/// Projects ordered by earliest start, ties by name.
fn rank_projects(schedule: &Schedule) -> Vec<String> {
    let mut earliest: HashMap<&str, NaiveDate> = HashMap::new();
    for task in schedule.tasks.values() {
        earliest
            .entry(task.record.project.as_str())
            .and_modify(|d| *d = (*d).min(task.start))
            .or_insert(task.start);
    }
    let mut projects: Vec<(&str, NaiveDate)> = earliest.into_iter().collect();
    projects.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    projects.into_iter().map(|(p, _)| p.to_string()).collect()
}

/// Chart row name: folder-prefixed for parents, the chain root's name for
/// everything else.
pub fn display_row_name(table: &TaskTable, schedule: &Schedule, task: &ResolvedTask) -> String {
    if task.is_parent() {
        return format!("{PARENT_PREFIX}{}", task.record.name);
    }
    let root = chain_root(table, task.id());
    table
        .get(root)
        .map(|r| r.name.clone())
        .or_else(|| schedule.get(root).map(|t| t.record.name.clone()))
        .unwrap_or_else(|| task.record.name.clone())
}

fn sort_step(table: &TaskTable, schedule: &Schedule, id: &str) -> SortStep {
    let seq = table.position(id).unwrap_or(usize::MAX);
    let start = schedule.get(id).map(|t| t.start).unwrap_or(NaiveDate::MAX);
    let root = chain_root(table, id);
    SortStep {
        chain_start: schedule.get(root).map(|t| t.start).unwrap_or(start),
        chain_seq: table.position(root).unwrap_or(seq),
        start,
        seq,
    }
}

/// Hover text for one task, one fact per line.
pub fn hover_text(task: &ResolvedTask) -> String {
    let record = &task.record;
    let mut lines = vec![
        record.project.clone(),
        record.name.clone(),
        format!("Start: {}", task.start.format("%Y-%m-%d")),
        format!("Finish: {}", task.finish.format("%Y-%m-%d")),
        format!("Duration: {} days", record.duration_days),
        format!("Hours: {}", record.hours),
    ];
    if let Some(responsible) = &record.responsible {
        lines.push(format!("Responsible: {responsible}"));
    }
    lines.push(format!("Status: {}", record.status.label()));
    lines.push(format!("Type: {}", task.kind.label()));
    if let Some(notes) = &record.notes {
        lines.push(format!("Notes: {notes}"));
    }
    lines.join("\n")
}

/// Build the render table for `schedule` as seen on `today`.
pub fn build_render_table(
    table: &TaskTable,
    schedule: &Schedule,
    today: NaiveDate,
    settings: &Settings,
) -> RenderTable {
    let projects = rank_projects(schedule);
    let ranks: HashMap<&str, usize> = projects
        .iter()
        .enumerate()
        .map(|(i, p)| (p.as_str(), i))
        .collect();

    let mut placements: HashMap<&str, Placement> = HashMap::new();
    for record in table.iter() {
        let Some(task) = schedule.get(&record.id) else { continue };
        let project_rank = ranks.get(record.project.as_str()).copied().unwrap_or(usize::MAX);
        let row_name = display_row_name(table, schedule, task);
        let path = lineage(table, &record.id)
            .into_iter()
            .map(|id| sort_step(table, schedule, id))
            .collect();
        placements.insert(
            record.id.as_str(),
            Placement {
                group_key: format!("{}{}{}", record.project, settings.group_separator, row_name),
                row_name,
                sort_key: SortKey { project_rank, path },
                project_rank,
            },
        );
    }

    let mut rows = Vec::new();
    for record in table.iter() {
        let (Some(task), Some(place)) = (schedule.get(&record.id), placements.get(record.id.as_str()))
        else {
            continue;
        };
        let hover = hover_text(task);
        let color = resolve_color(record.color_choice, place.project_rank);
        for segment in segment_interval(task.start, task.finish, today, settings.bar_gap_hours) {
            rows.push(RenderRow {
                task_id: record.id.clone(),
                project: record.project.clone(),
                row_name: place.row_name.clone(),
                group_key: place.group_key.clone(),
                sort_key: place.sort_key.clone(),
                order: 0,
                label: segment.show_label.then(|| record.name.clone()),
                start: segment.start,
                finish: segment.end,
                display_end: segment.display_end,
                phase: segment.phase,
                kind: task.kind,
                color,
                hover_text: hover.clone(),
            });
        }
    }
    rows.sort_by(|a, b| a.sort_key.cmp(&b.sort_key).then(a.start.cmp(&b.start)));
    for (i, row) in rows.iter_mut().enumerate() {
        row.order = i;
    }

    let milestones = milestones(table, schedule, &placements);
    let completed = completed_markers(table, schedule, &placements);
    let range = TimelineRange::covering(
        schedule.tasks.values().map(|t| (t.start, t.finish)),
        today,
    );

    RenderTable {
        today,
        range,
        projects,
        rows,
        milestones,
        completed,
    }
}

/// Markers at the finish of every task marked completed.
fn completed_markers(
    table: &TaskTable,
    schedule: &Schedule,
    placements: &HashMap<&str, Placement>,
) -> Vec<Milestone> {
    let mut markers: Vec<(&SortKey, Milestone)> = table
        .iter()
        .filter(|r| r.status == TaskStatus::Completed)
        .filter_map(|record| {
            let task = schedule.get(&record.id)?;
            let place = placements.get(record.id.as_str())?;
            Some((
                &place.sort_key,
                Milestone {
                    kind: MilestoneKind::Completed,
                    project: record.project.clone(),
                    root_label: place.row_name.clone(),
                    group_key: place.group_key.clone(),
                    date: task.finish,
                },
            ))
        })
        .collect();
    markers.sort_by(|a, b| a.0.cmp(b.0));
    markers.into_iter().map(|(_, m)| m).collect()
}

/// Project completion markers plus one marker per independent leaf task.
fn milestones(
    table: &TaskTable,
    schedule: &Schedule,
    placements: &HashMap<&str, Placement>,
) -> Vec<Milestone> {
    // Latest finish per project; the earliest row in display order wins ties.
    let mut latest: HashMap<&str, (&ResolvedTask, &Placement)> = HashMap::new();
    let mut markers = Vec::new();

    for record in table.iter() {
        let (Some(task), Some(place)) = (schedule.get(&record.id), placements.get(record.id.as_str()))
        else {
            continue;
        };

        latest
            .entry(record.project.as_str())
            .and_modify(|best| {
                let later = task.finish > best.0.finish;
                let tie_first = task.finish == best.0.finish
                    && place.sort_key.cmp(&best.1.sort_key) == Ordering::Less;
                if later || tie_first {
                    *best = (task, place);
                }
            })
            .or_insert((task, place));

        if task.kind == DependencyKind::Independent {
            markers.push((
                place.sort_key.clone(),
                Milestone {
                    kind: MilestoneKind::Task,
                    project: record.project.clone(),
                    root_label: place.row_name.clone(),
                    group_key: place.group_key.clone(),
                    date: task.finish,
                },
            ));
        }
    }

    for (project, (task, place)) in latest {
        markers.push((
            SortKey {
                project_rank: place.project_rank,
                path: Vec::new(),
            },
            Milestone {
                kind: MilestoneKind::Project,
                project: project.to_string(),
                root_label: place.row_name.clone(),
                group_key: place.group_key.clone(),
                date: task.finish,
            },
        ));
    }

    markers.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.date.cmp(&b.1.date)));
    markers.into_iter().map(|(_, m)| m).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskRecord;
    use crate::schedule::resolve;
    use pretty_assertions::assert_eq;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn portfolio() -> TaskTable {
        TaskTable::from_records([
            TaskRecord::new("B1", "Design")
                .with_project("Beta")
                .with_manual_start(d("2026-02-24"))
                .with_duration(2),
            TaskRecord::new("P", "Alpha phase").with_project("Alpha"),
            TaskRecord::new("A1", "Research")
                .with_project("Alpha")
                .with_parent("P")
                .with_manual_start(d("2026-02-20"))
                .with_duration(2),
            TaskRecord::new("A2", "Build")
                .with_project("Alpha")
                .with_parent("P")
                .with_predecessor("A1")
                .with_duration(3),
        ])
    }

    fn render(table: &TaskTable, today: &str) -> RenderTable {
        let schedule = resolve(table, d(today));
        build_render_table(table, &schedule, d(today), &Settings::default())
    }

    #[test]
    fn projects_ordered_by_earliest_start() {
        let table = render(&portfolio(), "2026-02-01");
        assert_eq!(table.projects, vec!["Alpha".to_string(), "Beta".to_string()]);
    }

    #[test]
    fn rows_group_chains_under_parent() {
        let table = render(&portfolio(), "2026-02-01");
        let keys: Vec<(&str, &str)> = table
            .rows
            .iter()
            .map(|r| (r.task_id.as_str(), r.group_key.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("P", "Alpha | 📂 Alpha phase"),
                ("A1", "Alpha | Research"),
                ("A2", "Alpha | Research"),
                ("B1", "Beta | Design"),
            ]
        );
        assert_eq!(
            table.rows.iter().map(|r| r.order).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn split_bar_produces_two_rows() {
        let table = render(&portfolio(), "2026-02-21");
        let a1: Vec<&RenderRow> = table.rows.iter().filter(|r| r.task_id == "A1").collect();
        assert_eq!(a1.len(), 2);
        assert_eq!(a1[0].phase, SegmentPhase::Past);
        assert_eq!(a1[0].label, None);
        assert_eq!(a1[1].phase, SegmentPhase::Active);
        assert_eq!(a1[1].label.as_deref(), Some("Research"));
    }

    #[test]
    fn milestones_for_projects_and_independent_tasks() {
        let table = render(&portfolio(), "2026-02-01");
        let marks: Vec<(MilestoneKind, &str, &str, NaiveDate)> = table
            .milestones
            .iter()
            .map(|m| (m.kind, m.project.as_str(), m.root_label.as_str(), m.date))
            .collect();
        assert_eq!(
            marks,
            vec![
                (MilestoneKind::Project, "Alpha", "📂 Alpha phase", d("2026-02-25")),
                (MilestoneKind::Task, "Alpha", "Research", d("2026-02-22")),
                (MilestoneKind::Project, "Beta", "Design", d("2026-02-26")),
                (MilestoneKind::Task, "Beta", "Design", d("2026-02-26")),
            ]
        );
    }

    #[test]
    fn completed_tasks_get_their_own_markers() {
        let mut records = portfolio().records().to_vec();
        records[2].status = TaskStatus::Completed;
        records[0].status = TaskStatus::Completed;
        let table = render(&TaskTable::from_records(records), "2026-02-01");

        let marks: Vec<(MilestoneKind, &str, NaiveDate)> = table
            .completed
            .iter()
            .map(|m| (m.kind, m.group_key.as_str(), m.date))
            .collect();
        assert_eq!(
            marks,
            vec![
                (MilestoneKind::Completed, "Alpha | Research", d("2026-02-22")),
                (MilestoneKind::Completed, "Beta | Design", d("2026-02-26")),
            ]
        );
        assert!(table.milestones.iter().all(|m| m.kind != MilestoneKind::Completed));
    }

    #[test]
    fn extreme_dates_render_without_overflow() {
        let mut forever = TaskRecord::new("F", "Forever").with_project("Alpha");
        forever.duration_days = i64::MAX;
        let table = render(&TaskTable::from_records([forever]), "2026-02-01");

        assert_eq!(table.range.end, NaiveDate::MAX);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].finish, NaiveDate::MAX);
    }

    #[test]
    fn hover_text_lists_facts() {
        let table = portfolio();
        let schedule = resolve(&table, d("2026-02-01"));
        let text = hover_text(schedule.get("A2").unwrap());
        assert!(text.contains("Start: 2026-02-22"));
        assert!(text.contains("Finish: 2026-02-25"));
        assert!(text.contains("Type: Dependent"));
    }

    #[test]
    fn default_color_follows_project_rank() {
        let table = render(&portfolio(), "2026-02-01");
        let beta = table.rows.iter().find(|r| r.task_id == "B1").unwrap();
        assert_eq!(beta.color, "#34A853");
    }
}
