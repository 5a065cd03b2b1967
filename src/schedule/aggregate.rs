//! Roll-up of child tasks into their parent.

use chrono::NaiveDate;

use crate::model::{DependencyKind, ResolvedTask, TaskRecord};

/// What a parent needs to know about one child.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildSummary<'a> {
    pub start: NaiveDate,
    pub finish: NaiveDate,
    pub hours: f64,
    pub responsible: Option<&'a str>,
}

impl<'a> ChildSummary<'a> {
    pub fn of(task: &'a ResolvedTask) -> Self {
        Self {
            start: task.start,
            finish: task.finish,
            hours: task.record.hours,
            responsible: task.record.responsible.as_deref(),
        }
    }
}

/// Merge comma-separated responsible lists, keeping first-seen order and
/// dropping repeats. `None` when nobody is named.
pub fn union_responsible<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut names: Vec<&str> = Vec::new();
    for value in values {
        for name in value.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

/// Resolve a parent from its children.
///
/// `children` must not be empty; callers only aggregate tasks that have at
/// least one child.
pub fn roll_up(parent: &TaskRecord, children: &[ChildSummary<'_>]) -> ResolvedTask {
    let start = children.iter().map(|c| c.start).min().unwrap_or(NaiveDate::MIN);
    let finish = children.iter().map(|c| c.finish).max().unwrap_or(NaiveDate::MIN);

    let mut record = parent.clone();
    record.duration_days = (finish - start).num_days().max(1);
    record.hours = children.iter().map(|c| c.hours).sum();

    let own_blank = record
        .responsible
        .as_deref()
        .map_or(true, |r| r.trim().is_empty());
    if own_blank {
        record.responsible = union_responsible(children.iter().filter_map(|c| c.responsible));
    }

    ResolvedTask {
        record,
        start,
        finish,
        kind: DependencyKind::ParentAggregate,
    }
}
