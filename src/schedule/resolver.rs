//! Dependency graph resolver.
//!
//! Every task gets a start and finish:
//!
//! - a task with children spans its children ([`roll_up`]),
//! - a leaf with a predecessor starts when the predecessor finishes, or on
//!   its manual start if that is later,
//! - any other leaf starts on its manual start or the anchor date.
//!
//! Resolution is memoized and driven by an explicit work stack, so row order
//! does not matter and deep chains do not grow the call stack. A task that is
//! needed while it is still being resolved (a reference cycle) contributes a
//! fallback interval built from its own manual start and duration.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::aggregate::{roll_up, ChildSummary};
use super::diagnostic::Diagnostic;
use crate::model::timeline::shift_days;
use crate::model::{DependencyKind, ResolvedTask, TaskRecord, TaskTable};
use crate::settings::CyclePolicy;

/// Output of one scheduling pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub anchor: NaiveDate,
    pub tasks: BTreeMap<String, ResolvedTask>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Schedule {
    pub fn get(&self, id: &str) -> Option<&ResolvedTask> {
        self.tasks.get(id)
    }
}

enum Frame<'a> {
    Enter(&'a str),
    Finish(&'a str),
}

/// Resolver state for one pass over one table.
pub struct Resolver<'a> {
    table: &'a TaskTable,
    anchor: NaiveDate,
    cycle_policy: CyclePolicy,
    children: HashMap<&'a str, Vec<&'a str>>,
    resolved: HashMap<&'a str, ResolvedTask>,
    in_progress: HashSet<&'a str>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a TaskTable, anchor: NaiveDate) -> Self {
        Self {
            table,
            anchor,
            cycle_policy: CyclePolicy::default(),
            children: table.children_index(),
            resolved: HashMap::with_capacity(table.len()),
            in_progress: HashSet::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }

    /// Resolve every task in the table.
    pub fn resolve_all(mut self) -> Schedule {
        self.check_references();

        let table = self.table;
        for record in table.iter() {
            self.resolve(&record.id);
        }
        debug!(
            tasks = self.resolved.len(),
            diagnostics = self.diagnostics.len(),
            "schedule resolved"
        );

        let tasks = self
            .resolved
            .into_iter()
            .map(|(id, task)| (id.to_string(), task))
            .collect();
        Schedule {
            anchor: self.anchor,
            tasks,
            diagnostics: self.diagnostics,
        }
    }

    /// Resolve `root` and everything it depends on.
    fn resolve(&mut self, root: &'a str) {
        let table = self.table;
        let mut stack = vec![Frame::Enter(root)];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(id) => {
                    if self.resolved.contains_key(id) || !self.in_progress.insert(id) {
                        continue;
                    }
                    stack.push(Frame::Finish(id));
                    // Reversed so the first dependency is resolved first.
                    for dep in self.dependencies(id).into_iter().rev() {
                        if !self.resolved.contains_key(dep) && !self.in_progress.contains(dep) {
                            stack.push(Frame::Enter(dep));
                        }
                    }
                }
                Frame::Finish(id) => {
                    self.in_progress.remove(id);
                    if let Some(record) = table.get(id) {
                        let task = self.compute(record);
                        self.resolved.insert(id, task);
                    }
                }
            }
        }
    }

    /// Children for a parent, otherwise the predecessor (if any).
    fn dependencies(&self, id: &'a str) -> Vec<&'a str> {
        match self.children.get(id) {
            Some(children) if !children.is_empty() => children.clone(),
            _ => self.table.effective_predecessor(id).into_iter().collect(),
        }
    }

    /// Dates for `id` once all of its dependencies are resolved or known to
    /// be in progress.
    fn compute(&mut self, record: &'a TaskRecord) -> ResolvedTask {
        let table = self.table;
        let id = record.id.as_str();

        if let Some(children) = self.children.get(id).cloned().filter(|c| !c.is_empty()) {
            for &child in &children {
                if !self.resolved.contains_key(child) {
                    self.note_cycle(child, id);
                }
            }
            let fallbacks: Vec<ResolvedTask> = children
                .iter()
                .filter(|c| !self.resolved.contains_key(**c))
                .filter_map(|c| table.get(c))
                .map(|r| self.fallback(r))
                .collect();
            let summaries: Vec<ChildSummary<'_>> = children
                .iter()
                .filter_map(|c| self.resolved.get(c))
                .chain(fallbacks.iter())
                .map(ChildSummary::of)
                .collect();
            return roll_up(record, &summaries);
        }

        let (start, kind) = match table.effective_predecessor(id) {
            Some(pred) => {
                let pred_finish = match self.resolved.get(pred) {
                    Some(task) => task.finish,
                    None => {
                        self.note_cycle(pred, id);
                        match table.get(pred) {
                            Some(r) => self.fallback(r).finish,
                            None => self.anchor,
                        }
                    }
                };
                let start = match record.manual_start {
                    Some(manual) if manual > pred_finish => manual,
                    _ => pred_finish,
                };
                (start, DependencyKind::Dependent)
            }
            None => (
                record.manual_start.unwrap_or(self.anchor),
                DependencyKind::Independent,
            ),
        };

        ResolvedTask {
            record: record.clone(),
            start,
            finish: shift_days(start, record.duration_days),
            kind,
        }
    }

    /// Interval used for a task that is needed while still in progress.
    fn fallback(&self, record: &TaskRecord) -> ResolvedTask {
        let start = record.manual_start.unwrap_or(self.anchor);
        ResolvedTask {
            record: record.clone(),
            start,
            finish: shift_days(start, record.duration_days),
            kind: DependencyKind::Independent,
        }
    }

    fn note_cycle(&mut self, task: &str, via: &str) {
        match self.cycle_policy {
            CyclePolicy::Warn => warn!(task, via, "reference cycle; using fallback dates"),
            CyclePolicy::Silent => debug!(task, via, "reference cycle; using fallback dates"),
        }
        self.diagnostics.push(Diagnostic::CycleBroken {
            task: task.to_string(),
            via: via.to_string(),
        });
    }

    /// Record dangling, duplicate and self references up front.
    fn check_references(&mut self) {
        let table = self.table;
        for id in table.duplicates() {
            self.diagnostics.push(Diagnostic::DuplicateId { task: id.clone() });
        }

        for record in table.iter() {
            let id = record.id.as_str();
            let self_parent = record.parent_id.as_deref() == Some(id);
            let self_pred = record.predecessor_id.as_deref() == Some(id);
            if self_parent || self_pred {
                self.diagnostics.push(Diagnostic::SelfReference { task: id.to_string() });
            }

            if let Some(parent) = record.parent_id.as_deref() {
                if !self_parent && !table.contains(parent) {
                    self.diagnostics.push(Diagnostic::MissingParent {
                        task: id.to_string(),
                        parent: parent.to_string(),
                    });
                }
            }
            if let Some(pred) = record.predecessor_id.as_deref() {
                if !self_pred && !table.contains(pred) {
                    self.diagnostics.push(Diagnostic::MissingPredecessor {
                        task: id.to_string(),
                        predecessor: pred.to_string(),
                    });
                }
            }
        }

        for diagnostic in &self.diagnostics {
            warn!("{diagnostic}");
        }
    }
}

/// Resolve `table` with `anchor` as the default start date.
pub fn resolve(table: &TaskTable, anchor: NaiveDate) -> Schedule {
    Resolver::new(table, anchor).resolve_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dates(schedule: &Schedule, id: &str) -> (NaiveDate, NaiveDate) {
        let task = schedule.get(id).unwrap();
        (task.start, task.finish)
    }

    #[test]
    fn chained_after_independent() {
        let table = TaskTable::from_records([
            TaskRecord::new("T1", "Research")
                .with_duration(2)
                .with_manual_start(d("2026-02-20")),
            TaskRecord::new("T2", "Build").with_predecessor("T1").with_duration(3),
        ]);
        let schedule = resolve(&table, d("2026-01-01"));

        assert_eq!(dates(&schedule, "T1"), (d("2026-02-20"), d("2026-02-22")));
        assert_eq!(dates(&schedule, "T2"), (d("2026-02-22"), d("2026-02-25")));
        assert_eq!(schedule.get("T1").unwrap().kind, DependencyKind::Independent);
        assert_eq!(schedule.get("T2").unwrap().kind, DependencyKind::Dependent);
        assert!(schedule.diagnostics.is_empty());
    }

    #[test]
    fn parent_spans_children() {
        let table = TaskTable::from_records([
            TaskRecord::new("P", "Phase").with_hours(0.0),
            TaskRecord::new("C1", "First")
                .with_parent("P")
                .with_duration(2)
                .with_manual_start(d("2026-02-20"))
                .with_hours(40.0)
                .with_responsible("Ana"),
            TaskRecord::new("C2", "Second")
                .with_parent("P")
                .with_predecessor("C1")
                .with_duration(4)
                .with_hours(35.0)
                .with_responsible("Carlos"),
        ]);
        let schedule = resolve(&table, d("2026-01-01"));

        assert_eq!(dates(&schedule, "C2"), (d("2026-02-22"), d("2026-02-26")));
        let parent = schedule.get("P").unwrap();
        assert_eq!((parent.start, parent.finish), (d("2026-02-20"), d("2026-02-26")));
        assert_eq!(parent.record.duration_days, 6);
        assert_eq!(parent.record.hours, 75.0);
        assert_eq!(parent.record.responsible.as_deref(), Some("Ana, Carlos"));
        assert_eq!(parent.kind, DependencyKind::ParentAggregate);
    }

    #[test]
    fn order_of_rows_does_not_matter() {
        let forward = [
            TaskRecord::new("A", "a").with_manual_start(d("2026-03-01")).with_duration(2),
            TaskRecord::new("B", "b").with_predecessor("A").with_duration(1),
            TaskRecord::new("C", "c").with_predecessor("B").with_duration(5),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        let a = resolve(&TaskTable::from_records(forward), d("2026-01-01"));
        let b = resolve(&TaskTable::from_records(backward), d("2026-01-01"));
        assert_eq!(a.tasks, b.tasks);
        assert_eq!(dates(&a, "C"), (d("2026-03-04"), d("2026-03-09")));
    }

    #[test]
    fn manual_start_only_wins_when_later() {
        let table = TaskTable::from_records([
            TaskRecord::new("A", "a").with_manual_start(d("2026-03-01")).with_duration(3),
            TaskRecord::new("late", "late")
                .with_predecessor("A")
                .with_manual_start(d("2026-03-10")),
            TaskRecord::new("early", "early")
                .with_predecessor("A")
                .with_manual_start(d("2026-02-01")),
        ]);
        let schedule = resolve(&table, d("2026-01-01"));
        assert_eq!(schedule.get("late").unwrap().start, d("2026-03-10"));
        assert_eq!(schedule.get("early").unwrap().start, d("2026-03-04"));
    }

    #[test]
    fn missing_references_fall_back_to_anchor() {
        let table = TaskTable::from_records([TaskRecord::new("A", "a")
            .with_parent("ghost")
            .with_predecessor("phantom")
            .with_duration(2)]);
        let schedule = resolve(&table, d("2026-02-23"));

        let task = schedule.get("A").unwrap();
        assert_eq!((task.start, task.finish), (d("2026-02-23"), d("2026-02-25")));
        assert_eq!(task.kind, DependencyKind::Independent);
        assert_eq!(
            schedule.diagnostics,
            vec![
                Diagnostic::MissingParent {
                    task: "A".into(),
                    parent: "ghost".into()
                },
                Diagnostic::MissingPredecessor {
                    task: "A".into(),
                    predecessor: "phantom".into()
                },
            ]
        );
    }

    #[test]
    fn predecessor_cycle_terminates() {
        let table = TaskTable::from_records([
            TaskRecord::new("A", "a").with_predecessor("B").with_duration(2),
            TaskRecord::new("B", "b").with_predecessor("A").with_duration(3),
        ]);
        let schedule = resolve(&table, d("2026-02-01"));

        // A is entered first; B sees A in progress and chains off A's fallback.
        assert_eq!(dates(&schedule, "B"), (d("2026-02-03"), d("2026-02-06")));
        assert_eq!(dates(&schedule, "A"), (d("2026-02-06"), d("2026-02-08")));
        assert_eq!(
            schedule.diagnostics,
            vec![Diagnostic::CycleBroken {
                task: "A".into(),
                via: "B".into()
            }]
        );
    }

    #[test]
    fn parent_cycle_terminates() {
        let table = TaskTable::from_records([
            TaskRecord::new("A", "a").with_parent("B").with_duration(2),
            TaskRecord::new("B", "b").with_parent("A").with_duration(3),
        ]);
        let schedule = resolve(&table, d("2026-02-01"));

        assert_eq!(schedule.tasks.len(), 2);
        for task in schedule.tasks.values() {
            assert!(task.finish > task.start);
        }
        assert!(schedule.diagnostics.iter().any(Diagnostic::is_cycle));
    }

    #[test]
    fn self_references_are_ignored() {
        let table = TaskTable::from_records([TaskRecord::new("A", "a")
            .with_parent("A")
            .with_predecessor("A")
            .with_manual_start(d("2026-02-10"))]);
        let schedule = resolve(&table, d("2026-02-01"));

        assert_eq!(dates(&schedule, "A"), (d("2026-02-10"), d("2026-02-11")));
        assert_eq!(
            schedule.diagnostics,
            vec![Diagnostic::SelfReference { task: "A".into() }]
        );
    }

    #[test]
    fn duplicate_id_is_reported_once() {
        let table = TaskTable::from_records([
            TaskRecord::new("A", "first"),
            TaskRecord::new("A", "second"),
        ]);
        let schedule = resolve(&table, d("2026-02-01"));

        assert_eq!(
            schedule.diagnostics,
            vec![Diagnostic::DuplicateId { task: "A".into() }]
        );
        assert_eq!(schedule.get("A").unwrap().record.name, "first");
    }

    #[test]
    fn oversized_durations_saturate() {
        let mut huge = TaskRecord::new("A", "a");
        huge.duration_days = i64::MAX;
        let table = TaskTable::from_records([
            huge,
            TaskRecord::new("B", "b").with_predecessor("A").with_duration(5),
            TaskRecord::new("P", "parent"),
            TaskRecord::new("C", "c").with_parent("P").with_predecessor("B"),
        ]);
        let schedule = resolve(&table, d("2026-02-01"));

        assert_eq!(dates(&schedule, "A"), (d("2026-02-01"), NaiveDate::MAX));
        assert_eq!(dates(&schedule, "B"), (NaiveDate::MAX, NaiveDate::MAX));
        assert_eq!(dates(&schedule, "P"), (NaiveDate::MAX, NaiveDate::MAX));
    }
}
