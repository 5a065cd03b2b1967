use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::color::ColorChoice;

/// Project label used when a row leaves the project column blank.
pub const NO_PROJECT: &str = "No project";

/// Longest duration a row may ask for, about a century.
pub const MAX_DURATION_DAYS: i64 = 36_525;

/// How a task obtained its dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// Anchored on its own manual start or the default anchor date.
    Independent,
    /// Chained after its predecessor's finish.
    Dependent,
    /// Bounds derived from its children.
    ParentAggregate,
}

impl DependencyKind {
    pub fn label(&self) -> &'static str {
        match self {
            DependencyKind::Independent => "Independent",
            DependencyKind::Dependent => "Dependent",
            DependencyKind::ParentAggregate => "Parent",
        }
    }
}

/// Workflow status carried through from the task table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Map a free-text status cell to a status. Unknown text is `Pending`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "completed" | "complete" | "done" | "finished" | "completado" | "terminado" => {
                TaskStatus::Completed
            }
            "in progress" | "in-progress" | "in_progress" | "active" | "started" | "en progreso"
            | "en curso" => TaskStatus::InProgress,
            _ => TaskStatus::Pending,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
        }
    }
}

/// One normalized row of the task table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub parent_id: Option<String>,
    pub project: String,
    pub name: String,
    pub predecessor_id: Option<String>,
    /// Between 1 and [`MAX_DURATION_DAYS`] when built through the normalizer
    /// or [`TaskRecord::with_duration`].
    pub duration_days: i64,
    pub manual_start: Option<NaiveDate>,
    pub hours: f64,
    pub responsible: Option<String>,
    pub notes: Option<String>,
    pub color_choice: ColorChoice,
    pub status: TaskStatus,
}

impl TaskRecord {
    /// Create a record with defaults for every optional column.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            project: NO_PROJECT.to_string(),
            name: name.into(),
            predecessor_id: None,
            duration_days: 1,
            manual_start: None,
            hours: 0.0,
            responsible: None,
            notes: None,
            color_choice: ColorChoice::Default,
            status: TaskStatus::Pending,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn with_predecessor(mut self, predecessor: impl Into<String>) -> Self {
        self.predecessor_id = Some(predecessor.into());
        self
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    pub fn with_duration(mut self, days: i64) -> Self {
        self.duration_days = days.clamp(1, MAX_DURATION_DAYS);
        self
    }

    pub fn with_manual_start(mut self, date: NaiveDate) -> Self {
        self.manual_start = Some(date);
        self
    }

    pub fn with_hours(mut self, hours: f64) -> Self {
        self.hours = hours;
        self
    }

    pub fn with_responsible(mut self, responsible: impl Into<String>) -> Self {
        self.responsible = Some(responsible.into());
        self
    }
}

/// A task with its dates resolved for one scheduling pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTask {
    #[serde(flatten)]
    pub record: TaskRecord,
    pub start: NaiveDate,
    pub finish: NaiveDate,
    pub kind: DependencyKind,
}

impl ResolvedTask {
    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn duration_days(&self) -> i64 {
        self.record.duration_days
    }

    pub fn is_parent(&self) -> bool {
        self.kind == DependencyKind::ParentAggregate
    }
}
