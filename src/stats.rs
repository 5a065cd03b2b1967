//! Portfolio totals for the summary panel.
//!
//! Only leaf tasks are counted: a parent's hours are already the sum of its
//! children's.

use serde::Serialize;

use crate::model::{ResolvedTask, TaskStatus};
use crate::schedule::Schedule;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectStats {
    pub project: String,
    pub hours: f64,
    /// Sum of task durations, not the project's calendar span.
    pub duration_days: i64,
    pub tasks: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PortfolioStats {
    pub total_hours: f64,
    pub completed_hours: f64,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// Sorted by project name.
    pub projects: Vec<ProjectStats>,
}

impl PortfolioStats {
    pub fn from_schedule(schedule: &Schedule) -> Self {
        Self::from_tasks(schedule.tasks.values())
    }

    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a ResolvedTask>) -> Self {
        let mut stats = PortfolioStats::default();
        for task in tasks.into_iter().filter(|t| !t.is_parent()) {
            let record = &task.record;
            let done = record.status == TaskStatus::Completed;

            stats.total_tasks += 1;
            stats.total_hours += record.hours;
            if done {
                stats.completed_tasks += 1;
                stats.completed_hours += record.hours;
            }

            let idx = match stats.projects.iter().position(|p| p.project == record.project) {
                Some(i) => i,
                None => {
                    stats.projects.push(ProjectStats {
                        project: record.project.clone(),
                        hours: 0.0,
                        duration_days: 0,
                        tasks: 0,
                    });
                    stats.projects.len() - 1
                }
            };
            let project = &mut stats.projects[idx];
            project.hours += record.hours;
            project.duration_days = project.duration_days.saturating_add(record.duration_days);
            project.tasks += 1;
        }
        stats.projects.sort_by(|a, b| a.project.cmp(&b.project));
        stats
    }

    /// Share of estimated hours already completed, 0.0 – 1.0.
    pub fn completion_ratio(&self) -> f64 {
        if self.total_hours > 0.0 {
            self.completed_hours / self.total_hours
        } else {
            0.0
        }
    }
}
