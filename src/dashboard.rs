//! Productivity dashboard.
//!
//! [`aggregate`] is a pure function over one user's complete task set. It keeps
//! full precision; [`DashboardStats::rounded`] produces the two-decimal view that is
//! sent to clients.
//!
//! "Time lapsed" for a pending task is its planned span, `endTime - startTime`, not
//! the time elapsed since it started. A task without an `endTime` contributes zero.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Task, TaskStatus};

/// Priority assumed for a task that carries none.
pub const DEFAULT_PRIORITY: i16 = 3;
/// Remaining minutes assumed for a pending task without an estimate.
pub const DEFAULT_ESTIMATED_MINUTES: f64 = 60.0;

/// The fields of a task the dashboard looks at.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSample {
    pub status: TaskStatus,
    pub priority: Option<i16>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub estimated_time: Option<i32>,
}

impl From<&Task> for TaskSample {
    fn from(task: &Task) -> Self {
        Self {
            status: task.status,
            priority: Some(task.priority),
            start_time: Some(task.start_time),
            end_time: task.end_time,
            estimated_time: task.estimated_time,
        }
    }
}

impl TaskSample {
    /// `endTime - startTime` in minutes, or zero when either is missing.
    fn span_minutes(&self) -> f64 {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => (end - start).num_milliseconds() as f64 / 60_000.0,
            _ => 0.0,
        }
    }

    fn time_left_minutes(&self) -> f64 {
        self.estimated_time
            .map(f64::from)
            .unwrap_or(DEFAULT_ESTIMATED_MINUTES)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTaskSummary {
    pub total_pending_tasks: usize,
    pub total_time_lapsed: f64,
    pub total_time_left: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritySummary {
    pub pending: usize,
    pub time_lapsed: f64,
    pub time_left: f64,
}

/// Aggregated statistics over one user's tasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_tasks: usize,
    pub completed_percentage: f64,
    pub avg_time_per_task: f64,
    pub pending_task_summary: PendingTaskSummary,
    /// Keyed by priority. Only priorities with at least one pending task appear.
    pub task_priority_summary: BTreeMap<i16, PrioritySummary>,
}

/// Computes dashboard statistics over `tasks`.
pub fn aggregate<'a, I>(tasks: I) -> DashboardStats
where
    I: IntoIterator<Item = &'a TaskSample>,
{
    let mut stats = DashboardStats::default();
    let mut finished = 0usize;
    let mut finished_minutes = 0.0;

    for task in tasks {
        stats.total_tasks += 1;

        match task.status {
            TaskStatus::Finished => {
                finished += 1;
                finished_minutes += task.span_minutes();
            }
            TaskStatus::Pending => {
                let lapsed = task.span_minutes();
                let left = task.time_left_minutes();

                let pending = &mut stats.pending_task_summary;
                pending.total_pending_tasks += 1;
                pending.total_time_lapsed += lapsed;
                pending.total_time_left += left;

                let priority = task.priority.unwrap_or(DEFAULT_PRIORITY);
                let bucket = stats.task_priority_summary.entry(priority).or_default();
                bucket.pending += 1;
                bucket.time_lapsed += lapsed;
                bucket.time_left += left;
            }
        }
    }

    if stats.total_tasks > 0 {
        stats.completed_percentage = 100.0 * finished as f64 / stats.total_tasks as f64;
    }
    if finished > 0 {
        stats.avg_time_per_task = finished_minutes / finished as f64;
    }
    stats
}

/// Convenience over stored tasks.
pub fn aggregate_tasks(tasks: &[Task]) -> DashboardStats {
    let samples: Vec<TaskSample> = tasks.iter().map(TaskSample::from).collect();
    aggregate(&samples)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl DashboardStats {
    /// Copy with every minute and percentage value rounded to two decimals.
    pub fn rounded(&self) -> DashboardStats {
        DashboardStats {
            total_tasks: self.total_tasks,
            completed_percentage: round2(self.completed_percentage),
            avg_time_per_task: round2(self.avg_time_per_task),
            pending_task_summary: PendingTaskSummary {
                total_pending_tasks: self.pending_task_summary.total_pending_tasks,
                total_time_lapsed: round2(self.pending_task_summary.total_time_lapsed),
                total_time_left: round2(self.pending_task_summary.total_time_left),
            },
            task_priority_summary: self
                .task_priority_summary
                .iter()
                .map(|(priority, summary)| {
                    (
                        *priority,
                        PrioritySummary {
                            pending: summary.pending,
                            time_lapsed: round2(summary.time_lapsed),
                            time_left: round2(summary.time_left),
                        },
                    )
                })
                .collect(),
        }
    }
}
