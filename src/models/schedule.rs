//! Schedule (auto-scheduling output) model.
//!
//! A schedule assigns concrete start/end dates to tasks and lists the
//! conflicts found while doing so. Conflicts are per task: one bad task
//! never prevents the rest of the board from being scheduled.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Task;

/// Computed dates for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    pub id: String,
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
}

impl ScheduledTask {
    pub fn new(id: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            start_date,
            end_date,
        }
    }
}

/// A problem encountered while scheduling a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConflict {
    pub task_id: String,
    /// Human-readable description.
    pub reason: String,
}

impl ScheduleConflict {
    pub fn new(task_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            reason: reason.into(),
        }
    }
}

/// Result of auto-scheduling a board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// Scheduled tasks, in input order.
    pub tasks: Vec<ScheduledTask>,
    /// Conflicts found; fixed dates involved were left untouched.
    pub conflicts: Vec<ScheduleConflict>,
}

impl ScheduleResult {
    /// Creates an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether scheduling finished without conflicts.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Computed dates for a task.
    pub fn get(&self, task_id: &str) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Conflicts reported for a task.
    pub fn conflicts_for(&self, task_id: &str) -> Vec<&ScheduleConflict> {
        self.conflicts
            .iter()
            .filter(|c| c.task_id == task_id)
            .collect()
    }

    /// Latest end date across scheduled tasks.
    pub fn finish_date(&self) -> Option<NaiveDate> {
        self.tasks.iter().map(|t| t.end_date).max()
    }

    /// Returns new task values carrying the computed dates.
    ///
    /// Tasks without a computed schedule are returned unchanged.
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        let by_id: HashMap<&str, &ScheduledTask> =
            self.tasks.iter().map(|t| (t.id.as_str(), t)).collect();

        tasks
            .iter()
            .map(|task| match by_id.get(task.id.as_str()) {
                Some(s) => task
                    .clone()
                    .with_dates(Some(s.start_date), Some(s.end_date)),
                None => task.clone(),
            })
            .collect()
    }
}
