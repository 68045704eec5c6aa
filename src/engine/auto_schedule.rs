//! Dependency-driven auto-scheduling.
//!
//! # Algorithm
//!
//! 1. Order tasks topologically (fails on cycles).
//! 2. For each task, collect the computed windows of its dependencies and
//!    derive the earliest start each one allows:
//!    FS → day after its end, SS → its start,
//!    FF → its end minus `d - 1`, SF → its start minus `d - 1`.
//! 3. Fixed tasks keep their dates; any dependency they violate is
//!    reported as a conflict. Unfixed tasks start at the latest bound
//!    (or the project start), snapped to a working day.
//! 4. End date = start plus `d - 1` days (end dates are inclusive).
//!
//! Problems are recorded per task and scheduling carries on: a task whose
//! dependency could not be scheduled reports it and is placed using its
//! remaining dependencies.
//!
//! # Complexity
//! O((n + e) log n) plus calendar stepping per task.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::graph::{DependencyGraph, Edge};
use crate::models::calendar::today;
use crate::models::{
    Calendar, DependencyType, ScheduleConflict, ScheduleResult, ScheduledTask, Task,
};

/// Auto-scheduling options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleOptions {
    /// Never move tasks that already have dates. Default: `true`.
    pub respect_fixed_dates: bool,
    /// Count only working days when deriving dates. Default: `true`.
    pub use_business_days_only: bool,
    /// Duration (days) for tasks without an estimate. Default: 1.
    pub default_duration: f64,
    /// Start date for tasks with nothing to wait on. `None` = today.
    pub project_start: Option<NaiveDate>,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            respect_fixed_dates: true,
            use_business_days_only: true,
            default_duration: 1.0,
            project_start: None,
        }
    }
}

impl ScheduleOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_respect_fixed_dates(mut self, respect: bool) -> Self {
        self.respect_fixed_dates = respect;
        self
    }

    pub fn with_business_days_only(mut self, business_only: bool) -> Self {
        self.use_business_days_only = business_only;
        self
    }

    pub fn with_default_duration(mut self, days: f64) -> Self {
        self.default_duration = days;
        self
    }

    pub fn with_project_start(mut self, date: NaiveDate) -> Self {
        self.project_start = Some(date);
        self
    }
}

/// A derived date fell outside chrono's representable range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OutOfRange;

/// Date stepping in either business or calendar days.
struct DayMath<'a> {
    calendar: &'a Calendar,
    business_only: bool,
}

impl DayMath<'_> {
    fn shift(&self, date: NaiveDate, days: i64) -> Result<NaiveDate, OutOfRange> {
        let shifted = if self.business_only {
            self.calendar.add_business_days(date, days)
        } else {
            Duration::try_days(days).and_then(|delta| date.checked_add_signed(delta))
        };
        shifted.ok_or(OutOfRange)
    }

    fn snap(&self, date: NaiveDate) -> Result<NaiveDate, OutOfRange> {
        if self.business_only {
            self.calendar.next_working_day(date).ok_or(OutOfRange)
        } else {
            Ok(date)
        }
    }

    fn end_from_start(&self, start: NaiveDate, days: i64) -> Result<NaiveDate, OutOfRange> {
        self.shift(start, days - 1)
    }

    fn start_from_end(&self, end: NaiveDate, days: i64) -> Result<NaiveDate, OutOfRange> {
        self.shift(end, -(days - 1))
    }

    /// Span of an existing `[start, end]` window in this day unit.
    fn span(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        if self.business_only {
            self.calendar.business_days_between(start, end)
        } else {
            (end - start).num_days() + 1
        }
    }

    /// Earliest start a dependency allows for a task lasting `days`.
    fn earliest_start(
        &self,
        kind: DependencyType,
        (pred_start, pred_end): (NaiveDate, NaiveDate),
        days: i64,
    ) -> Result<NaiveDate, OutOfRange> {
        match kind {
            DependencyType::FinishToStart => self.shift(pred_end, 1),
            DependencyType::StartToStart => Ok(pred_start),
            DependencyType::FinishToFinish => self.start_from_end(pred_end, days),
            DependencyType::StartToFinish => self.start_from_end(pred_start, days),
        }
    }
}

/// Whole days of work for a task (at least 1).
///
/// Uses the estimate, else the length of the task's existing dates, else
/// the default duration. Oversized estimates saturate and are caught as
/// [`OutOfRange`] when stepped.
fn duration_days(task: &Task, math: &DayMath<'_>, options: &ScheduleOptions) -> i64 {
    if let Some(estimate) = task.duration() {
        return (estimate.ceil() as i64).max(1);
    }
    if let (Some(start), Some(end)) = (task.start_date, task.end_date) {
        let span = math.span(start, end);
        if span > 0 {
            return span;
        }
    }
    (options.default_duration.ceil() as i64).max(1)
}

/// Existing window of a fixed task, completing a missing half from `days`.
fn fixed_window(
    task: &Task,
    math: &DayMath<'_>,
    days: i64,
) -> Result<Option<(NaiveDate, NaiveDate)>, OutOfRange> {
    Ok(match (task.start_date, task.end_date) {
        (Some(start), Some(end)) => Some((start, end)),
        (Some(start), None) => Some((start, math.end_from_start(start, days)?)),
        (None, Some(end)) => Some((math.start_from_end(end, days)?, end)),
        (None, None) => None,
    })
}

/// Window of a movable task: the latest bound any dependency imposes, or
/// `project_start` when there is none.
fn floating_window(
    resolved: &[(&Edge, (NaiveDate, NaiveDate))],
    math: &DayMath<'_>,
    days: i64,
    project_start: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), OutOfRange> {
    let mut earliest = None;
    for (edge, window) in resolved {
        let bound = math.earliest_start(edge.kind, *window, days)?;
        earliest = earliest.max(Some(bound));
    }
    let start = math.snap(earliest.unwrap_or(project_start))?;
    Ok((start, math.end_from_start(start, days)?))
}

fn out_of_range(task: &Task, days: i64) -> ScheduleConflict {
    ScheduleConflict::new(
        &task.id,
        format!("Dates for a {days}-day duration fall outside the supported range"),
    )
}

/// Assigns dates to every task so that dependencies are satisfied.
///
/// # Errors
/// [`EngineError::Cycle`] if the graph is cyclic. Everything else is
/// reported in [`ScheduleResult::conflicts`].
pub fn auto_schedule(
    graph: &DependencyGraph,
    calendar: &Calendar,
    options: &ScheduleOptions,
) -> Result<ScheduleResult, EngineError> {
    let order = graph.topological_indices()?;
    let math = DayMath {
        calendar,
        business_only: options.use_business_days_only,
    };
    let project_start = options.project_start.unwrap_or_else(today);

    let mut computed: Vec<Option<(NaiveDate, NaiveDate)>> = vec![None; graph.len()];
    let mut conflicts = Vec::new();

    for &idx in &order {
        let task = graph.task_at(idx);
        let days = duration_days(task, &math, options);

        for dep in &task.dependencies {
            if !graph.contains(&dep.task_id) {
                conflicts.push(ScheduleConflict::new(
                    &task.id,
                    format!("Depends on unknown task '{}'", dep.task_id),
                ));
            }
        }

        let mut resolved: Vec<(&Edge, (NaiveDate, NaiveDate))> = Vec::new();
        for edge in graph.predecessor_edges(idx) {
            match computed[edge.depends_on] {
                Some(window) => resolved.push((edge, window)),
                None => conflicts.push(ScheduleConflict::new(
                    &task.id,
                    format!(
                        "Dependency '{}' could not be scheduled",
                        graph.task_at(edge.depends_on).id
                    ),
                )),
            }
        }

        let fixed = if options.respect_fixed_dates {
            fixed_window(task, &math, days)
        } else {
            Ok(None)
        };

        computed[idx] = match fixed {
            Err(OutOfRange) => {
                conflicts.push(out_of_range(task, days));
                None
            }
            Ok(Some((start, end))) if start > end => {
                conflicts.push(ScheduleConflict::new(
                    &task.id,
                    format!("Fixed start {start} is after fixed end {end}"),
                ));
                None
            }
            Ok(Some((start, end))) => {
                for (edge, (pred_start, pred_end)) in &resolved {
                    let satisfied = edge.kind.is_satisfied(
                        (Some(*pred_start), Some(*pred_end)),
                        (Some(start), Some(end)),
                    );
                    if satisfied == Some(false) {
                        conflicts.push(ScheduleConflict::new(
                            &task.id,
                            format!(
                                "Fixed dates violate {} dependency on '{}'",
                                edge.kind.abbreviation(),
                                graph.task_at(edge.depends_on).id
                            ),
                        ));
                    }
                }
                Some((start, end))
            }
            Ok(None) => match floating_window(&resolved, &math, days, project_start) {
                Ok(window) => Some(window),
                Err(OutOfRange) => {
                    conflicts.push(out_of_range(task, days));
                    None
                }
            },
        };
    }

    for conflict in &conflicts {
        warn!(task_id = %conflict.task_id, reason = %conflict.reason, "schedule conflict");
    }

    let tasks: Vec<ScheduledTask> = computed
        .iter()
        .enumerate()
        .filter_map(|(idx, window)| {
            window.map(|(start, end)| ScheduledTask::new(&graph.task_at(idx).id, start, end))
        })
        .collect();

    debug!(
        scheduled = tasks.len(),
        conflicts = conflicts.len(),
        "auto-scheduled tasks"
    );
    Ok(ScheduleResult { tasks, conflicts })
}
