//! Task (card) model.
//!
//! A task is one schedulable card on the board. Tasks are value types:
//! builder methods consume `self` and return a new task, and the engine
//! never mutates the snapshot it is given.
//!
//! # Date Model
//! Dates are calendar dates (no time of day). End dates are inclusive:
//! a one-day task starts and ends on the same date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How a dependency constrains the dependent task's dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyType {
    /// Dependent cannot start before the depends-on task finishes.
    #[default]
    FinishToStart,
    /// Dependent cannot start before the depends-on task starts.
    StartToStart,
    /// Dependent cannot finish before the depends-on task finishes.
    FinishToFinish,
    /// Dependent cannot finish before the depends-on task starts.
    StartToFinish,
}

impl DependencyType {
    /// Short label used in messages ("FS", "SS", "FF", "SF").
    pub fn abbreviation(self) -> &'static str {
        match self {
            Self::FinishToStart => "FS",
            Self::StartToStart => "SS",
            Self::FinishToFinish => "FF",
            Self::StartToFinish => "SF",
        }
    }

    /// Checks the constraint against existing dates.
    ///
    /// `pred` is the depends-on task's (start, end), `succ` the dependent's.
    /// Returns `None` when a date the check needs is absent.
    pub fn is_satisfied(
        self,
        pred: (Option<NaiveDate>, Option<NaiveDate>),
        succ: (Option<NaiveDate>, Option<NaiveDate>),
    ) -> Option<bool> {
        let (pred_start, pred_end) = pred;
        let (succ_start, succ_end) = succ;
        match self {
            // Inclusive end dates: starting on the finish day overlaps it.
            Self::FinishToStart => Some(succ_start? > pred_end?),
            Self::StartToStart => Some(succ_start? >= pred_start?),
            Self::FinishToFinish => Some(succ_end? >= pred_end?),
            Self::StartToFinish => Some(succ_end? >= pred_start?),
        }
    }
}

/// A typed edge from a task to the task it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    /// The task this one depends on.
    pub task_id: String,
    /// Constraint type.
    #[serde(rename = "type", default)]
    pub kind: DependencyType,
}

impl Dependency {
    /// Creates a dependency of the given type.
    pub fn new(task_id: impl Into<String>, kind: DependencyType) -> Self {
        Self {
            task_id: task_id.into(),
            kind,
        }
    }

    pub fn finish_to_start(task_id: impl Into<String>) -> Self {
        Self::new(task_id, DependencyType::FinishToStart)
    }

    pub fn start_to_start(task_id: impl Into<String>) -> Self {
        Self::new(task_id, DependencyType::StartToStart)
    }

    pub fn finish_to_finish(task_id: impl Into<String>) -> Self {
        Self::new(task_id, DependencyType::FinishToFinish)
    }

    pub fn start_to_finish(task_id: impl Into<String>) -> Self {
        Self::new(task_id, DependencyType::StartToFinish)
    }
}

/// A schedulable task.
///
/// Consumed from the board store as an immutable snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier.
    pub id: String,
    /// First working date. `None` = unscheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Last working date (inclusive). `None` = unscheduled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Estimated duration in days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<f64>,
    /// Tasks this one depends on, in declaration order.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl Task {
    /// Creates an unscheduled task with no dependencies.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start_date: None,
            end_date: None,
            estimated_time: None,
            dependencies: Vec::new(),
        }
    }

    /// Sets the start date.
    pub fn with_start(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Sets the end date.
    pub fn with_end(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    /// Replaces both dates.
    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Sets the estimated duration (days).
    pub fn with_estimate(mut self, days: f64) -> Self {
        self.estimated_time = Some(days);
        self
    }

    /// Adds a dependency.
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Adds a finish-to-start dependency on `task_id`.
    pub fn depends_on(self, task_id: impl Into<String>) -> Self {
        self.with_dependency(Dependency::finish_to_start(task_id))
    }

    /// The estimate, if it is a usable positive duration.
    pub fn duration(&self) -> Option<f64> {
        self.estimated_time.filter(|d| d.is_finite() && *d > 0.0)
    }

    /// `(start_date, end_date)` pair.
    #[inline]
    pub fn window(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (self.start_date, self.end_date)
    }

    /// Whether the task has any date set.
    pub fn is_scheduled(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    /// Whether both dates are present and `start_date > end_date`.
    pub fn has_invalid_range(&self) -> bool {
        matches!((self.start_date, self.end_date), (Some(s), Some(e)) if s > e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_task_builder() {
        let task = Task::new("b")
            .with_start(date(2024, 1, 3))
            .with_end(date(2024, 1, 5))
            .with_estimate(3.0)
            .depends_on("a")
            .with_dependency(Dependency::start_to_start("c"));

        assert_eq!(task.id, "b");
        assert_eq!(task.window(), (Some(date(2024, 1, 3)), Some(date(2024, 1, 5))));
        assert_eq!(task.duration(), Some(3.0));
        assert_eq!(task.dependencies.len(), 2);
        assert_eq!(task.dependencies[0].kind, DependencyType::FinishToStart);
        assert_eq!(task.dependencies[1].kind, DependencyType::StartToStart);
        assert!(task.is_scheduled());
        assert!(!task.has_invalid_range());
    }

    #[test]
    fn test_unusable_estimate_is_ignored() {
        assert_eq!(Task::new("x").with_estimate(0.0).duration(), None);
        assert_eq!(Task::new("x").with_estimate(-2.0).duration(), None);
        assert_eq!(Task::new("x").with_estimate(f64::NAN).duration(), None);
        assert_eq!(Task::new("x").duration(), None);
    }

    #[test]
    fn test_invalid_range() {
        let task = Task::new("x")
            .with_start(date(2024, 2, 10))
            .with_end(date(2024, 2, 1));
        assert!(task.has_invalid_range());
    }

    #[test]
    fn test_finish_to_start_requires_next_day() {
        let pred = (Some(date(2024, 1, 1)), Some(date(2024, 1, 2)));
        let fs = DependencyType::FinishToStart;
        assert_eq!(fs.is_satisfied(pred, (Some(date(2024, 1, 3)), None)), Some(true));
        assert_eq!(fs.is_satisfied(pred, (Some(date(2024, 1, 2)), None)), Some(false));
        assert_eq!(fs.is_satisfied(pred, (None, Some(date(2024, 1, 9)))), None);
    }

    #[test]
    fn test_other_dependency_types() {
        let pred = (Some(date(2024, 1, 8)), Some(date(2024, 1, 12)));

        let ss = DependencyType::StartToStart;
        assert_eq!(ss.is_satisfied(pred, (Some(date(2024, 1, 8)), None)), Some(true));
        assert_eq!(ss.is_satisfied(pred, (Some(date(2024, 1, 5)), None)), Some(false));

        let ff = DependencyType::FinishToFinish;
        assert_eq!(ff.is_satisfied(pred, (None, Some(date(2024, 1, 12)))), Some(true));
        assert_eq!(ff.is_satisfied(pred, (None, Some(date(2024, 1, 11)))), Some(false));

        let sf = DependencyType::StartToFinish;
        assert_eq!(sf.is_satisfied(pred, (None, Some(date(2024, 1, 8)))), Some(true));
        assert_eq!(sf.is_satisfied(pred, (None, Some(date(2024, 1, 7)))), Some(false));
    }

    #[test]
    fn test_serde_shape() {
        let json = r#"{
            "id": "b",
            "startDate": "2024-01-03",
            "estimatedTime": 3,
            "dependencies": [
                {"taskId": "a", "type": "finish-to-start"},
                {"taskId": "c"}
            ]
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.start_date, Some(date(2024, 1, 3)));
        assert_eq!(task.end_date, None);
        assert_eq!(task.estimated_time, Some(3.0));
        assert_eq!(task.dependencies[1].kind, DependencyType::FinishToStart);

        let value = serde_json::to_value(&Task::new("x").with_dependency(
            Dependency::start_to_finish("y"),
        ))
        .unwrap();
        assert_eq!(value["dependencies"][0]["type"], "start-to-finish");
        assert_eq!(value["dependencies"][0]["taskId"], "y");
        assert!(value.get("startDate").is_none());
    }
}
