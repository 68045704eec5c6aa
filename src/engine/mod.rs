//! Dependency engine: ordering, critical path, and auto-scheduling.
//!
//! [`DependencyEngine`] bundles a validated [`Calendar`] and an
//! [`EngineConfig`] and exposes every operation the board store needs.
//! It holds no state between calls: each operation takes an immutable
//! [`DependencyGraph`] snapshot and returns a new value.
//!
//! # Usage
//!
//! ```
//! use chrono::NaiveDate;
//! use gantt_schedule::engine::DependencyEngine;
//! use gantt_schedule::models::Task;
//!
//! let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let tasks = vec![
//!     Task::new("a").with_estimate(2.0).with_start(monday),
//!     Task::new("b").with_estimate(3.0).depends_on("a"),
//! ];
//!
//! let engine = DependencyEngine::default();
//! let graph = engine.build_graph(&tasks).unwrap();
//! assert!(engine.validate(&graph).valid);
//!
//! let path = engine.compute_critical_path(&graph).unwrap();
//! assert_eq!(path.task_ids, vec!["a", "b"]);
//!
//! let schedule = engine.auto_schedule(&graph, &engine.schedule_options()).unwrap();
//! assert_eq!(
//!     schedule.get("b").unwrap().end_date,
//!     NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
//! );
//! ```
//!
//! # References
//!
//! - Kelley & Walker (1959), "Critical-Path Planning and Scheduling"
//! - Kahn (1962), "Topological sorting of large networks"

mod auto_schedule;
mod critical_path;

pub use auto_schedule::{auto_schedule, ScheduleOptions};
pub use critical_path::{compute_critical_path, compute_slack, CriticalPath, TaskTiming};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::graph::DependencyGraph;
use crate::models::{Calendar, CalendarConfig, ScheduleResult, Task};
use crate::validation::{self, ValidationResult};

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Duration used for tasks without an estimate. Default: 1.
    pub default_duration: f64,
    /// Largest board the engine accepts. Default: 10 000.
    pub max_tasks: usize,
    /// Business calendar.
    pub calendar: CalendarConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_duration: 1.0,
            max_tasks: 10_000,
            calendar: CalendarConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_default_duration(mut self, duration: f64) -> Self {
        self.default_duration = duration;
        self
    }

    pub fn with_max_tasks(mut self, max_tasks: usize) -> Self {
        self.max_tasks = max_tasks;
        self
    }

    pub fn with_calendar(mut self, calendar: CalendarConfig) -> Self {
        self.calendar = calendar;
        self
    }
}

/// Scheduling engine for one board configuration.
#[derive(Debug, Clone)]
pub struct DependencyEngine {
    config: EngineConfig,
    calendar: Calendar,
}

impl DependencyEngine {
    /// Creates an engine, validating the calendar configuration.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let calendar = Calendar::new(&config.calendar)?;
        Ok(Self { config, calendar })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Schedule options seeded from this engine's default duration.
    pub fn schedule_options(&self) -> ScheduleOptions {
        ScheduleOptions::new().with_default_duration(self.config.default_duration)
    }

    /// Builds a graph from a task snapshot.
    ///
    /// # Errors
    /// [`EngineError::TooManyTasks`] when the snapshot exceeds `max_tasks`.
    pub fn build_graph(&self, tasks: &[Task]) -> Result<DependencyGraph, EngineError> {
        if tasks.len() > self.config.max_tasks {
            return Err(EngineError::TooManyTasks {
                count: tasks.len(),
                limit: self.config.max_tasks,
            });
        }
        let graph = DependencyGraph::from_tasks(tasks);
        debug!(
            tasks = graph.len(),
            edges = graph.edges().len(),
            dangling = graph.dangling().len(),
            "built dependency graph"
        );
        Ok(graph)
    }

    /// Collects every validation problem in the graph.
    pub fn validate(&self, graph: &DependencyGraph) -> ValidationResult {
        validation::validate(graph)
    }

    /// Tasks ordered so that every task follows the tasks it depends on.
    ///
    /// # Errors
    /// [`EngineError::Cycle`] naming the tasks that could not be ordered.
    pub fn topological_order(&self, graph: &DependencyGraph) -> Result<Vec<Task>, EngineError> {
        let order = graph.topological_indices().inspect_err(|err| {
            warn!(error = %err, "cannot order a cyclic graph");
        })?;
        Ok(order
            .into_iter()
            .map(|idx| graph.task_at(idx).clone())
            .collect())
    }

    /// Longest duration-weighted dependency chain.
    pub fn compute_critical_path(
        &self,
        graph: &DependencyGraph,
    ) -> Result<CriticalPath, EngineError> {
        let path = compute_critical_path(graph, self.config.default_duration)?;
        debug!(
            length = path.task_ids.len(),
            total_duration = path.total_duration,
            "computed critical path"
        );
        Ok(path)
    }

    /// Earliest/latest times and slack for every task.
    pub fn compute_slack(&self, graph: &DependencyGraph) -> Result<Vec<TaskTiming>, EngineError> {
        compute_slack(graph, self.config.default_duration)
    }

    /// Assigns dates that satisfy every dependency, using this engine's calendar.
    ///
    /// `options` is used as given, including its `default_duration`. Start
    /// from [`schedule_options`](Self::schedule_options) to inherit
    /// [`EngineConfig::default_duration`].
    pub fn auto_schedule(
        &self,
        graph: &DependencyGraph,
        options: &ScheduleOptions,
    ) -> Result<ScheduleResult, EngineError> {
        auto_schedule(graph, &self.calendar, options)
    }
}

impl Default for DependencyEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            calendar: Calendar::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalendarError;
    use chrono::NaiveDate;

    #[test]
    fn test_invalid_calendar_rejected() {
        let config = EngineConfig::default()
            .with_calendar(CalendarConfig::default().with_working_days(vec![]));
        let err = DependencyEngine::new(config).unwrap_err();
        assert_eq!(err, EngineError::Calendar(CalendarError::NoWorkingDays));
    }

    #[test]
    fn test_size_guard() {
        let engine = DependencyEngine::new(EngineConfig::default().with_max_tasks(2)).unwrap();
        let tasks: Vec<Task> = (0..3).map(|i| Task::new(format!("t{i}"))).collect();
        assert_eq!(
            engine.build_graph(&tasks).unwrap_err(),
            EngineError::TooManyTasks { count: 3, limit: 2 }
        );
        assert!(engine.build_graph(&tasks[..2]).is_ok());
    }

    #[test]
    fn test_topological_order_returns_tasks() {
        let engine = DependencyEngine::default();
        let tasks = vec![Task::new("b").depends_on("a"), Task::new("a")];
        let graph = engine.build_graph(&tasks).unwrap();
        let ordered = engine.topological_order(&graph).unwrap();
        assert_eq!(ordered[0], tasks[1]);
        assert_eq!(ordered[1], tasks[0]);
    }

    #[test]
    fn test_topological_order_cycle() {
        let engine = DependencyEngine::default();
        let tasks = vec![Task::new("a").depends_on("b"), Task::new("b").depends_on("a")];
        let graph = engine.build_graph(&tasks).unwrap();
        assert_eq!(
            engine.topological_order(&graph).unwrap_err(),
            EngineError::Cycle {
                task_ids: vec!["a".into(), "b".into()]
            }
        );
    }

    #[test]
    fn test_default_duration_flows_through() {
        let engine =
            DependencyEngine::new(EngineConfig::default().with_default_duration(2.0)).unwrap();
        let graph = engine
            .build_graph(&[Task::new("a"), Task::new("b").depends_on("a")])
            .unwrap();
        assert_eq!(engine.compute_critical_path(&graph).unwrap().total_duration, 4.0);
        assert_eq!(engine.compute_slack(&graph).unwrap()[1].earliest_start, 2.0);

        let options = engine
            .schedule_options()
            .with_project_start(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(options.default_duration, 2.0);
        let schedule = engine.auto_schedule(&graph, &options).unwrap();
        let b = schedule.get("b").unwrap();
        assert_eq!(b.start_date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(b.end_date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
    }

    #[test]
    fn test_config_from_json() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"maxTasks": 500, "calendar": {"workingDays": [0, 1, 2, 3, 4]}}"#,
        )
        .unwrap();
        assert_eq!(config.max_tasks, 500);
        assert_eq!(config.default_duration, 1.0);
        let engine = DependencyEngine::new(config).unwrap();
        assert_eq!(engine.calendar().first_day_of_week(), 1);
    }
}
