//! Dependency graph validation.
//!
//! Checks the structural integrity of a board before scheduling and
//! collects *every* problem found, so the UI can mark all offending cards
//! at once. Detects:
//! - Dependency cycles (each loop reported separately)
//! - References to tasks that do not exist
//! - Tasks whose start date is after their end date
//! - Dependencies that existing fixed dates cannot satisfy
//! - Duplicate task IDs
//!
//! Validation never fails: data problems are expected states of a
//! user-edited board and are returned, not raised.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.3 (DFS edge classification)

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::DependencyGraph;

/// Outcome of validating a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `true` iff `errors` is empty.
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Errors of one kind.
    pub fn errors_of(&self, kind: ValidationErrorKind) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.kind == kind).collect()
    }

    /// Errors that mention a task, for inline warnings on its card.
    pub fn errors_for(&self, task_id: &str) -> Vec<&ValidationError> {
        self.errors
            .iter()
            .filter(|e| e.task_ids.iter().any(|id| id == task_id))
            .collect()
    }

    /// Whether any cycle was found.
    pub fn has_cycle(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::Cycle)
    }
}

/// A validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Tasks involved, so the UI can point at them.
    pub task_ids: Vec<String>,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationErrorKind {
    /// Tasks depend on each other in a loop.
    Cycle,
    /// A dependency names a task that doesn't exist.
    DanglingReference,
    /// Start date after end date.
    InvalidDateRange,
    /// Fixed dates violate a dependency.
    ConstraintConflict,
    /// Two tasks share the same ID.
    DuplicateId,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, task_ids: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            task_ids,
            message: message.into(),
        }
    }
}

/// Validates a dependency graph.
///
/// Checks:
/// 1. No duplicate task IDs
/// 2. All dependency targets exist
/// 3. `start_date <= end_date` on every task
/// 4. No dependency cycles
/// 5. Existing dates satisfy every dependency's type
///
/// # Returns
/// All detected issues; `valid` is `true` when there are none.
pub fn validate(graph: &DependencyGraph) -> ValidationResult {
    let mut errors = Vec::new();

    for id in graph.duplicates() {
        errors.push(ValidationError::new(
            ValidationErrorKind::DuplicateId,
            vec![id.clone()],
            format!("Duplicate task ID: {id}"),
        ));
    }

    for dangling in graph.dangling() {
        errors.push(ValidationError::new(
            ValidationErrorKind::DanglingReference,
            vec![dangling.task_id.clone(), dangling.missing_id.clone()],
            format!(
                "Task '{}' depends on unknown task '{}'",
                dangling.task_id, dangling.missing_id
            ),
        ));
    }

    for task in graph.tasks() {
        if let (Some(start), Some(end)) = (task.start_date, task.end_date) {
            if start > end {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidDateRange,
                    vec![task.id.clone()],
                    format!("Task '{}' starts {start} after it ends {end}", task.id),
                ));
            }
        }
    }

    for cycle in graph.find_cycles() {
        let task_ids: Vec<String> = cycle
            .iter()
            .map(|&idx| graph.task_at(idx).id.clone())
            .collect();
        let message = format!(
            "Circular dependency: {} -> {}",
            task_ids.join(" -> "),
            task_ids[0]
        );
        errors.push(ValidationError::new(
            ValidationErrorKind::Cycle,
            task_ids,
            message,
        ));
    }

    for edge in graph.edges() {
        if edge.dependent == edge.depends_on {
            continue;
        }
        let dependent = graph.task_at(edge.dependent);
        let depends_on = graph.task_at(edge.depends_on);
        if edge.kind.is_satisfied(depends_on.window(), dependent.window()) == Some(false) {
            errors.push(ValidationError::new(
                ValidationErrorKind::ConstraintConflict,
                vec![dependent.id.clone(), depends_on.id.clone()],
                format!(
                    "Dates of '{}' violate its {} dependency on '{}'",
                    dependent.id,
                    edge.kind.abbreviation(),
                    depends_on.id
                ),
            ));
        }
    }

    debug!(
        tasks = graph.len(),
        edges = graph.edges().len(),
        errors = errors.len(),
        "validated dependency graph"
    );
    ValidationResult::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dependency, Task};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn run(tasks: &[Task]) -> ValidationResult {
        validate(&DependencyGraph::from_tasks(tasks))
    }

    #[test]
    fn test_valid_input() {
        let result = run(&[
            Task::new("a").with_start(date(2024, 1, 1)).with_end(date(2024, 1, 2)),
            Task::new("b").depends_on("a"),
            Task::new("c").depends_on("a").depends_on("b"),
        ]);
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_dangling_reference() {
        let result = run(&[Task::new("X").depends_on("ghost")]);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        let err = &result.errors[0];
        assert_eq!(err.kind, ValidationErrorKind::DanglingReference);
        assert_eq!(err.task_ids, vec!["X", "ghost"]);
        assert!(!result.has_cycle());
    }

    #[test]
    fn test_invalid_date_range() {
        let result = run(&[Task::new("a")
            .with_start(date(2024, 3, 1))
            .with_end(date(2024, 2, 1))]);
        let errors = result.errors_of(ValidationErrorKind::InvalidDateRange);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].task_ids, vec!["a"]);
    }

    #[test]
    fn test_cycle_reports_loop() {
        // a → b → c → a
        let result = run(&[
            Task::new("a").depends_on("b"),
            Task::new("b").depends_on("c"),
            Task::new("c").depends_on("a"),
        ]);
        let cycles = result.errors_of(ValidationErrorKind::Cycle);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].task_ids, vec!["a", "b", "c"]);
        assert_eq!(cycles[0].message, "Circular dependency: a -> b -> c -> a");
    }

    #[test]
    fn test_all_cycles_reported() {
        let result = run(&[
            Task::new("a").depends_on("b"),
            Task::new("b").depends_on("a"),
            Task::new("c").depends_on("c"),
            Task::new("d"),
        ]);
        let cycles = result.errors_of(ValidationErrorKind::Cycle);
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[1].task_ids, vec!["c"]);
    }

    #[test]
    fn test_no_cycle_in_diamond() {
        let result = run(&[
            Task::new("a"),
            Task::new("b").depends_on("a"),
            Task::new("c").depends_on("a"),
            Task::new("d").depends_on("b").depends_on("c"),
        ]);
        assert!(!result.has_cycle());
        assert!(result.valid);
    }

    #[test]
    fn test_constraint_conflict_finish_to_start() {
        // b is fixed to start while a is still running
        let result = run(&[
            Task::new("a").with_start(date(2024, 1, 1)).with_end(date(2024, 1, 5)),
            Task::new("b").with_start(date(2024, 1, 3)).depends_on("a"),
        ]);
        let conflicts = result.errors_of(ValidationErrorKind::ConstraintConflict);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].task_ids, vec!["b", "a"]);
        assert!(conflicts[0].message.contains("FS"));
    }

    #[test]
    fn test_constraint_needs_both_dates() {
        // a has no end date, so FS cannot be checked yet
        let result = run(&[
            Task::new("a").with_start(date(2024, 1, 1)),
            Task::new("b").with_start(date(2024, 1, 1)).depends_on("a"),
        ]);
        assert!(result.valid);
    }

    #[test]
    fn test_constraint_conflict_other_types() {
        let a = Task::new("a").with_start(date(2024, 1, 8)).with_end(date(2024, 1, 12));
        let result = run(&[
            a,
            Task::new("ss")
                .with_start(date(2024, 1, 5))
                .with_dependency(Dependency::start_to_start("a")),
            Task::new("ff")
                .with_end(date(2024, 1, 10))
                .with_dependency(Dependency::finish_to_finish("a")),
            Task::new("sf")
                .with_end(date(2024, 1, 9))
                .with_dependency(Dependency::start_to_finish("a")),
        ]);
        let conflicts = result.errors_of(ValidationErrorKind::ConstraintConflict);
        let ids: Vec<&str> = conflicts.iter().map(|e| e.task_ids[0].as_str()).collect();
        assert_eq!(ids, vec!["ss", "ff"]);
    }

    #[test]
    fn test_duplicate_id() {
        let result = run(&[Task::new("a"), Task::new("a")]);
        assert_eq!(result.errors_of(ValidationErrorKind::DuplicateId).len(), 1);
    }

    #[test]
    fn test_multiple_errors() {
        let result = run(&[
            Task::new("a").depends_on("b").depends_on("missing"),
            Task::new("b")
                .with_start(date(2024, 5, 2))
                .with_end(date(2024, 5, 1))
                .depends_on("a"),
        ]);
        assert!(result.has_cycle());
        assert_eq!(result.errors_of(ValidationErrorKind::DanglingReference).len(), 1);
        assert_eq!(result.errors_of(ValidationErrorKind::InvalidDateRange).len(), 1);
        assert_eq!(result.errors_for("b").len(), 2);
    }

    #[test]
    fn test_serde_shape() {
        let result = run(&[Task::new("X").depends_on("ghost")]);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(value["errors"][0]["kind"], "dangling-reference");
        assert_eq!(value["errors"][0]["taskIds"][1], "ghost");
    }
}
