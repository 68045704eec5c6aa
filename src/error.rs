//! Error types.
//!
//! Data problems in user-edited boards (cycles, dangling references, bad
//! date ranges, conflicting constraints) are *not* errors: they are
//! returned as [`ValidationResult`](crate::validation::ValidationResult)
//! entries or schedule conflicts. The types here cover the cases where an
//! operation cannot produce a result at all.

use thiserror::Error;

/// Invalid calendar configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Weekday index out of range (expected 0-6): {0}")]
    InvalidWeekday(u8),

    #[error("Calendar has no working days")]
    NoWorkingDays,
}

/// Failure of an engine operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The graph contains a cycle; `task_ids` are the unresolved tasks.
    #[error("Dependency cycle among tasks: {}", task_ids.join(", "))]
    Cycle { task_ids: Vec<String> },

    #[error("Too many tasks: {count} (limit {limit})")]
    TooManyTasks { count: usize, limit: usize },

    #[error(transparent)]
    Calendar(#[from] CalendarError),
}
