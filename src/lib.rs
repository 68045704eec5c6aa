//! Dependency-aware scheduling for Gantt boards.
//!
//! Takes an immutable snapshot of board tasks with typed dependencies and
//! derives everything the Gantt view shows: validation problems, a
//! dependency order, the critical path with per-task slack, and
//! auto-scheduled dates on a business calendar.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `Task`, `Dependency`, `DependencyType`,
//!   `Calendar`, `TimeScale`, `ScheduleResult`
//! - **`graph`**: `DependencyGraph`, rebuilt from scratch per computation
//! - **`validation`**: Cycle, dangling reference, date range, and
//!   constraint conflict detection
//! - **`engine`**: `DependencyEngine` — topological order, critical path,
//!   slack, auto-scheduling
//! - **`error`**: `EngineError`, `CalendarError`
//!
//! # Error Model
//!
//! Problems in user-edited data are returned as values
//! (`ValidationResult`, `ScheduleResult::conflicts`) so all of them can be
//! shown at once. Only operations that cannot produce a result at all
//! (ordering a cyclic graph, an oversized board, an invalid calendar)
//! return `Err`.
//!
//! # References
//!
//! - Kelley & Walker (1959), "Critical-Path Planning and Scheduling"
//! - Cormen et al. (2009), "Introduction to Algorithms", Ch. 22
//! - ISO 8601:2004, week numbering

pub mod engine;
pub mod error;
pub mod graph;
pub mod models;
pub mod validation;

pub use engine::{CriticalPath, DependencyEngine, EngineConfig, ScheduleOptions, TaskTiming};
pub use error::{CalendarError, EngineError};
pub use graph::DependencyGraph;
pub use models::{Dependency, DependencyType, ScheduleResult, Task};
pub use validation::{ValidationError, ValidationErrorKind, ValidationResult};
