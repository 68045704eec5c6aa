//! Scheduling domain models.
//!
//! Provides the data types exchanged with the board store: tasks and
//! their typed dependencies, the business calendar, timeline helpers,
//! and the auto-scheduling result.
//!
//! # Domain Mappings
//!
//! | gantt-schedule | Board | Gantt view |
//! |----------------|-------|------------|
//! | Task | Card | Bar |
//! | Dependency | Card link | Arrow |
//! | Calendar | Board settings | Shaded weekends |
//! | ScheduleResult | Card date updates | Bar positions |

pub mod calendar;
mod schedule;
mod task;
pub mod timeline;

pub use calendar::{Calendar, CalendarConfig};
pub use schedule::{ScheduleConflict, ScheduleResult, ScheduledTask};
pub use task::{Dependency, DependencyType, Task};
pub use timeline::{TimeScale, TimelineRange};
