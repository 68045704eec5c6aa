//! Timeline scales, ranges, and Gantt labels.

use std::fmt;
use std::str::FromStr;

use chrono::{Days, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::calendar::{quarter, today, week_number};
use super::Task;

/// Default padding (calendar days) on each side of a timeline range.
pub const DEFAULT_PADDING_DAYS: i64 = 7;

/// Span used when no task carries a date.
const EMPTY_RANGE_DAYS: i64 = 30;

/// Zoom level of the Gantt timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeScale {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        };
        f.write_str(s)
    }
}

impl FromStr for TimeScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            other => Err(format!("Unknown time scale: {other}")),
        }
    }
}

/// Inclusive date range shown on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimelineRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether `date` lies within the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Human-readable label for `date` at the given scale.
///
/// | Scale | Example |
/// |-------|---------|
/// | Day | `Jan 5` |
/// | Week | `W1` |
/// | Month | `Jan 2024` |
/// | Quarter | `Q1 2024` |
/// | Year | `2024` |
pub fn format_for_gantt(date: NaiveDate, scale: TimeScale) -> String {
    match scale {
        TimeScale::Day => date.format("%b %-d").to_string(),
        TimeScale::Week => format!("W{}", week_number(date)),
        TimeScale::Month => date.format("%b %Y").to_string(),
        TimeScale::Quarter => format!("Q{} {}", quarter(date), date.format("%Y")),
        TimeScale::Year => date.format("%Y").to_string(),
    }
}

/// Range covering every task date, padded on both sides.
///
/// Falls back to `[today, today + 30]` when no task has a date. Padding
/// that runs past chrono's date range is clamped to it.
pub fn timeline_range(tasks: &[Task], padding_days: i64) -> TimelineRange {
    timeline_range_at(tasks, padding_days, today())
}

/// [`timeline_range`] with an explicit "today".
pub fn timeline_range_at(tasks: &[Task], padding_days: i64, today: NaiveDate) -> TimelineRange {
    let dates = || {
        tasks
            .iter()
            .flat_map(|t| [t.start_date, t.end_date])
            .flatten()
    };

    match (dates().min(), dates().max()) {
        (Some(min), Some(max)) => {
            let padding = Duration::try_days(padding_days);
            TimelineRange::new(
                padding
                    .and_then(|p| min.checked_sub_signed(p))
                    .unwrap_or(NaiveDate::MIN),
                padding
                    .and_then(|p| max.checked_add_signed(p))
                    .unwrap_or(NaiveDate::MAX),
            )
        }
        _ => TimelineRange::new(today, today + Duration::days(EMPTY_RANGE_DAYS)),
    }
}

/// Tick dates from `range.start` to `range.end` inclusive, one scale unit apart.
///
/// Month-based steps are offsets from `range.start`, so a range starting
/// on the 31st yields month ends rather than drifting to the 28th.
pub fn timeline_points(range: &TimelineRange, scale: TimeScale) -> Vec<NaiveDate> {
    let mut points = Vec::new();
    let mut step: u32 = 0;

    loop {
        let point = match scale {
            TimeScale::Day => range.start.checked_add_days(Days::new(step.into())),
            TimeScale::Week => range.start.checked_add_days(Days::new(u64::from(step) * 7)),
            TimeScale::Month => range.start.checked_add_months(Months::new(step)),
            TimeScale::Quarter => range.start.checked_add_months(Months::new(step * 3)),
            TimeScale::Year => range.start.checked_add_months(Months::new(step * 12)),
        };
        match point {
            Some(p) if p <= range.end => points.push(p),
            _ => break,
        }
        step += 1;
    }

    points
}
