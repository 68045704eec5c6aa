//! Business calendar and date arithmetic.
//!
//! Turns "N days of work" into concrete dates and counts working days
//! between dates. A [`Calendar`] is built once from a validated
//! [`CalendarConfig`]; after that every operation is pure and total.
//!
//! # Weekday Indices
//! Configuration uses 0 = Sunday .. 6 = Saturday, matching the board's
//! stored settings.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Calendar settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalendarConfig {
    /// First day of the week (0 = Sunday). Default: Monday.
    pub first_day_of_week: u8,
    /// Weekday indices that count as working days. Default: Mon–Fri.
    pub working_days: Vec<u8>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            first_day_of_week: 1,
            working_days: vec![1, 2, 3, 4, 5],
        }
    }
}

impl CalendarConfig {
    /// Sets the first day of the week.
    pub fn with_first_day_of_week(mut self, day: u8) -> Self {
        self.first_day_of_week = day;
        self
    }

    /// Replaces the working-day set.
    pub fn with_working_days(mut self, days: Vec<u8>) -> Self {
        self.working_days = days;
        self
    }
}

/// A validated business calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    first_day_of_week: u8,
    /// Indexed by days from Sunday.
    working: [bool; 7],
}

impl Calendar {
    /// Builds a calendar, rejecting out-of-range weekdays and empty
    /// working-day sets.
    pub fn new(config: &CalendarConfig) -> Result<Self, CalendarError> {
        if config.first_day_of_week > 6 {
            return Err(CalendarError::InvalidWeekday(config.first_day_of_week));
        }

        let mut working = [false; 7];
        for &day in &config.working_days {
            if day > 6 {
                return Err(CalendarError::InvalidWeekday(day));
            }
            working[day as usize] = true;
        }
        if !working.contains(&true) {
            return Err(CalendarError::NoWorkingDays);
        }

        Ok(Self {
            first_day_of_week: config.first_day_of_week,
            working,
        })
    }

    /// First day of the week (0 = Sunday).
    pub fn first_day_of_week(&self) -> u8 {
        self.first_day_of_week
    }

    /// Whether the date falls on a working weekday.
    #[inline]
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.working[date.weekday().num_days_from_sunday() as usize]
    }

    /// Steps `n` working days from `date` (backward if negative).
    ///
    /// Non-working days are skipped without being counted. `n = 0`
    /// returns `date` unchanged, even on a weekend. `None` when the
    /// result falls outside chrono's date range.
    pub fn add_business_days(&self, date: NaiveDate, n: i64) -> Option<NaiveDate> {
        if n == 0 {
            return Some(date);
        }
        let step = n.signum();
        let per_week = self.working_days_per_week();
        let mut remaining = n.unsigned_abs();

        // Any seven consecutive days hold every working weekday once.
        let weeks = (remaining - 1) / per_week;
        let skip = Duration::try_weeks(i64::try_from(weeks).ok()? * step)?;
        let mut current = date.checked_add_signed(skip)?;
        remaining -= weeks * per_week;

        while remaining > 0 {
            current = current.checked_add_signed(Duration::days(step))?;
            if self.is_working_day(current) {
                remaining -= 1;
            }
        }
        Some(current)
    }

    /// `date` if it is a working day, otherwise the next one.
    ///
    /// `None` only when no working day is left before chrono's last date.
    pub fn next_working_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        let mut current = date;
        while !self.is_working_day(current) {
            current = current.succ_opt()?;
        }
        Some(current)
    }

    fn working_days_per_week(&self) -> u64 {
        self.working.iter().filter(|w| **w).count() as u64
    }

    /// Working days in `[start, end]` inclusive.
    ///
    /// Antisymmetric: if `start > end` the count of `[end, start]` is
    /// returned negated.
    pub fn business_days_between(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        if start > end {
            return -self.business_days_between(end, start);
        }

        let total = (end - start).num_days() + 1;
        let full_weeks = total / 7;
        let per_week = self.working_days_per_week() as i64;

        // Whole weeks contain every weekday once; walk the remainder.
        let mut count = full_weeks * per_week;
        let mut current = start + Duration::days(full_weeks * 7);
        while current <= end {
            if self.is_working_day(current) {
                count += 1;
            }
            current += Duration::days(1);
        }
        count
    }

    /// `business_days_between * hours_per_day`.
    pub fn working_hours_between(&self, start: NaiveDate, end: NaiveDate, hours_per_day: f64) -> f64 {
        self.business_days_between(start, end) as f64 * hours_per_day
    }

    /// First day of the week containing `date`.
    pub fn start_of_week(&self, date: NaiveDate) -> NaiveDate {
        let weekday = date.weekday().num_days_from_sunday() as i64;
        let offset = (weekday - self.first_day_of_week as i64).rem_euclid(7);
        date - Duration::days(offset)
    }

    /// Last day of the week containing `date`.
    pub fn end_of_week(&self, date: NaiveDate) -> NaiveDate {
        self.start_of_week(date) + Duration::days(6)
    }
}

impl Default for Calendar {
    /// Mon–Fri working week starting on Monday.
    fn default() -> Self {
        let mut working = [false; 7];
        for day in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
            working[day.num_days_from_sunday() as usize] = true;
        }
        Self {
            first_day_of_week: 1,
            working,
        }
    }
}

impl TryFrom<&CalendarConfig> for Calendar {
    type Error = CalendarError;

    fn try_from(config: &CalendarConfig) -> Result<Self, Self::Error> {
        Self::new(config)
    }
}

/// Elapsed days between two instants, rounded up.
///
/// Negative when `start > end` (e.g. -1.5 days rounds to -1).
pub fn calendar_days_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    let ms = (end - start).num_milliseconds() as f64;
    (ms / MS_PER_DAY).ceil() as i64
}

/// ISO-8601 week number (1–53), nearest-Thursday rule.
pub fn week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Calendar quarter (1–4).
pub fn quarter(date: NaiveDate) -> u32 {
    date.month0() / 3 + 1
}

/// Midnight at the start of the day.
pub fn start_of_day(datetime: NaiveDateTime) -> NaiveDateTime {
    datetime.date().and_time(NaiveTime::MIN)
}

/// Last millisecond of the day.
pub fn end_of_day(datetime: NaiveDateTime) -> NaiveDateTime {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    datetime.date().and_time(last)
}

/// First day of the month.
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month.
pub fn end_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

/// Same calendar date, ignoring time of day.
pub fn is_same_day(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.date() == b.date()
}

/// Whether `datetime` falls on today's local date.
pub fn is_today(datetime: NaiveDateTime) -> bool {
    datetime.date() == today()
}

/// Today's local date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
