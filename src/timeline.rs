//! Calendar and column-offset arithmetic for the Gantt timeline.
//!
//! Dates are day-granular `NaiveDate`s. The canonical positioning unit is the
//! signed day offset from the first day of the visible window; multiplying
//! by a column width gives a pixel position.

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::fields::Status;
use crate::task::{DateRange, Task};

/// Default width of one day column, in pixels.
pub const DAY_WIDTH: f64 = 48.0;

/// Signed whole-day difference `date - base`.
pub fn day_offset(date: NaiveDate, base: NaiveDate) -> i64 {
    (date - base).num_days()
}

/// Shift a date by a signed number of days, saturating at the calendar limits.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Inclusive day count between two dates. Never less than 1.
pub fn duration(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().abs() + 1
}

/// First and last day of the calendar month containing `anchor`.
pub fn month_range(anchor: NaiveDate) -> DateRange {
    let first = anchor - Duration::days(i64::from(anchor.day0()));
    let last = first
        .checked_add_months(Months::new(1))
        .map(|next| next - Duration::days(1))
        .unwrap_or(NaiveDate::MAX);
    DateRange::new(first, last)
}

/// Move an anchor date by whole months. Day of month clamps to the target month.
pub fn shift_month(anchor: NaiveDate, months: i32) -> NaiveDate {
    let step = Months::new(months.unsigned_abs());
    let shifted = if months >= 0 {
        anchor.checked_add_months(step)
    } else {
        anchor.checked_sub_months(step)
    };
    shifted.unwrap_or(anchor)
}

/// Every day from `start` to `end`, inclusive.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// "January 2024"
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Day delta for a horizontal pointer displacement.
///
/// Half-way cases round toward positive infinity.
pub fn pixel_delta_to_days(pixel_delta: f64, column_width: f64) -> i64 {
    if column_width <= 0.0 || !pixel_delta.is_finite() {
        return 0;
    }
    (pixel_delta / column_width + 0.5).floor() as i64
}

impl DateRange {
    /// Shift both endpoints, preserving duration.
    pub fn moved(self, delta_days: i64) -> DateRange {
        DateRange::new(add_days(self.start, delta_days), add_days(self.end, delta_days))
    }

    /// Shift the start; it never passes the end.
    pub fn resized_start(self, delta_days: i64) -> DateRange {
        let start = add_days(self.start, delta_days).min(self.end);
        DateRange::new(start, self.end)
    }

    /// Shift the end; it never passes the start.
    pub fn resized_end(self, delta_days: i64) -> DateRange {
        let end = add_days(self.end, delta_days).max(self.start);
        DateRange::new(self.start, end)
    }

    pub fn duration(self) -> i64 {
        duration(self.start, self.end)
    }
}

pub fn move_dates(task: &Task, delta_days: i64) -> Task {
    task.clone().with_range(task.range().moved(delta_days))
}

pub fn resize_start(task: &Task, delta_days: i64) -> Task {
    task.clone().with_range(task.range().resized_start(delta_days))
}

pub fn resize_end(task: &Task, delta_days: i64) -> Task {
    task.clone().with_range(task.range().resized_end(delta_days))
}

/// Not done, and either past its end date or explicitly delayed.
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    if task.status == Status::Done {
        return false;
    }
    today > task.end_date || task.status == Status::Delay
}

/// Horizontal placement of a task bar in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    pub left: f64,
    pub width: f64,
}

pub fn bar_geometry(task: &Task, base: NaiveDate, column_width: f64) -> BarGeometry {
    BarGeometry {
        left: day_offset(task.start_date, base) as f64 * column_width,
        width: duration(task.start_date, task.end_date) as f64 * column_width,
    }
}

/// Line from a visible parent row down to one of its visible children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connector {
    pub parent_row: usize,
    pub child_row: usize,
    pub parent_offset: i64,
    pub child_offset: i64,
}

/// Connectors for every visible row whose parent is also visible.
pub fn connectors(visible: &[&Task], base: NaiveDate) -> Vec<Connector> {
    visible
        .iter()
        .enumerate()
        .filter_map(|(row, task)| {
            let pid = task.parent_id.as_deref()?;
            let parent_row = visible.iter().position(|t| t.id == pid)?;
            Some(Connector {
                parent_row,
                child_row: row,
                parent_offset: day_offset(visible[parent_row].start_date, base),
                child_offset: day_offset(task.start_date, base),
            })
        })
        .collect()
}
