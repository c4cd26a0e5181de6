//! Calendar grid construction for the date picker.

use jiff::ToSpan;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};

/// One cell of the Monday-first, 7-column calendar grid.
///
/// `available` is only meaningful when `blank` is false; it is populated
/// after the fact by merging server month-availability results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCell {
    pub blank: bool,
    pub date: Option<Date>,
    pub available: bool,
}

impl CalendarCell {
    const BLANK: Self = Self { blank: true, date: None, available: false };

    fn day(date: Date) -> Self {
        Self { blank: false, date: Some(date), available: false }
    }

    /// Whether this cell can be clicked at all.
    #[must_use]
    pub const fn selectable(&self) -> bool {
        !self.blank && self.date.is_some() && self.available
    }
}

/// Build the grid of day cells for the month containing `cursor`.
///
/// Leading and trailing blanks pad the grid to a multiple of seven so the
/// rendered weeks always line up under a Monday-first header row.
#[must_use]
pub fn month_grid(cursor: Date) -> Vec<CalendarCell> {
    let first = cursor.first_of_month();
    let mut cells = Vec::with_capacity(42);

    let lead = first.weekday().to_monday_zero_offset().unsigned_abs();
    for _ in 0..lead {
        cells.push(CalendarCell::BLANK);
    }

    for day in 1..=first.days_in_month() {
        let Ok(date) = Date::new(first.year(), first.month(), day) else {
            continue;
        };
        cells.push(CalendarCell::day(date));
    }

    while cells.len() % 7 != 0 {
        cells.push(CalendarCell::BLANK);
    }

    cells
}

/// Human-readable month heading, e.g. `June 2024`.
#[must_use]
pub fn month_label(cursor: Date) -> String {
    cursor.strftime("%B %Y").to_string()
}

/// First day of the month before the one containing `cursor`.
#[must_use]
pub fn prev_month_of(cursor: Date) -> Date {
    cursor
        .first_of_month()
        .checked_sub(1.month())
        .unwrap_or(cursor)
}

/// First day of the month after the one containing `cursor`.
#[must_use]
pub fn next_month_of(cursor: Date) -> Date {
    cursor
        .first_of_month()
        .checked_add(1.month())
        .unwrap_or(cursor)
}
