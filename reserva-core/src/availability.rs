//! Availability windows: query construction and reconciliation of server
//! responses into the calendar grid and slot list.

use std::collections::HashSet;

use jiff::ToSpan;
use jiff::civil::Date;
use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};

use crate::slots::{self, Slot};
use crate::state::{Fetch, ReservationState, StepKind};

/// Result cap for month and day queries.
pub const SLOT_FETCH_LIMIT: u32 = 100;

/// How far ahead the first-available lookup scans, in months.
pub const FIRST_AVAILABLE_LOOKAHEAD_MONTHS: i32 = 3;

const DAY_SECONDS: i64 = 24 * 3_600;

/// Which availability window a query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityScope {
    /// The displayed month, first day through last.
    Month,
    /// Exactly 24 hours from local midnight of the given date.
    Day(Date),
    /// Today through the lookahead horizon, requesting a single result.
    First,
}

/// One availability request, tagged with the selection context it was
/// issued for so late responses can be recognized and dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotQuery {
    pub service_id: String,
    pub from: i64,
    pub to: i64,
    pub limit: u32,
    pub provider_id: Option<String>,
    pub generation: u64,
}

/// A raw bookable window as the server reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotWindow {
    pub from: i64,
    pub to: i64,
}

fn date_seconds(date: Date, tz: &TimeZone) -> i64 {
    date.to_zoned(tz.clone())
        .map(|zoned| zoned.timestamp().as_second())
        .unwrap_or_default()
}

impl ReservationState {
    /// Build the availability query for a scope, or `None` when no request
    /// should be issued: requests are suppressed off the datetime step and
    /// without a loaded service.
    #[must_use]
    pub fn availability_query(&self, scope: AvailabilityScope) -> Option<SlotQuery> {
        let service = self.service.as_ref()?;
        if self.current_step_kind() != Some(StepKind::DateTime) {
            return None;
        }

        let tz = self.tz();
        let (from, to, limit) = match scope {
            AvailabilityScope::Month => {
                let first = self.cursor.first_of_month();
                let last = self.cursor.last_of_month();
                (date_seconds(first, &tz), date_seconds(last, &tz), SLOT_FETCH_LIMIT)
            }
            AvailabilityScope::Day(date) => {
                let from = date_seconds(date, &tz);
                (from, from + DAY_SECONDS, SLOT_FETCH_LIMIT)
            }
            AvailabilityScope::First => {
                let today = self.today();
                let horizon = today
                    .first_of_month()
                    .checked_add(FIRST_AVAILABLE_LOOKAHEAD_MONTHS.months())
                    .and_then(|date| date.yesterday())
                    .unwrap_or(today);
                (date_seconds(today, &tz), date_seconds(horizon, &tz), 1)
            }
        };

        Some(SlotQuery {
            service_id: service.id.clone(),
            from,
            to,
            limit,
            provider_id: self.selected_provider.as_ref().map(|p| p.id.clone()),
            generation: self.availability_generation,
        })
    }

    /// True when a response tagged with `generation` still describes the
    /// current selection context.
    fn accepts_generation(&self, generation: u64) -> bool {
        if generation == self.availability_generation {
            return true;
        }
        log::debug!(
            "discarding stale availability response (generation {generation}, current {})",
            self.availability_generation
        );
        false
    }

    /// Merge month results into the day grid: a cell is available when the
    /// server reported at least one window starting on that day.
    pub fn apply_month_availability(&mut self, generation: u64, windows: &[SlotWindow]) {
        if !self.accepts_generation(generation) {
            return;
        }
        let tz = self.tz();
        let available: HashSet<Date> =
            windows.iter().map(|window| slots::day_of(window.from, &tz)).collect();

        for cell in &mut self.days {
            if let Some(date) = cell.date {
                cell.available = available.contains(&date);
            }
        }
    }

    /// Replace the slot list with a day's results, auto-selecting the first
    /// slot when the user has not picked one yet.
    pub fn apply_day_slots(&mut self, generation: u64, windows: &[SlotWindow]) {
        if !self.accepts_generation(generation) {
            return;
        }
        let tz = self.tz();
        self.slots = windows
            .iter()
            .map(|window| Slot::from_window(window.from, window.to, &tz))
            .collect();

        if self.selected_slot.is_none() {
            self.selected_slot = self.slots.first().cloned();
        }
    }

    /// Jump the calendar to the month of the first reported slot and seed
    /// the date selection from it. Returns the follow-up fetches: a month
    /// refresh, plus the day's slots in single-day mode.
    pub fn apply_first_available(&mut self, generation: u64, windows: &[SlotWindow]) -> Vec<Fetch> {
        if !self.accepts_generation(generation) {
            return Vec::new();
        }
        let Some(first) = windows.first() else {
            return Vec::new();
        };

        let date = slots::day_of(first.from, &self.tz());
        self.cursor = date.first_of_month();
        self.update_calendar_grid();
        self.touch_availability();

        let mut plan = vec![Fetch::MonthAvailability];
        if self.is_multi_day {
            self.start_date = Some(date);
            self.selected_date = Some(date);
        } else {
            self.selected_date = Some(date);
            plan.push(Fetch::DaySlots(date));
        }
        plan
    }
}
