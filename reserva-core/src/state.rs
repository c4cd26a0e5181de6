//! The reservation wizard store: one mutable record per booking flow.

use jiff::Timestamp;
use jiff::civil::Date;
use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};

use crate::calendar::{self, CalendarCell};
use crate::cart::ReservationPart;
use crate::config::WidgetConfig;
use crate::phone::PhoneVerification;
use crate::service::{Provider, ReservationMethod, Service};
use crate::slots::{self, Slot};

/// One named stage of the reservation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Method,
    Provider,
    DateTime,
    Review,
}

impl StepKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Method => "method",
            Self::Provider => "provider",
            Self::DateTime => "datetime",
            Self::Review => "review",
        }
    }
}

/// An entry in the active step sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub kind: StepKind,
    pub label: String,
}

impl Step {
    #[must_use]
    pub fn new(kind: StepKind, label: impl Into<String>) -> Self {
        Self { kind, label: label.into() }
    }
}

/// Follow-up work a state transition asks the engine to perform.
///
/// Transitions stay pure: they mutate the store and describe the fetches
/// they need; the engine executes them and feeds results back through the
/// `apply_*` methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    /// Availability for the displayed month.
    MonthAvailability,
    /// Slots for one selected day.
    DaySlots(Date),
    /// The earliest bookable slot within the lookahead horizon.
    FirstAvailable,
    /// The provider list for the selected service; `advance` carries the
    /// caller's intent to auto-navigate once the list is known.
    Providers { advance: bool },
}

/// The single mutable record behind the reservation widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationState {
    pub current_step: usize,
    pub steps: Vec<Step>,

    pub selected_method: Option<ReservationMethod>,
    pub selected_provider: Option<Provider>,
    pub providers: Vec<Provider>,

    pub is_multi_day: bool,
    pub selected_date: Option<Date>,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub slots: Vec<Slot>,
    pub selected_slot: Option<Slot>,

    /// First day of the displayed month.
    pub cursor: Date,
    pub days: Vec<CalendarCell>,
    pub month_label: String,

    pub time_zone: String,
    pub locale: String,
    pub loading: bool,
    pub guest_token: Option<String>,
    pub service: Option<Service>,
    pub parts: Vec<ReservationPart>,
    pub phone: PhoneVerification,

    /// Monotonic tag for in-flight availability requests; responses whose
    /// tag no longer matches are discarded on arrival.
    pub availability_generation: u64,
}

impl ReservationState {
    /// Fresh store showing the current month in the given zone.
    #[must_use]
    pub fn new(config: &WidgetConfig, time_zone: impl Into<String>) -> Self {
        let time_zone = time_zone.into();
        let tz = TimeZone::get(&time_zone).unwrap_or(TimeZone::UTC);
        let cursor = Timestamp::now().to_zoned(tz).date().first_of_month();

        let mut state = Self {
            current_step: 1,
            steps: Vec::new(),
            selected_method: None,
            selected_provider: None,
            providers: Vec::new(),
            is_multi_day: false,
            selected_date: None,
            start_date: None,
            end_date: None,
            slots: Vec::new(),
            selected_slot: None,
            cursor,
            days: Vec::new(),
            month_label: String::new(),
            time_zone,
            locale: config.locale.clone(),
            loading: false,
            guest_token: None,
            service: None,
            parts: Vec::new(),
            phone: PhoneVerification::default(),
            availability_generation: 0,
        };
        state.determine_steps();
        state.update_calendar_grid();
        state
    }

    /// The selected display zone, falling back to UTC for unknown names.
    #[must_use]
    pub fn tz(&self) -> TimeZone {
        TimeZone::get(&self.time_zone).unwrap_or(TimeZone::UTC)
    }

    /// Today's civil date in the selected display zone.
    #[must_use]
    pub fn today(&self) -> Date {
        Timestamp::now().to_zoned(self.tz()).date()
    }

    #[must_use]
    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    /// Kind of the step the user is currently on.
    #[must_use]
    pub fn current_step_kind(&self) -> Option<StepKind> {
        self.steps.get(self.current_step.checked_sub(1)?).map(|s| s.kind)
    }

    /// 1-based position of a step kind in the active sequence.
    #[must_use]
    pub fn step_number(&self, kind: StepKind) -> Option<usize> {
        self.steps.iter().position(|s| s.kind == kind).map(|i| i + 1)
    }

    /// Whether the current step's required selection is present.
    #[must_use]
    pub fn can_proceed(&self) -> bool {
        match self.current_step_kind() {
            Some(StepKind::Method) => self.selected_method.is_some(),
            Some(StepKind::Provider) => self.selected_provider.is_some(),
            Some(StepKind::DateTime) => {
                if self.is_multi_day {
                    self.start_date.is_some()
                        && self.end_date.is_some()
                        && self.selected_slot.is_some()
                } else {
                    self.selected_date.is_some() && self.selected_slot.is_some()
                }
            }
            Some(StepKind::Review) => true,
            None => false,
        }
    }

    /// Invalidate any in-flight availability responses.
    pub fn touch_availability(&mut self) {
        self.availability_generation = self.availability_generation.wrapping_add(1);
    }

    /// Drop every date and slot selection.
    pub fn reset_date_selection(&mut self) {
        self.selected_date = None;
        self.start_date = None;
        self.end_date = None;
        self.slots.clear();
        self.selected_slot = None;
        self.touch_availability();
    }

    /// Clear the selections a given step owns.
    pub fn clear_step_state(&mut self, kind: StepKind) {
        match kind {
            StepKind::Method => self.selected_method = None,
            StepKind::Provider => {
                self.selected_provider = None;
                self.providers.clear();
            }
            StepKind::DateTime => self.reset_date_selection(),
            StepKind::Review => {}
        }
    }

    /// Rebuild the day grid and heading for the displayed month.
    pub fn update_calendar_grid(&mut self) {
        self.days = calendar::month_grid(self.cursor);
        self.month_label = calendar::month_label(self.cursor);
    }

    /// Synthesize the spanning slot once a complete range exists and the
    /// slot list does not already reflect it.
    pub fn maybe_create_range_slot(&mut self) {
        if self.slots.first().is_some_and(|slot| slot.is_multi_day) {
            return;
        }
        self.create_range_slot();
    }

    /// Unconditionally rebuild the spanning slot from the selected range,
    /// e.g. after a time-zone change invalidates the rendered times.
    pub fn create_range_slot(&mut self) {
        if !self.is_multi_day {
            return;
        }
        let (Some(start), Some(end)) = (self.start_date, self.end_date) else {
            return;
        };
        if let Some(slot) = slots::multi_day_slot(start, end, &self.tz()) {
            self.selected_slot = Some(slot.clone());
            self.slots = vec![slot];
        }
    }
}
