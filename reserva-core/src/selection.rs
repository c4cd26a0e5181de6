//! Date and slot selection: single-day picks, multi-day ranges, month
//! navigation, and time-zone switches.

use jiff::civil::Date;

use crate::calendar::{self, CalendarCell};
use crate::state::{Fetch, ReservationState, StepKind};
use crate::slots::Slot;

impl ReservationState {
    /// Handle a click on a calendar cell.
    ///
    /// Blank and unavailable cells are inert. Single-day mode selects the
    /// date and requests its slots; multi-day mode runs the three-click
    /// range cycle (start → complete range → restart).
    pub fn select_date(&mut self, cell: &CalendarCell) -> Vec<Fetch> {
        let Some(date) = cell.date else {
            return Vec::new();
        };
        if cell.blank || !cell.available {
            return Vec::new();
        }

        self.touch_availability();
        if self.is_multi_day {
            self.select_range_date(date);
            Vec::new()
        } else {
            self.selected_slot = None;
            self.selected_date = Some(date);
            vec![Fetch::DaySlots(date)]
        }
    }

    /// The three-click range cycle. The second click always normalizes the
    /// range to start ≤ end; a click on a complete range restarts from the
    /// clicked date rather than erroring.
    fn select_range_date(&mut self, date: Date) {
        match (self.start_date, self.end_date) {
            (None, _) => {
                self.start_date = Some(date);
                // Mirrored so the grid can highlight the pending start.
                self.selected_date = Some(date);
                self.end_date = None;
                self.selected_slot = None;
            }
            (Some(start), None) => {
                if date < start {
                    self.start_date = Some(date);
                    self.end_date = Some(start);
                } else {
                    self.end_date = Some(date);
                }
            }
            (Some(_), Some(_)) => {
                self.start_date = Some(date);
                self.selected_date = Some(date);
                self.end_date = None;
                self.selected_slot = None;
                self.slots.clear();
            }
        }
        self.maybe_create_range_slot();
    }

    /// Pick one of the listed time slots.
    pub fn select_time_slot(&mut self, slot: Slot) {
        self.selected_slot = Some(slot);
    }

    /// Show the previous month and refresh its availability.
    pub fn prev_month(&mut self) -> Vec<Fetch> {
        self.cursor = calendar::prev_month_of(self.cursor);
        self.after_month_change()
    }

    /// Show the next month and refresh its availability.
    pub fn next_month(&mut self) -> Vec<Fetch> {
        self.cursor = calendar::next_month_of(self.cursor);
        self.after_month_change()
    }

    fn after_month_change(&mut self) -> Vec<Fetch> {
        self.update_calendar_grid();
        self.touch_availability();
        if self.service.is_some() {
            vec![Fetch::MonthAvailability]
        } else {
            Vec::new()
        }
    }

    /// Switch the display zone. Slot time text is recomputed, not
    /// relabeled: day slots are re-fetched for the selected date, a
    /// completed range is re-synthesized locally, and an unstarted
    /// selection re-runs the first-available lookup.
    pub fn set_time_zone(&mut self, zone: &str) -> Vec<Fetch> {
        if zone == self.time_zone {
            return Vec::new();
        }
        self.time_zone = zone.to_string();
        self.touch_availability();

        if self.current_step_kind() != Some(StepKind::DateTime) {
            return Vec::new();
        }
        if self.is_multi_day && self.start_date.is_some() && self.end_date.is_some() {
            self.create_range_slot();
            return Vec::new();
        }
        if let Some(date) = self.selected_date {
            if !self.is_multi_day {
                return vec![Fetch::DaySlots(date)];
            }
        }
        if self.selected_date.is_none() && self.start_date.is_none() {
            return vec![Fetch::FirstAvailable];
        }
        Vec::new()
    }

    /// Kick off a first-available lookup, valid only on the datetime step.
    #[must_use]
    pub fn find_first_available(&self) -> Vec<Fetch> {
        if self.current_step_kind() == Some(StepKind::DateTime) {
            vec![Fetch::FirstAvailable]
        } else {
            Vec::new()
        }
    }

    /// Whether a cell should render as a selected endpoint (the single
    /// selection, or either bound of a range).
    #[must_use]
    pub fn is_selected_day(&self, cell: &CalendarCell) -> bool {
        let Some(date) = cell.date else {
            return false;
        };
        [self.selected_date, self.start_date, self.end_date]
            .into_iter()
            .flatten()
            .any(|selected| selected == date)
    }

    /// Whether a cell falls inside a completed range, endpoints included.
    #[must_use]
    pub fn is_in_selected_range(&self, cell: &CalendarCell) -> bool {
        let (Some(date), Some(start), Some(end)) = (cell.date, self.start_date, self.end_date)
        else {
            return false;
        };
        start <= date && date <= end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::LocalizedText;
    use crate::config::WidgetConfig;
    use crate::service::{ReservationConfigs, ReservationMethod, Service};
    use crate::state::Step;

    fn cell(date: &str, available: bool) -> CalendarCell {
        CalendarCell {
            blank: false,
            date: Some(date.parse().unwrap()),
            available,
        }
    }

    fn state(multi_day: bool) -> ReservationState {
        let config = WidgetConfig::new("https://api.example.com", "biz-1");
        let mut state = ReservationState::new(&config, "Europe/Paris");
        state.service = Some(Service {
            id: "svc-1".to_string(),
            name: LocalizedText::plain("Retreat"),
            reservation_methods: vec![ReservationMethod::new("STANDARD")],
            reservation_configs: ReservationConfigs { is_multi_day: multi_day },
            durations: Vec::new(),
            reservation_blocks: Vec::new(),
            price_option: None,
        });
        state.is_multi_day = multi_day;
        state.selected_method = Some(ReservationMethod::new("STANDARD"));
        state.steps = vec![
            Step::new(StepKind::DateTime, "Choose Date & Time"),
            Step::new(StepKind::Review, "Review & Confirm"),
        ];
        state.current_step = 1;
        state
    }

    #[test]
    fn blank_and_unavailable_cells_are_inert() {
        let mut state = state(false);
        let before = state.clone();

        assert!(state.select_date(&CalendarCell::default()).is_empty());
        assert!(state.select_date(&cell("2024-06-15", false)).is_empty());
        assert_eq!(state.selected_date, before.selected_date);
    }

    #[test]
    fn single_day_selection_requests_day_slots() {
        let mut state = state(false);
        state.selected_slot = Some(Slot::from_window(0, 3_600, &state.tz()));

        let plan = state.select_date(&cell("2024-06-15", true));
        assert_eq!(plan, vec![Fetch::DaySlots("2024-06-15".parse().unwrap())]);
        assert_eq!(state.selected_date, Some("2024-06-15".parse().unwrap()));
        // The stale slot from the previous date is dropped.
        assert_eq!(state.selected_slot, None);
    }

    #[test]
    fn range_cycle_start_complete_restart() {
        let mut state = state(true);

        // Click 1: start only.
        state.select_date(&cell("2024-06-10", true));
        assert_eq!(state.start_date, Some("2024-06-10".parse().unwrap()));
        assert_eq!(state.end_date, None);
        assert_eq!(state.selected_date, state.start_date);

        // Click 2, later date: range completes and a spanning slot appears.
        state.select_date(&cell("2024-06-14", true));
        assert_eq!(state.end_date, Some("2024-06-14".parse().unwrap()));
        let slot = state.selected_slot.as_ref().expect("range slot");
        assert!(slot.is_multi_day);
        assert_eq!(state.slots.len(), 1);

        // Click 3: the cycle restarts from the clicked date.
        state.select_date(&cell("2024-06-20", true));
        assert_eq!(state.start_date, Some("2024-06-20".parse().unwrap()));
        assert_eq!(state.end_date, None);
        assert_eq!(state.selected_slot, None);
        assert!(state.slots.is_empty());
    }

    #[test]
    fn range_click_before_start_swaps_bounds() {
        let mut state = state(true);
        state.select_date(&cell("2024-06-10", true));
        state.select_date(&cell("2024-06-05", true));

        assert_eq!(state.start_date, Some("2024-06-05".parse().unwrap()));
        assert_eq!(state.end_date, Some("2024-06-10".parse().unwrap()));
    }

    #[test]
    fn month_navigation_rebuilds_and_refetches() {
        let mut state = state(false);
        let cursor = state.cursor;
        let generation = state.availability_generation;

        let plan = state.next_month();
        assert_eq!(plan, vec![Fetch::MonthAvailability]);
        assert_eq!(state.cursor, calendar::next_month_of(cursor));
        assert_ne!(state.availability_generation, generation);

        let plan = state.prev_month();
        assert_eq!(plan, vec![Fetch::MonthAvailability]);
        assert_eq!(state.cursor, cursor);
    }

    #[test]
    fn month_navigation_without_service_skips_fetch() {
        let config = WidgetConfig::new("https://api.example.com", "biz-1");
        let mut state = ReservationState::new(&config, "Europe/Paris");
        assert!(state.next_month().is_empty());
    }

    #[test]
    fn timezone_change_refetches_selected_day() {
        let mut state = state(false);
        state.selected_date = Some("2024-06-15".parse().unwrap());

        assert!(state.set_time_zone("Europe/Paris").is_empty());

        let plan = state.set_time_zone("Asia/Tokyo");
        assert_eq!(plan, vec![Fetch::DaySlots("2024-06-15".parse().unwrap())]);
        assert_eq!(state.time_zone, "Asia/Tokyo");
    }

    #[test]
    fn timezone_change_without_selection_reruns_first_available() {
        let mut state = state(false);
        let plan = state.set_time_zone("Asia/Tokyo");
        assert_eq!(plan, vec![Fetch::FirstAvailable]);
    }

    #[test]
    fn timezone_change_rebuilds_range_slot_locally() {
        let mut state = state(true);
        state.select_date(&cell("2024-06-10", true));
        state.select_date(&cell("2024-06-14", true));
        let old_from = state.selected_slot.as_ref().unwrap().from;

        let plan = state.set_time_zone("Asia/Tokyo");
        assert!(plan.is_empty());
        let new_from = state.selected_slot.as_ref().unwrap().from;
        // 09:00 Tokyo is a different instant than 09:00 Paris.
        assert_ne!(old_from, new_from);
    }

    #[test]
    fn range_highlight_predicates() {
        let mut state = state(true);
        state.select_date(&cell("2024-06-10", true));
        state.select_date(&cell("2024-06-14", true));

        assert!(state.is_selected_day(&cell("2024-06-10", true)));
        assert!(state.is_selected_day(&cell("2024-06-14", true)));
        assert!(state.is_in_selected_range(&cell("2024-06-12", true)));
        assert!(!state.is_in_selected_range(&cell("2024-06-15", true)));
        assert!(!state.is_selected_day(&CalendarCell::default()));
    }

    #[test]
    fn first_available_only_runs_on_datetime_step() {
        let mut state = state(false);
        assert_eq!(state.find_first_available(), vec![Fetch::FirstAvailable]);
        state.current_step = 2;
        assert!(state.find_first_available().is_empty());
    }
}
