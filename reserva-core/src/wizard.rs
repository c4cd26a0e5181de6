//! Step sequencing and navigation for the reservation wizard.
//!
//! The step list is data, derived from the business configuration and the
//! user's method choice; the same machine serves near-zero-click
//! single-method services and full four-step wizards. All illegal
//! navigation is a silent no-op: buttons are disabled in the UI, never
//! error sources.

use crate::service::{Provider, ReservationMethod, Service};
use crate::slots;
use crate::state::{Fetch, ReservationState, Step, StepKind};

/// Navigation intent produced by method selection.
///
/// Selecting a method mutates the store (a pure reducer); where the wizard
/// should go next is returned as data for the caller to act on, which
/// keeps the skip logic testable without a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodIntent {
    /// Order-now synthesized an immediate slot; jump straight to review.
    JumpToReview,
    /// A specific-provider method needs the provider list loaded before
    /// navigation can be decided.
    LoadProviders,
    /// Plain scheduling: jump to the datetime step.
    JumpToDateTime,
    /// No navigation requested (auto-selection during service setup).
    Stay,
}

impl ReservationState {
    /// Load a service and reset every selection the previous one owned.
    ///
    /// Single-method services have the method auto-selected so the user
    /// never sees a one-option step. The returned plan always ends with a
    /// month-availability fetch.
    pub fn set_service(&mut self, service: Service) -> Vec<Fetch> {
        self.is_multi_day = service.reservation_configs.is_multi_day;
        let sole_method = match service.reservation_methods.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        };
        self.service = Some(service);

        self.selected_method = None;
        self.selected_provider = None;
        self.providers.clear();
        self.reset_date_selection();
        self.current_step = 1;

        self.cursor = self.today().first_of_month();
        self.update_calendar_grid();

        let mut plan = Vec::new();
        if let Some(method) = sole_method {
            if self.select_method(&method, false) == MethodIntent::LoadProviders {
                plan.push(Fetch::Providers { advance: false });
            }
        } else {
            self.determine_steps();
        }
        plan.push(Fetch::MonthAvailability);
        plan
    }

    /// Recompute the active step list from configuration and selections.
    ///
    /// Idempotent; called after every method or service change. Clamps the
    /// current position when the list shrinks underneath it.
    pub fn determine_steps(&mut self) {
        let mut active = Vec::new();
        if let Some(service) = &self.service {
            if service.reservation_methods.len() > 1 {
                active.push(Step::new(StepKind::Method, "Choose Reservation Type"));
            }
            let method = self.selected_method.as_ref();
            if method.is_some_and(ReservationMethod::is_specific) {
                active.push(Step::new(StepKind::Provider, "Choose Provider"));
            }
            if method.is_some_and(|m| !m.is_order()) {
                let label = if self.is_multi_day {
                    "Choose Date Range"
                } else {
                    "Choose Date & Time"
                };
                active.push(Step::new(StepKind::DateTime, label));
            }
        }
        active.push(Step::new(StepKind::Review, "Review & Confirm"));

        self.steps = active;
        if self.current_step > self.steps.len() {
            self.current_step = self.steps.len();
        }
    }

    /// Advance one step if the current one is satisfied; no-op otherwise.
    pub fn next_step(&mut self) -> Vec<Fetch> {
        if self.current_step >= self.steps.len() || !self.can_proceed() {
            return Vec::new();
        }
        self.current_step += 1;
        self.datetime_entry_fetches()
    }

    /// Step back, clearing the selections the abandoned step owned.
    pub fn prev_step(&mut self) -> Vec<Fetch> {
        if self.current_step <= 1 {
            return Vec::new();
        }
        if let Some(kind) = self.current_step_kind() {
            self.clear_step_state(kind);
        }
        self.current_step -= 1;
        self.datetime_entry_fetches()
    }

    /// Jump to an arbitrary step. Backward jumps clear the state owned by
    /// every step walked over so nothing stale survives the landing.
    pub fn go_to_step(&mut self, step: usize) -> Vec<Fetch> {
        if step < 1 || step > self.steps.len() {
            return Vec::new();
        }
        if step < self.current_step {
            for position in (step + 1..=self.current_step).rev() {
                let kind = self.steps.get(position - 1).map(|s| s.kind);
                if let Some(kind) = kind {
                    self.clear_step_state(kind);
                }
            }
        }
        self.current_step = step;
        self.datetime_entry_fetches()
    }

    /// Month availability on entering datetime, plus a first-available
    /// lookup when no date is chosen yet.
    fn datetime_entry_fetches(&self) -> Vec<Fetch> {
        if self.current_step_kind() != Some(StepKind::DateTime) {
            return Vec::new();
        }
        let mut plan = vec![Fetch::MonthAvailability];
        if self.selected_date.is_none() && self.start_date.is_none() {
            plan.push(Fetch::FirstAvailable);
        }
        plan
    }

    /// Select a reservation method: clears date/slot state, recomputes the
    /// step list, and reports where to go next.
    ///
    /// `advance` is false during service setup auto-selection, where the
    /// wizard must not navigate on the user's behalf.
    pub fn select_method(&mut self, method: &ReservationMethod, advance: bool) -> MethodIntent {
        self.reset_date_selection();
        self.selected_method = Some(method.clone());
        self.determine_steps();

        if method.is_order() {
            self.synthesize_order_slot();
            return if advance { MethodIntent::JumpToReview } else { MethodIntent::Stay };
        }
        if method.is_specific() {
            return MethodIntent::LoadProviders;
        }
        if advance { MethodIntent::JumpToDateTime } else { MethodIntent::Stay }
    }

    /// Order-now bookings start immediately and span the configured total
    /// duration; no calendar interaction happens at all.
    fn synthesize_order_slot(&mut self) {
        let Some(service) = &self.service else {
            return;
        };
        let duration = service.total_duration_seconds();
        self.selected_slot = Some(slots::order_slot(duration, &self.tz()));
    }

    /// Store a freshly loaded provider list.
    pub fn apply_providers(&mut self, providers: Vec<Provider>) {
        self.providers = providers;
    }

    /// Select a provider and drop any date state chosen under another one.
    pub fn select_provider(&mut self, provider: Provider) -> Vec<Fetch> {
        self.selected_provider = Some(provider);
        self.reset_date_selection();
        if self.current_step_kind() == Some(StepKind::DateTime) {
            vec![Fetch::MonthAvailability, Fetch::FirstAvailable]
        } else {
            Vec::new()
        }
    }
}
