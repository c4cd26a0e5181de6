//! End-to-end wizard flows driven through the engine against scripted
//! API responses.

mod common;

use common::{engine, provider, service, window_at};
use futures::executor::block_on;
use reserva_core::{CalendarCell, MethodIntent, ReservationMethod, StepKind};

fn kinds(state: &reserva_core::ReservationState) -> Vec<StepKind> {
    state.steps.iter().map(|s| s.kind).collect()
}

#[test]
fn single_method_service_lands_on_datetime() {
    let engine = engine();
    let mut state = engine.init_reservation("UTC");

    block_on(engine.set_service(&mut state, service(&["STANDARD"], false)));

    assert_eq!(state.selected_method, Some(ReservationMethod::new("STANDARD")));
    assert_eq!(kinds(&state), vec![StepKind::DateTime, StepKind::Review]);
    assert_eq!(state.current_step_kind(), Some(StepKind::DateTime));
    // The month fetch went out for the landing step.
    assert!(!engine.api().slot_queries.borrow().is_empty());
}

#[test]
fn specific_method_with_two_providers_stops_at_provider_step() {
    let engine = engine();
    engine
        .api()
        .providers
        .borrow_mut()
        .extend([provider("p-1", "Ana"), provider("p-2", "Ben")]);
    let mut state = engine.init_reservation("UTC");
    block_on(engine.set_service(&mut state, service(&["STANDARD", "SPECIFIC_PROVIDER"], false)));

    block_on(engine.select_method(&mut state, &ReservationMethod::new("SPECIFIC_PROVIDER"), true));

    assert_eq!(
        kinds(&state),
        vec![StepKind::Method, StepKind::Provider, StepKind::DateTime, StepKind::Review]
    );
    assert_eq!(state.providers.len(), 2);
    // With a real choice to make, the wizard stops at the provider step.
    assert_eq!(state.current_step_kind(), Some(StepKind::Provider));
    assert_eq!(state.selected_provider, None);
}

#[test]
fn sole_provider_is_auto_selected_and_skipped() {
    let engine = engine();
    engine.api().providers.borrow_mut().push(provider("p-1", "Ana"));
    let mut state = engine.init_reservation("UTC");
    block_on(engine.set_service(&mut state, service(&["STANDARD", "SPECIFIC_PROVIDER"], false)));

    block_on(engine.select_method(&mut state, &ReservationMethod::new("SPECIFIC_PROVIDER"), true));

    assert_eq!(state.selected_provider.as_ref().map(|p| p.id.as_str()), Some("p-1"));
    assert_eq!(state.current_step_kind(), Some(StepKind::DateTime));
}

#[test]
fn order_method_jumps_straight_to_review() {
    let engine = engine();
    let mut state = engine.init_reservation("UTC");
    block_on(engine.set_service(&mut state, service(&["STANDARD", "ORDER"], false)));

    block_on(engine.select_method(&mut state, &ReservationMethod::new("ORDER"), true));

    assert_eq!(state.current_step_kind(), Some(StepKind::Review));
    assert!(state.selected_slot.is_some());
    // No availability traffic for an immediate booking.
    assert!(engine.api().slot_queries.borrow().is_empty());
}

#[test]
fn day_fetch_populates_and_auto_selects_slots() {
    let engine = engine();
    engine
        .api()
        .day_windows
        .borrow_mut()
        .extend([window_at("2024-06-15", 9), window_at("2024-06-15", 11)]);
    let mut state = engine.init_reservation("UTC");
    block_on(engine.set_service(&mut state, service(&["STANDARD"], false)));

    // Mark the day available, then click it.
    let date = "2024-06-15".parse().unwrap();
    state.cursor = date;
    state.update_calendar_grid();
    let cell = CalendarCell { blank: false, date: Some(date), available: true };
    block_on(engine.select_date(&mut state, &cell));

    assert_eq!(state.slots.len(), 2);
    assert_eq!(state.selected_slot.as_ref(), state.slots.first());
    assert!(!state.loading);
}

#[test]
fn first_available_drives_calendar_to_reported_month() {
    let engine = engine();
    engine.api().first_windows.borrow_mut().push(window_at("2024-08-20", 10));
    engine.api().day_windows.borrow_mut().push(window_at("2024-08-20", 10));
    let mut state = engine.init_reservation("UTC");
    block_on(engine.set_service(&mut state, service(&["STANDARD"], false)));

    block_on(engine.find_first_available(&mut state));

    assert_eq!(state.cursor, "2024-08-01".parse().unwrap());
    assert_eq!(state.selected_date, Some("2024-08-20".parse().unwrap()));
    assert_eq!(state.slots.len(), 1);
    assert!(state.selected_slot.is_some());
}

#[test]
fn multi_day_flow_builds_a_range_slot() {
    let engine = engine();
    let mut state = engine.init_reservation("UTC");
    block_on(engine.set_service(&mut state, service(&["STANDARD"], true)));

    let start = CalendarCell {
        blank: false,
        date: Some("2024-06-10".parse().unwrap()),
        available: true,
    };
    let end = CalendarCell {
        blank: false,
        date: Some("2024-06-14".parse().unwrap()),
        available: true,
    };
    block_on(engine.select_date(&mut state, &start));
    block_on(engine.select_date(&mut state, &end));

    assert!(state.can_proceed());
    let slot = state.selected_slot.clone().expect("range slot");
    assert!(slot.is_multi_day);

    // The completed pass queues a part shaped like the range.
    engine.add_to_cart(&mut state, &slot).expect("queued");
    assert!(state.parts[0].is_multi_day);
    assert_eq!(state.current_step, 1);
}

#[test]
fn method_intent_is_pure_and_inspectable() {
    // The reducer reports where to go without performing the navigation,
    // so the skip logic tests without any engine.
    let engine = engine();
    let mut state = engine.init_reservation("UTC");
    block_on(engine.set_service(&mut state, service(&["STANDARD", "ORDER"], false)));

    let intent = state.select_method(&ReservationMethod::new("ORDER"), true);
    assert_eq!(intent, MethodIntent::JumpToReview);
    assert_eq!(state.current_step_kind(), Some(StepKind::Method));
}

#[test]
fn expired_code_maps_to_the_specific_message() {
    let engine = engine();
    *engine.api().fail_verification.borrow_mut() = Some("verification code expired".to_string());
    let mut state = engine.init_reservation("UTC");
    state.phone.phone_number = "+38761234567".to_string();
    state.phone.verification_code = "1234".to_string();

    let result = block_on(engine.verify_phone_code(&mut state));

    assert!(!result.success);
    assert_eq!(
        state.phone.verify_error.as_deref(),
        Some("Verification code has expired. Please request a new one.")
    );
    assert!(!state.phone.is_verifying);
}

#[test]
fn successful_verification_clears_the_code() {
    let engine = engine();
    let mut state = engine.init_reservation("UTC");
    state.phone.phone_number = "+38761234567".to_string();
    state.phone.verification_code = "1234".to_string();

    let result = block_on(engine.verify_phone_code(&mut state));

    assert!(result.success);
    assert!(state.phone.is_phone_verified);
    assert!(state.phone.verification_code.is_empty());
}

#[test]
fn malformed_phone_number_never_reaches_the_server() {
    let engine = engine();
    let mut state = engine.init_reservation("UTC");
    state.phone.phone_number = "12".to_string();

    let result = block_on(engine.send_verification_code(&mut state));

    assert!(!result.success);
    assert_eq!(state.phone.phone_error.as_deref(), Some("Phone number is too short"));
    assert_eq!(engine.api().token_calls.get(), 0);
}

#[test]
fn sending_a_code_records_the_resend_cooldown() {
    let engine = engine();
    let mut state = engine.init_reservation("UTC");
    state.phone.phone_number = "+38761234567".to_string();

    let result = block_on(engine.send_verification_code(&mut state));

    assert!(result.success);
    assert!(state.phone.code_sent_at.is_some());
    assert!(state.phone.can_resend_at > state.phone.code_sent_at);
    assert!(state.phone.phone_success.is_some());
}
