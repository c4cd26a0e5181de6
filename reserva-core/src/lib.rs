//! Reserva Booking Engine
//!
//! Platform-agnostic core for the Reserva booking widget: the reservation
//! wizard state machine, the calendar/availability engine, cart
//! accumulation with durable persistence, phone verification, and checkout
//! orchestration. This crate has no UI or browser dependencies; the REST
//! and storage seams are traits implemented by the embedding platform.

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde_json::Value;

pub mod availability;
pub mod blocks;
pub mod calendar;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod errors;
pub mod eshop;
pub mod phone;
pub mod selection;
pub mod service;
pub mod slots;
pub mod state;
pub mod timezone;
pub mod wizard;

// Re-export commonly used types
pub use availability::{AvailabilityScope, SLOT_FETCH_LIMIT, SlotQuery, SlotWindow};
pub use blocks::{Block, BlockKind, BlockProperties, LocalizedLabel, LocalizedText};
pub use calendar::{CalendarCell, month_grid, month_label};
pub use cart::ReservationPart;
pub use checkout::{
    CheckoutOutcome, CheckoutPart, CheckoutReceipt, ReservationRequest,
    build_reservation_request,
};
pub use config::WidgetConfig;
pub use errors::{ActionResult, ApiError, ServerError, friendly_server_error};
pub use eshop::{
    EshopCartItem, EshopStore, OrderItem, OrderRequest, Price, Product, Variant,
    is_cart_empty, unified_cart_count,
};
pub use phone::{
    PhoneVerification, ValidationError, map_verify_error, validate_email,
    validate_phone_number, validate_verification_code,
};
pub use service::{
    Business, BusinessConfigs, DurationEntry, PROVIDER_FETCH_LIMIT, PriceKind, PriceOption,
    Provider, ReservationConfigs, ReservationMethod, Service, format_price,
};
pub use slots::Slot;
pub use state::{Fetch, ReservationState, Step, StepKind};
pub use timezone::{TZ_GROUPS, TzChoice, TzGroup, resolve_time_zone};
pub use wizard::MethodIntent;

/// Trait for abstracting the booking REST API.
/// Platform-specific implementations should provide this.
pub trait BookingApi {
    /// Obtain an anonymous guest access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the guest login request fails.
    async fn guest_token(&self) -> Result<String, ApiError>;

    /// Query available slots for a service within a window.
    ///
    /// # Errors
    ///
    /// Returns an error if the availability request fails.
    async fn available_slots(
        &self,
        business_id: &str,
        query: &SlotQuery,
    ) -> Result<Vec<SlotWindow>, ApiError>;

    /// List the providers offering a service.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider listing fails.
    async fn providers(
        &self,
        business_id: &str,
        service_id: &str,
        limit: u32,
    ) -> Result<Vec<Provider>, ApiError>;

    /// Store a phone number on the guest profile, triggering code delivery.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the number.
    async fn update_profile_phone(&self, token: &str, phone_number: &str)
    -> Result<(), ApiError>;

    /// Confirm a phone number with a delivered code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is rejected.
    async fn confirm_phone(
        &self,
        token: &str,
        phone_number: &str,
        code: &str,
    ) -> Result<(), ApiError>;

    /// Submit the accumulated reservation parts in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the reservation is rejected; the cart must stay
    /// intact in that case.
    async fn create_reservation(
        &self,
        token: &str,
        request: &ReservationRequest,
    ) -> Result<CheckoutReceipt, ApiError>;

    /// Fetch the business record with checkout configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the business cannot be fetched.
    async fn business(&self, business_id: &str) -> Result<Business, ApiError>;

    /// Submit an e-shop order assembled directly from cart lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is rejected.
    async fn eshop_checkout(
        &self,
        token: &str,
        request: &OrderRequest,
    ) -> Result<CheckoutReceipt, ApiError>;
}

/// Trait for abstracting durable cart persistence.
/// Platform-specific implementations should provide this.
pub trait CartStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist the reservation cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    fn save_reservation_cart(&self, parts: &[ReservationPart]) -> Result<(), Self::Error>;

    /// Load the persisted reservation cart, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored cart cannot be read or decoded.
    fn load_reservation_cart(&self) -> Result<Option<Vec<ReservationPart>>, Self::Error>;

    /// Persist the e-shop cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    fn save_eshop_cart(&self, items: &[EshopCartItem]) -> Result<(), Self::Error>;

    /// Load the persisted e-shop cart, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored cart cannot be read or decoded.
    fn load_eshop_cart(&self) -> Result<Option<Vec<EshopCartItem>>, Self::Error>;
}

/// The booking engine: drives the wizard state machine against the REST
/// API and keeps the persisted carts in sync with the live stores.
///
/// Persistence is unidirectional: state changes trigger an explicit write,
/// and storage is only read back at cold start, so the two copies can
/// never chase each other.
pub struct BookingEngine<A, S>
where
    A: BookingApi,
    S: CartStorage,
{
    api: A,
    storage: S,
    config: WidgetConfig,
}

impl<A, S> BookingEngine<A, S>
where
    A: BookingApi,
    S: CartStorage,
{
    /// Create an engine from an API client, a storage backend, and the
    /// injected widget configuration.
    pub const fn new(api: A, storage: S, config: WidgetConfig) -> Self {
        Self { api, storage, config }
    }

    #[must_use]
    pub const fn config(&self) -> &WidgetConfig {
        &self.config
    }

    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Fresh wizard store: resolves the device zone against the curated
    /// list and loads the persisted cart once.
    #[must_use]
    pub fn init_reservation(&self, device_zone: &str) -> ReservationState {
        let zone = timezone::resolve_time_zone(device_zone);
        let mut state = ReservationState::new(&self.config, zone);
        match self.storage.load_reservation_cart() {
            Ok(Some(parts)) => state.parts = parts,
            Ok(None) => {}
            Err(err) => log::warn!("failed to load persisted reservation cart: {err}"),
        }
        state
    }

    /// Fresh e-shop store with its persisted lines loaded once.
    #[must_use]
    pub fn init_eshop(&self) -> EshopStore {
        let mut store = EshopStore::default();
        match self.storage.load_eshop_cart() {
            Ok(Some(items)) => store.items = items,
            Ok(None) => {}
            Err(err) => log::warn!("failed to load persisted e-shop cart: {err}"),
        }
        store
    }

    /// Load a service into the wizard and run the follow-up fetches.
    pub async fn set_service(&self, state: &mut ReservationState, service: Service) {
        let plan = state.set_service(service);
        self.run(state, plan).await;
    }

    /// Select a reservation method and act on the navigation intent it
    /// reports.
    pub async fn select_method(
        &self,
        state: &mut ReservationState,
        method: &ReservationMethod,
        advance: bool,
    ) {
        let intent = state.select_method(method, advance);
        let plan = match intent {
            MethodIntent::JumpToReview => state
                .step_number(StepKind::Review)
                .map_or_else(Vec::new, |step| state.go_to_step(step)),
            MethodIntent::JumpToDateTime => state
                .step_number(StepKind::DateTime)
                .map_or_else(Vec::new, |step| state.go_to_step(step)),
            MethodIntent::LoadProviders => vec![Fetch::Providers { advance }],
            MethodIntent::Stay => Vec::new(),
        };
        self.run(state, plan).await;
    }

    /// Select a provider and refresh availability under it.
    pub async fn select_provider(&self, state: &mut ReservationState, provider: Provider) {
        let plan = state.select_provider(provider);
        self.run(state, plan).await;
    }

    pub async fn next_step(&self, state: &mut ReservationState) {
        let plan = state.next_step();
        self.run(state, plan).await;
    }

    pub async fn prev_step(&self, state: &mut ReservationState) {
        let plan = state.prev_step();
        self.run(state, plan).await;
    }

    pub async fn go_to_step(&self, state: &mut ReservationState, step: usize) {
        let plan = state.go_to_step(step);
        self.run(state, plan).await;
    }

    /// Handle a calendar cell click.
    pub async fn select_date(&self, state: &mut ReservationState, cell: &CalendarCell) {
        let plan = state.select_date(cell);
        self.run(state, plan).await;
    }

    pub async fn prev_month(&self, state: &mut ReservationState) {
        let plan = state.prev_month();
        self.run(state, plan).await;
    }

    pub async fn next_month(&self, state: &mut ReservationState) {
        let plan = state.next_month();
        self.run(state, plan).await;
    }

    pub async fn set_time_zone(&self, state: &mut ReservationState, zone: &str) {
        let plan = state.set_time_zone(zone);
        self.run(state, plan).await;
    }

    pub async fn find_first_available(&self, state: &mut ReservationState) {
        let plan = state.find_first_available();
        self.run(state, plan).await;
    }

    /// Append the current selection to the cart and persist it.
    pub fn add_to_cart(&self, state: &mut ReservationState, slot: &Slot) -> Option<uuid::Uuid> {
        let id = state.add_part(slot)?;
        self.persist_reservation_cart(state);
        Some(id)
    }

    /// Remove a queued part and persist the remainder.
    pub fn remove_part(&self, state: &mut ReservationState, id: uuid::Uuid) {
        state.remove_part(id);
        self.persist_reservation_cart(state);
    }

    /// Obtain the guest token, reusing a previously acquired one.
    ///
    /// # Errors
    ///
    /// Returns an error when no token is cached and the login request
    /// fails.
    pub async fn ensure_guest_token(
        &self,
        state: &mut ReservationState,
    ) -> Result<String, ApiError> {
        if let Some(token) = &state.guest_token {
            return Ok(token.clone());
        }
        let token = self.api.guest_token().await?;
        state.guest_token = Some(token.clone());
        Ok(token)
    }

    /// Submit every queued part as one all-or-nothing reservation.
    ///
    /// Success empties both cart copies; failure leaves them untouched. An
    /// empty cart fails fast without touching the network, and a re-entered
    /// checkout is a silent no-op.
    pub async fn checkout(
        &self,
        state: &mut ReservationState,
        payment_method: Option<String>,
    ) -> CheckoutOutcome {
        if state.loading {
            return CheckoutOutcome::noop();
        }
        if state.parts.is_empty() {
            return CheckoutOutcome::failed("Cart is empty");
        }

        state.loading = true;
        let outcome = match self.submit_reservation(state, payment_method).await {
            Ok(receipt) => {
                state.parts.clear();
                self.persist_reservation_cart(state);
                CheckoutOutcome::completed(receipt)
            }
            Err(err) => {
                log::error!("checkout failed: {err}");
                CheckoutOutcome::failed(err.to_string())
            }
        };
        state.loading = false;
        outcome
    }

    async fn submit_reservation(
        &self,
        state: &mut ReservationState,
        payment_method: Option<String>,
    ) -> Result<CheckoutReceipt, ApiError> {
        let token = self
            .ensure_guest_token(state)
            .await
            .map_err(|err| ApiError::Server(format!("Failed to get guest token: {err}")))?;
        let request = build_reservation_request(
            &self.config.business_id,
            &state.parts,
            Vec::new(),
            payment_method,
        );
        self.api.create_reservation(&token, &request).await
    }

    /// Validate the entered phone number and ask the backend to deliver a
    /// verification code to it.
    pub async fn send_verification_code(&self, state: &mut ReservationState) -> ActionResult {
        state.phone.phone_error = None;
        state.phone.phone_success = None;
        state.phone.is_sending_code = true;
        let result = self.send_code_inner(state).await;
        state.phone.is_sending_code = false;
        result
    }

    async fn send_code_inner(&self, state: &mut ReservationState) -> ActionResult {
        if let Err(err) = phone::validate_phone_number(&state.phone.phone_number) {
            let message = err.to_string();
            state.phone.phone_error = Some(message.clone());
            return ActionResult::fail(message);
        }

        let token = match self.ensure_guest_token(state).await {
            Ok(token) => token,
            Err(err) => {
                let message = format!("Failed to get guest token: {err}");
                state.phone.phone_error = Some(message.clone());
                return ActionResult::fail(message);
            }
        };

        let phone_number = state.phone.phone_number.clone();
        match self.api.update_profile_phone(&token, &phone_number).await {
            Ok(()) => {
                state.phone.mark_code_sent(Timestamp::now().as_second());
                state.phone.phone_success =
                    Some("Verification code sent successfully!".to_string());
                ActionResult::ok()
            }
            Err(err) => {
                let message = err.to_string();
                state.phone.phone_error = Some(message.clone());
                ActionResult::fail(message)
            }
        }
    }

    /// Validate the entered code locally, then confirm it with the backend.
    pub async fn verify_phone_code(&self, state: &mut ReservationState) -> ActionResult {
        state.phone.verify_error = None;
        state.phone.is_verifying = true;
        let result = self.verify_code_inner(state).await;
        state.phone.is_verifying = false;
        result
    }

    async fn verify_code_inner(&self, state: &mut ReservationState) -> ActionResult {
        if let Err(err) = phone::validate_verification_code(&state.phone.verification_code) {
            let message = err.to_string();
            state.phone.verify_error = Some(message.clone());
            return ActionResult::fail(message);
        }

        let token = match self.ensure_guest_token(state).await {
            Ok(token) => token,
            Err(err) => {
                let message = format!("Failed to get guest token: {err}");
                state.phone.verify_error = Some(message.clone());
                return ActionResult::fail(message);
            }
        };

        let phone_number = state.phone.phone_number.clone();
        let code = state.phone.verification_code.clone();
        match self.api.confirm_phone(&token, &phone_number, &code).await {
            Ok(()) => {
                state.phone.mark_verified();
                ActionResult::ok()
            }
            Err(err) => {
                let message = phone::map_verify_error(&err.to_string());
                state.phone.verify_error = Some(message.clone());
                ActionResult::fail(message)
            }
        }
    }

    /// E-shop: add a line and persist.
    pub fn eshop_add_item(
        &self,
        store: &mut EshopStore,
        product: &Product,
        variant: &Variant,
        quantity: u32,
    ) {
        store.add_item(product, variant, quantity);
        self.persist_eshop_cart(store);
    }

    /// E-shop: change a line quantity (floor one) and persist.
    pub fn eshop_update_quantity(&self, store: &mut EshopStore, id: uuid::Uuid, quantity: u32) {
        store.update_quantity(id, quantity);
        self.persist_eshop_cart(store);
    }

    /// E-shop: drop a line and persist.
    pub fn eshop_remove_item(&self, store: &mut EshopStore, id: uuid::Uuid) {
        store.remove_item(id);
        self.persist_eshop_cart(store);
    }

    /// E-shop: empty the cart and persist.
    pub fn eshop_clear(&self, store: &mut EshopStore) {
        store.clear();
        self.persist_eshop_cart(store);
    }

    /// Bootstrap the checkout form from the business config, installing
    /// the fallback blocks when the fetch fails.
    pub async fn load_checkout_blocks(&self, store: &mut EshopStore) {
        store.loading = true;
        store.error = None;
        match self.api.business(&self.config.business_id).await {
            Ok(business) => {
                store.checkout_blocks = business.configs.checkout_blocks;
                store.payment_methods = business.configs.payment_methods;
                store.currency = business.configs.currency;
            }
            Err(err) => {
                log::error!("failed to load checkout configuration: {err}");
                store.install_default_checkout_blocks();
                store.error = Some("Failed to load checkout configuration".to_string());
            }
        }
        store.loading = false;
    }

    /// Submit the e-shop cart as one order.
    pub async fn eshop_checkout(
        &self,
        store: &mut EshopStore,
        form: &BTreeMap<String, Value>,
        payment_method: &str,
    ) -> ActionResult {
        if store.processing_checkout {
            return ActionResult::noop();
        }
        if store.is_empty() {
            store.error = Some("Cart is empty".to_string());
            return ActionResult::fail("Cart is empty");
        }

        store.processing_checkout = true;
        store.error = None;
        let result = self.eshop_checkout_inner(store, form, payment_method).await;
        store.processing_checkout = false;
        result
    }

    async fn eshop_checkout_inner(
        &self,
        store: &mut EshopStore,
        form: &BTreeMap<String, Value>,
        payment_method: &str,
    ) -> ActionResult {
        let token = match &store.guest_token {
            Some(token) => token.clone(),
            None => match self.api.guest_token().await {
                Ok(token) => {
                    store.guest_token = Some(token.clone());
                    token
                }
                Err(err) => {
                    let message = format!("Checkout failed: Failed to get guest token: {err}");
                    store.error = Some(message.clone());
                    return ActionResult::fail(message);
                }
            },
        };

        let request = OrderRequest {
            business_id: self.config.business_id.clone(),
            items: store.order_items(),
            payment_method: payment_method.to_string(),
            blocks: store.filled_checkout_blocks(form),
        };
        match self.api.eshop_checkout(&token, &request).await {
            Ok(_receipt) => {
                store.clear();
                self.persist_eshop_cart(store);
                ActionResult::ok()
            }
            Err(err) => {
                let message = format!("Checkout failed: {err}");
                store.error = Some(message.clone());
                ActionResult::fail(message)
            }
        }
    }

    /// Execute a fetch plan, feeding each response back into the store.
    /// Responses returning further work (first-available jumps, provider
    /// auto-selection) extend the plan for the next round.
    async fn run(&self, state: &mut ReservationState, mut plan: Vec<Fetch>) {
        if plan.is_empty() {
            return;
        }
        state.loading = true;
        while !plan.is_empty() {
            let mut next = Vec::new();
            for fetch in plan {
                match fetch {
                    Fetch::MonthAvailability => {
                        if let Some(query) = state.availability_query(AvailabilityScope::Month) {
                            match self.api.available_slots(&self.config.business_id, &query).await
                            {
                                Ok(windows) => {
                                    state.apply_month_availability(query.generation, &windows);
                                }
                                Err(err) => {
                                    log::error!("failed to fetch month availability: {err}");
                                }
                            }
                        }
                    }
                    Fetch::DaySlots(date) => {
                        if let Some(query) =
                            state.availability_query(AvailabilityScope::Day(date))
                        {
                            match self.api.available_slots(&self.config.business_id, &query).await
                            {
                                Ok(windows) => state.apply_day_slots(query.generation, &windows),
                                Err(err) => {
                                    log::error!("failed to fetch day availability: {err}");
                                }
                            }
                        }
                    }
                    Fetch::FirstAvailable => {
                        if let Some(query) = state.availability_query(AvailabilityScope::First) {
                            match self.api.available_slots(&self.config.business_id, &query).await
                            {
                                Ok(windows) => {
                                    next.extend(
                                        state.apply_first_available(query.generation, &windows),
                                    );
                                }
                                Err(err) => {
                                    log::error!("failed to find first available slot: {err}");
                                }
                            }
                        }
                    }
                    Fetch::Providers { advance } => {
                        next.extend(self.fetch_providers(state, advance).await);
                    }
                }
            }
            plan = next;
        }
        state.loading = false;
    }

    /// Load the provider list; with `advance`, a sole provider is selected
    /// automatically and the wizard jumps to datetime, while several
    /// providers advance to the provider step for the user to choose.
    async fn fetch_providers(&self, state: &mut ReservationState, advance: bool) -> Vec<Fetch> {
        state.providers.clear();
        let Some(service_id) = state.service.as_ref().map(|s| s.id.clone()) else {
            return Vec::new();
        };

        match self
            .api
            .providers(&self.config.business_id, &service_id, PROVIDER_FETCH_LIMIT)
            .await
        {
            Ok(providers) => state.apply_providers(providers),
            Err(err) => {
                log::error!("failed to load providers: {err}");
            }
        }

        if !advance {
            return Vec::new();
        }
        if state.providers.len() == 1 {
            let Some(provider) = state.providers.first().cloned() else {
                return Vec::new();
            };
            let mut plan = state.select_provider(provider);
            if let Some(step) = state.step_number(StepKind::DateTime) {
                plan.extend(state.go_to_step(step));
            }
            plan
        } else {
            state.next_step()
        }
    }

    fn persist_reservation_cart(&self, state: &ReservationState) {
        if let Err(err) = self.storage.save_reservation_cart(&state.parts) {
            log::error!("failed to persist reservation cart: {err}");
        }
    }

    fn persist_eshop_cart(&self, store: &EshopStore) {
        if let Err(err) = self.storage.save_eshop_cart(&store.items) {
            log::error!("failed to persist e-shop cart: {err}");
        }
    }
}
