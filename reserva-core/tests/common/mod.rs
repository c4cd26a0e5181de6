//! Shared fixtures: an in-memory REST API double and cart storage.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::convert::Infallible;
use std::rc::Rc;

use reserva_core::blocks::{Block, LocalizedText};
use reserva_core::{
    ApiError, Business, BookingApi, BookingEngine, CartStorage, CheckoutReceipt, EshopCartItem,
    OrderRequest, Provider, ReservationConfigs, ReservationMethod, ReservationPart,
    ReservationRequest, Service, SlotQuery, SlotWindow, WidgetConfig,
};

/// Scripted API double. Windows are keyed by query shape: `limit == 1`
/// serves the first-available lookup, a 24-hour span serves day queries,
/// anything wider serves month queries.
#[derive(Default)]
pub struct FixtureApi {
    pub month_windows: RefCell<Vec<SlotWindow>>,
    pub day_windows: RefCell<Vec<SlotWindow>>,
    pub first_windows: RefCell<Vec<SlotWindow>>,
    pub providers: RefCell<Vec<Provider>>,
    pub slot_queries: RefCell<Vec<SlotQuery>>,
    pub token_calls: Cell<u32>,
    pub fail_verification: RefCell<Option<String>>,
}

const DAY_SECONDS: i64 = 24 * 3_600;

impl BookingApi for FixtureApi {
    async fn guest_token(&self) -> Result<String, ApiError> {
        self.token_calls.set(self.token_calls.get() + 1);
        Ok("guest-token".to_string())
    }

    async fn available_slots(
        &self,
        _business_id: &str,
        query: &SlotQuery,
    ) -> Result<Vec<SlotWindow>, ApiError> {
        self.slot_queries.borrow_mut().push(query.clone());
        if query.limit == 1 {
            return Ok(self.first_windows.borrow().clone());
        }
        if query.to - query.from <= DAY_SECONDS {
            return Ok(self.day_windows.borrow().clone());
        }
        Ok(self.month_windows.borrow().clone())
    }

    async fn providers(
        &self,
        _business_id: &str,
        _service_id: &str,
        _limit: u32,
    ) -> Result<Vec<Provider>, ApiError> {
        Ok(self.providers.borrow().clone())
    }

    async fn update_profile_phone(
        &self,
        _token: &str,
        _phone_number: &str,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    async fn confirm_phone(
        &self,
        _token: &str,
        _phone_number: &str,
        _code: &str,
    ) -> Result<(), ApiError> {
        match self.fail_verification.borrow().clone() {
            Some(message) => Err(ApiError::Server(message)),
            None => Ok(()),
        }
    }

    async fn create_reservation(
        &self,
        _token: &str,
        _request: &ReservationRequest,
    ) -> Result<CheckoutReceipt, ApiError> {
        Ok(CheckoutReceipt { reservation_id: "res-1".to_string(), client_secret: None })
    }

    async fn business(&self, business_id: &str) -> Result<Business, ApiError> {
        Ok(Business { id: business_id.to_string(), ..Business::default() })
    }

    async fn eshop_checkout(
        &self,
        _token: &str,
        _request: &OrderRequest,
    ) -> Result<CheckoutReceipt, ApiError> {
        Ok(CheckoutReceipt::default())
    }
}

/// Cart storage over a shared in-memory map, so two engine instances can
/// simulate a page reload against the same persisted state.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    carts: Rc<RefCell<HashMap<&'static str, String>>>,
}

impl CartStorage for MemoryStorage {
    type Error = Infallible;

    fn save_reservation_cart(&self, parts: &[ReservationPart]) -> Result<(), Self::Error> {
        let encoded = serde_json::to_string(parts).unwrap_or_default();
        self.carts.borrow_mut().insert("reservationCart", encoded);
        Ok(())
    }

    fn load_reservation_cart(&self) -> Result<Option<Vec<ReservationPart>>, Self::Error> {
        Ok(self
            .carts
            .borrow()
            .get("reservationCart")
            .and_then(|raw| serde_json::from_str(raw).ok()))
    }

    fn save_eshop_cart(&self, items: &[EshopCartItem]) -> Result<(), Self::Error> {
        let encoded = serde_json::to_string(items).unwrap_or_default();
        self.carts.borrow_mut().insert("eshopCart", encoded);
        Ok(())
    }

    fn load_eshop_cart(&self) -> Result<Option<Vec<EshopCartItem>>, Self::Error> {
        Ok(self
            .carts
            .borrow()
            .get("eshopCart")
            .and_then(|raw| serde_json::from_str(raw).ok()))
    }
}

pub type FixtureEngine = BookingEngine<FixtureApi, MemoryStorage>;

#[must_use]
pub fn engine() -> FixtureEngine {
    engine_with_storage(MemoryStorage::default())
}

#[must_use]
pub fn engine_with_storage(storage: MemoryStorage) -> FixtureEngine {
    BookingEngine::new(
        FixtureApi::default(),
        storage,
        WidgetConfig::new("https://api.example.com", "biz-1"),
    )
}

#[must_use]
pub fn provider(id: &str, name: &str) -> Provider {
    Provider { id: id.to_string(), name: LocalizedText::plain(name) }
}

#[must_use]
pub fn service(methods: &[&str], multi_day: bool) -> Service {
    Service {
        id: "svc-1".to_string(),
        name: LocalizedText::plain("City Tour"),
        reservation_methods: methods.iter().map(|m| ReservationMethod::new(*m)).collect(),
        reservation_configs: ReservationConfigs { is_multi_day: multi_day },
        durations: Vec::new(),
        reservation_blocks: vec![Block::text("note", "Note")],
        price_option: None,
    }
}

/// A one-hour window starting at the given hour of a UTC day.
#[must_use]
pub fn window_at(date: &str, hour: i64) -> SlotWindow {
    let day: jiff::civil::Date = date.parse().expect("valid date literal");
    let midnight = day
        .to_zoned(jiff::tz::TimeZone::UTC)
        .expect("UTC midnight")
        .timestamp()
        .as_second();
    SlotWindow { from: midnight + hour * 3_600, to: midnight + (hour + 1) * 3_600 }
}
