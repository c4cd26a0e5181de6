//! The widget controller exposed to the embedding page.
//!
//! Owns the live stores and the engine, translates JS calls into engine
//! actions, and notifies subscribers with a serialized state snapshot
//! after every change. Actions run on the browser's single thread via
//! `spawn_local`; each one operates on a working copy of the store and
//! commits it when the engine call resolves.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use reserva_core::{
    BookingEngine, EshopStore, Product, ReservationMethod, ReservationState, Service, TZ_GROUPS,
    Variant, WidgetConfig,
};

use crate::api::HttpBookingApi;
use crate::dom;
use crate::storage::LocalCartStorage;

type WebEngine = BookingEngine<HttpBookingApi, LocalCartStorage>;

struct WidgetInner {
    engine: WebEngine,
    state: RefCell<ReservationState>,
    eshop: RefCell<EshopStore>,
    subscribers: RefCell<Vec<js_sys::Function>>,
}

impl WidgetInner {
    fn commit(&self, state: ReservationState) {
        *self.state.borrow_mut() = state;
        self.notify();
    }

    fn commit_eshop(&self, store: EshopStore) {
        *self.eshop.borrow_mut() = store;
        self.notify();
    }

    fn notify(&self) {
        let snapshot = match serde_wasm_bindgen::to_value(&*self.state.borrow()) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::error!("failed to serialize state snapshot: {err}");
                return;
            }
        };
        for subscriber in self.subscribers.borrow().iter() {
            if let Err(err) = subscriber.call1(&JsValue::NULL, &snapshot) {
                log::warn!("state subscriber failed: {}", dom::js_error_message(&err));
            }
        }
    }
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// The embeddable reservation widget.
#[wasm_bindgen]
pub struct ReservationWidget {
    inner: Rc<WidgetInner>,
}

#[wasm_bindgen]
impl ReservationWidget {
    /// Build the widget from an injected configuration object
    /// (`{ apiUrl, businessId, storageUrl?, locale? }`).
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration object cannot be decoded.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ReservationWidget, JsValue> {
        let config: WidgetConfig = serde_wasm_bindgen::from_value(config).map_err(js_error)?;
        let api = HttpBookingApi::new(config.api_url.clone());
        let engine = BookingEngine::new(api, LocalCartStorage, config);
        let state = engine.init_reservation(&dom::device_time_zone());
        let eshop = engine.init_eshop();

        Ok(Self {
            inner: Rc::new(WidgetInner {
                engine,
                state: RefCell::new(state),
                eshop: RefCell::new(eshop),
                subscribers: RefCell::new(Vec::new()),
            }),
        })
    }

    /// Register a callback invoked with a state snapshot after every
    /// change. The callback fires once immediately with the current state.
    pub fn subscribe(&self, callback: js_sys::Function) {
        self.inner.subscribers.borrow_mut().push(callback);
        self.inner.notify();
    }

    /// Current wizard state as a plain JS object.
    ///
    /// # Errors
    ///
    /// Returns an error when the snapshot cannot be serialized.
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&*self.inner.state.borrow()).map_err(js_error)
    }

    /// Current e-shop store as a plain JS object.
    ///
    /// # Errors
    ///
    /// Returns an error when the snapshot cannot be serialized.
    pub fn eshop_snapshot(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&*self.inner.eshop.borrow()).map_err(js_error)
    }

    /// The curated time-zone picker groups.
    ///
    /// # Errors
    ///
    /// Returns an error when the groups cannot be serialized.
    pub fn time_zone_groups(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(TZ_GROUPS).map_err(js_error)
    }

    /// Load a service definition and start a booking flow for it.
    ///
    /// # Errors
    ///
    /// Returns an error when the service object cannot be decoded.
    pub fn set_service(&self, service: JsValue) -> Result<(), JsValue> {
        let service: Service = serde_wasm_bindgen::from_value(service).map_err(js_error)?;
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let mut state = inner.state.borrow().clone();
            inner.engine.set_service(&mut state, service).await;
            inner.commit(state);
        });
        Ok(())
    }

    pub fn select_method(&self, method: String, advance: bool) {
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let mut state = inner.state.borrow().clone();
            inner
                .engine
                .select_method(&mut state, &ReservationMethod::new(method), advance)
                .await;
            inner.commit(state);
        });
    }

    /// Select a provider from the loaded list by its id.
    pub fn select_provider(&self, provider_id: String) {
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let provider = inner
                .state
                .borrow()
                .providers
                .iter()
                .find(|p| p.id == provider_id)
                .cloned();
            let Some(provider) = provider else {
                return;
            };
            let mut state = inner.state.borrow().clone();
            inner.engine.select_provider(&mut state, provider).await;
            inner.commit(state);
        });
    }

    pub fn next_step(&self) {
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let mut state = inner.state.borrow().clone();
            inner.engine.next_step(&mut state).await;
            inner.commit(state);
        });
    }

    pub fn prev_step(&self) {
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let mut state = inner.state.borrow().clone();
            inner.engine.prev_step(&mut state).await;
            inner.commit(state);
        });
    }

    pub fn go_to_step(&self, step: u32) {
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let mut state = inner.state.borrow().clone();
            inner.engine.go_to_step(&mut state, step as usize).await;
            inner.commit(state);
        });
    }

    /// Handle a click on the day grid by cell index.
    pub fn select_date(&self, cell_index: u32) {
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let cell = inner.state.borrow().days.get(cell_index as usize).copied();
            let Some(cell) = cell else {
                return;
            };
            let mut state = inner.state.borrow().clone();
            inner.engine.select_date(&mut state, &cell).await;
            inner.commit(state);
        });
    }

    /// Pick a slot from the listed day slots by index.
    pub fn select_time_slot(&self, slot_index: u32) {
        let slot = self.inner.state.borrow().slots.get(slot_index as usize).cloned();
        if let Some(slot) = slot {
            self.inner.state.borrow_mut().select_time_slot(slot);
            self.inner.notify();
        }
    }

    pub fn prev_month(&self) {
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let mut state = inner.state.borrow().clone();
            inner.engine.prev_month(&mut state).await;
            inner.commit(state);
        });
    }

    pub fn next_month(&self) {
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let mut state = inner.state.borrow().clone();
            inner.engine.next_month(&mut state).await;
            inner.commit(state);
        });
    }

    pub fn set_time_zone(&self, zone: String) {
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let mut state = inner.state.borrow().clone();
            inner.engine.set_time_zone(&mut state, &zone).await;
            inner.commit(state);
        });
    }

    /// Queue the currently selected slot as a cart part.
    pub fn add_to_cart(&self) {
        let slot = self.inner.state.borrow().selected_slot.clone();
        let Some(slot) = slot else {
            return;
        };
        let mut state = self.inner.state.borrow().clone();
        let _ = self.inner.engine.add_to_cart(&mut state, &slot);
        self.inner.commit(state);
    }

    /// Remove a queued part by its id.
    pub fn remove_part(&self, part_id: String) {
        let Ok(id) = part_id.parse::<uuid::Uuid>() else {
            return;
        };
        let mut state = self.inner.state.borrow().clone();
        self.inner.engine.remove_part(&mut state, id);
        self.inner.commit(state);
    }

    /// Submit every queued part as one reservation.
    pub fn checkout(&self, payment_method: Option<String>) {
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let mut state = inner.state.borrow().clone();
            let outcome = inner.engine.checkout(&mut state, payment_method).await;
            if let Some(error) = &outcome.result.error {
                log::error!("checkout failed: {error}");
            }
            inner.commit(state);
        });
    }

    pub fn set_phone_number(&self, phone_number: String) {
        self.inner.state.borrow_mut().phone.phone_number = phone_number;
        self.inner.notify();
    }

    pub fn set_verification_code(&self, code: String) {
        self.inner.state.borrow_mut().phone.verification_code = code;
        self.inner.notify();
    }

    pub fn send_verification_code(&self) {
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let mut state = inner.state.borrow().clone();
            inner.engine.send_verification_code(&mut state).await;
            inner.commit(state);
        });
    }

    pub fn verify_phone_code(&self) {
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let mut state = inner.state.borrow().clone();
            inner.engine.verify_phone_code(&mut state).await;
            inner.commit(state);
        });
    }

    /// E-shop: add a product variant to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the product or variant object cannot be
    /// decoded.
    pub fn eshop_add_item(
        &self,
        product: JsValue,
        variant: JsValue,
        quantity: u32,
    ) -> Result<(), JsValue> {
        let product: Product = serde_wasm_bindgen::from_value(product).map_err(js_error)?;
        let variant: Variant = serde_wasm_bindgen::from_value(variant).map_err(js_error)?;
        let mut store = self.inner.eshop.borrow().clone();
        self.inner.engine.eshop_add_item(&mut store, &product, &variant, quantity);
        self.inner.commit_eshop(store);
        Ok(())
    }

    pub fn eshop_update_quantity(&self, item_id: String, quantity: u32) {
        let Ok(id) = item_id.parse::<uuid::Uuid>() else {
            return;
        };
        let mut store = self.inner.eshop.borrow().clone();
        self.inner.engine.eshop_update_quantity(&mut store, id, quantity);
        self.inner.commit_eshop(store);
    }

    pub fn eshop_remove_item(&self, item_id: String) {
        let Ok(id) = item_id.parse::<uuid::Uuid>() else {
            return;
        };
        let mut store = self.inner.eshop.borrow().clone();
        self.inner.engine.eshop_remove_item(&mut store, id);
        self.inner.commit_eshop(store);
    }

    pub fn eshop_clear(&self) {
        let mut store = self.inner.eshop.borrow().clone();
        self.inner.engine.eshop_clear(&mut store);
        self.inner.commit_eshop(store);
    }

    /// Bootstrap the e-shop checkout form from the business config.
    pub fn load_checkout_blocks(&self) {
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let mut store = inner.eshop.borrow().clone();
            inner.engine.load_checkout_blocks(&mut store).await;
            inner.commit_eshop(store);
        });
    }

    /// E-shop: submit the cart as one order with the collected form
    /// values (`{ fieldKey: value }`).
    ///
    /// # Errors
    ///
    /// Returns an error when the form object cannot be decoded.
    pub fn eshop_checkout(&self, form: JsValue, payment_method: String) -> Result<(), JsValue> {
        let form: BTreeMap<String, serde_json::Value> =
            serde_wasm_bindgen::from_value(form).map_err(js_error)?;
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            let mut store = inner.eshop.borrow().clone();
            inner.engine.eshop_checkout(&mut store, &form, &payment_method).await;
            inner.commit_eshop(store);
        });
        Ok(())
    }
}
