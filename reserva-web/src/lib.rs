#![forbid(unsafe_code)]
//! Reserva browser adapter for the embeddable booking widget.
//!
//! This crate provides the platform half of the widget: the REST client
//! over `fetch`, cart persistence over `localStorage`, console logging,
//! and the `ReservationWidget` controller the embedding page drives. All
//! booking logic lives in `reserva-core`.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod api;
pub mod controller;
pub mod dom;
pub mod logging;
pub mod storage;

// Re-export the core so embedders need only one dependency.
pub use reserva_core::*;

pub use api::HttpBookingApi;
pub use controller::ReservationWidget;
pub use storage::{ESHOP_CART_KEY, LocalCartStorage, RESERVATION_CART_KEY};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}
