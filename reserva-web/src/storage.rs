//! Durable cart persistence over browser `localStorage`.

use gloo::storage::{LocalStorage, Storage};

use reserva_core::{CartStorage, EshopCartItem, ReservationPart};

/// Storage key for the reservation cart.
pub const RESERVATION_CART_KEY: &str = "reservationCart";
/// Storage key for the e-shop cart.
pub const ESHOP_CART_KEY: &str = "eshopCart";

/// `CartStorage` backed by `localStorage`, JSON-encoded under fixed keys.
///
/// Reads are forgiving: a missing or undecodable entry loads as an empty
/// cart rather than failing widget startup.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCartStorage;

#[derive(Debug, thiserror::Error)]
pub enum WebStorageError {
    #[error("storage error: {0}")]
    Storage(String),
}

impl CartStorage for LocalCartStorage {
    type Error = WebStorageError;

    fn save_reservation_cart(&self, parts: &[ReservationPart]) -> Result<(), Self::Error> {
        LocalStorage::set(RESERVATION_CART_KEY, parts)
            .map_err(|err| WebStorageError::Storage(err.to_string()))
    }

    fn load_reservation_cart(&self) -> Result<Option<Vec<ReservationPart>>, Self::Error> {
        match LocalStorage::get(RESERVATION_CART_KEY) {
            Ok(parts) => Ok(Some(parts)),
            Err(_) => Ok(None), // No cart persisted yet
        }
    }

    fn save_eshop_cart(&self, items: &[EshopCartItem]) -> Result<(), Self::Error> {
        LocalStorage::set(ESHOP_CART_KEY, items)
            .map_err(|err| WebStorageError::Storage(err.to_string()))
    }

    fn load_eshop_cart(&self) -> Result<Option<Vec<EshopCartItem>>, Self::Error> {
        match LocalStorage::get(ESHOP_CART_KEY) {
            Ok(items) => Ok(Some(items)),
            Err(_) => Ok(None), // No cart persisted yet
        }
    }
}
