//! The e-shop cart: plain line items sharing the reservation cart's
//! persistence pattern, plus checkout form assembly.

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::blocks::{self, Block};
use crate::state::ReservationState;

/// A simple price: amount plus currency code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Price {
    pub base_price: f64,
    pub currency: String,
}

/// The product fields the cart snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

/// One purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    #[serde(default)]
    pub attributes: serde_json::Map<String, Value>,
    pub price: Price,
}

/// A cart line. Lines merge on (product, variant); quantity never drops
/// below one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EshopCartItem {
    pub id: Uuid,
    pub product_id: String,
    pub variant_id: String,
    pub product_name: String,
    #[serde(default)]
    pub product_slug: String,
    #[serde(default)]
    pub variant_attributes: serde_json::Map<String, Value>,
    pub price: Price,
    pub quantity: u32,
    pub added_at: i64,
}

/// A line stripped to what the order endpoint accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub variant_id: String,
    pub quantity: u32,
}

/// The e-shop order submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub business_id: String,
    pub items: Vec<OrderItem>,
    pub payment_method: String,
    pub blocks: Vec<Block>,
}

/// The e-shop cart store: persisted line items plus checkout-form state
/// bootstrapped from the business config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EshopStore {
    pub items: Vec<EshopCartItem>,
    pub checkout_blocks: Vec<Block>,
    pub payment_methods: Vec<String>,
    pub currency: String,
    pub processing_checkout: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub guest_token: Option<String>,
}

impl EshopStore {
    /// Add a variant to the cart, merging into an existing line when the
    /// same (product, variant) pair is already present.
    pub fn add_item(&mut self, product: &Product, variant: &Variant, quantity: u32) {
        let quantity = quantity.max(1);
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.product_id == product.id && line.variant_id == variant.id)
        {
            line.quantity += quantity;
            return;
        }

        self.items.push(EshopCartItem {
            id: Uuid::new_v4(),
            product_id: product.id.clone(),
            variant_id: variant.id.clone(),
            product_name: product.name.clone(),
            product_slug: product.slug.clone(),
            variant_attributes: variant.attributes.clone(),
            price: variant.price.clone(),
            quantity,
            added_at: Timestamp::now().as_millisecond(),
        });
    }

    /// Set a line's quantity, clamped to a floor of one.
    pub fn update_quantity(&mut self, id: Uuid, quantity: u32) {
        if let Some(line) = self.items.iter_mut().find(|line| line.id == id) {
            line.quantity = quantity.max(1);
        }
    }

    /// Remove a line entirely.
    pub fn remove_item(&mut self, id: Uuid) {
        self.items.retain(|line| line.id != id);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Cart total; the currency comes from the first line, with a USD
    /// fallback for an empty cart.
    #[must_use]
    pub fn total(&self) -> Price {
        let base_price = self
            .items
            .iter()
            .map(|line| line.price.base_price * f64::from(line.quantity))
            .sum();
        let currency = self
            .items
            .first()
            .map_or_else(|| "USD".to_string(), |line| line.price.currency.clone());
        Price { base_price, currency }
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lines stripped for the order endpoint.
    #[must_use]
    pub fn order_items(&self) -> Vec<OrderItem> {
        self.items
            .iter()
            .map(|line| OrderItem {
                product_id: line.product_id.clone(),
                variant_id: line.variant_id.clone(),
                quantity: line.quantity,
            })
            .collect()
    }

    /// Checkout form definitions filled from collected input.
    #[must_use]
    pub fn filled_checkout_blocks(&self, form: &BTreeMap<String, Value>) -> Vec<Block> {
        blocks::fill_blocks(&self.checkout_blocks, form)
    }

    /// Install the fallback checkout form used when the business config
    /// cannot be fetched.
    pub fn install_default_checkout_blocks(&mut self) {
        self.checkout_blocks = blocks::default_checkout_blocks();
    }
}

/// Combined badge count: e-shop units plus queued reservation parts.
#[must_use]
pub fn unified_cart_count(reservation: &ReservationState, eshop: &EshopStore) -> usize {
    eshop.item_count() as usize + reservation.parts.len()
}

/// Whether both carts are empty.
#[must_use]
pub fn is_cart_empty(reservation: &ReservationState, eshop: &EshopStore) -> bool {
    reservation.parts.is_empty() && eshop.is_empty()
}
