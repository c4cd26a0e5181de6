//! Business services, providers, and reservation configuration as
//! delivered by the backend.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::blocks::{Block, LocalizedText};

/// Fallback total duration when a service configures none.
pub const DEFAULT_SERVICE_DURATION_SECONDS: i64 = 3_600;

/// How many providers a single listing request asks for.
pub const PROVIDER_FETCH_LIMIT: u32 = 50;

/// A reservation method name as the backend reports it.
///
/// The known family is `STANDARD`, `ORDER`, and the open-ended `SPECIFIC_*`
/// variants; anything else behaves like `STANDARD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReservationMethod(String);

impl ReservationMethod {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Order-now: no date selection, the booking starts immediately.
    #[must_use]
    pub fn is_order(&self) -> bool {
        self.0 == "ORDER"
    }

    /// Specific-provider family: a provider must be chosen first.
    #[must_use]
    pub fn is_specific(&self) -> bool {
        self.0.contains("SPECIFIC")
    }
}

impl fmt::Display for ReservationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReservationMethod {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A bookable provider (stylist, room, practitioner) within a business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    #[serde(default)]
    pub name: LocalizedText,
}

/// One entry of a service's configured duration breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationEntry {
    /// Length in seconds.
    pub duration: i64,
}

/// Service-level reservation behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReservationConfigs {
    pub is_multi_day: bool,
}

/// Pricing presentation modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceKind {
    #[default]
    Standard,
    Custom,
    Complex,
}

/// A service price: a flat amount, a free-form localized text, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceOption {
    pub base_price: f64,
    #[serde(rename = "type")]
    pub kind: PriceKind,
    pub custom_value: LocalizedText,
}

/// Render a price option for display.
#[must_use]
pub fn format_price(option: Option<&PriceOption>, currency: &str, locale: &str) -> String {
    let Some(option) = option else {
        return String::new();
    };
    match option.kind {
        PriceKind::Standard => format!("{} {currency}", option.base_price),
        PriceKind::Custom => option.custom_value.resolve(locale).to_string(),
        PriceKind::Complex => format!(
            "{} {currency} + {}",
            option.base_price,
            option.custom_value.resolve(locale)
        ),
    }
}

/// A bookable service with its reservation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    #[serde(default)]
    pub name: LocalizedText,
    #[serde(default)]
    pub reservation_methods: Vec<ReservationMethod>,
    #[serde(default)]
    pub reservation_configs: ReservationConfigs,
    #[serde(default)]
    pub durations: Vec<DurationEntry>,
    #[serde(default)]
    pub reservation_blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_option: Option<PriceOption>,
}

impl Service {
    /// Sum of the configured duration entries, with a one-hour fallback.
    #[must_use]
    pub fn total_duration_seconds(&self) -> i64 {
        let total: i64 = self.durations.iter().map(|entry| entry.duration).sum();
        if total > 0 {
            total
        } else {
            DEFAULT_SERVICE_DURATION_SECONDS
        }
    }
}

/// Business-level configuration consumed by both carts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessConfigs {
    pub checkout_blocks: Vec<Block>,
    pub payment_methods: Vec<String>,
    pub currency: String,
}

/// A business record, reduced to the parts the widget consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Business {
    pub id: String,
    pub configs: BusinessConfigs,
}
