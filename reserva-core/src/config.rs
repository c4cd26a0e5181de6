//! Injected widget configuration.

use serde::{Deserialize, Serialize};

/// Endpoint and identity configuration supplied by the embedding page.
///
/// The widget never reads environment state itself; the host passes the
/// deployment-specific values in at initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub api_url: String,
    pub business_id: String,
    #[serde(default)]
    pub storage_url: String,
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_locale() -> String {
    "en".to_string()
}

impl WidgetConfig {
    #[must_use]
    pub fn new(api_url: impl Into<String>, business_id: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            business_id: business_id.into(),
            storage_url: String::new(),
            locale: default_locale(),
        }
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }
}
