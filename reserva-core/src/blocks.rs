//! Generic form blocks and locale-tagged text values.
//!
//! Blocks carry both the field definition (type, properties) and the
//! collected value, and are used verbatim for reservation intake forms and
//! e-shop checkout forms.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A locale-tagged text value with an explicit fallback chain:
/// requested locale → `en` → first available → empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// A text with only an `en` entry.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        let mut values = BTreeMap::new();
        values.insert("en".to_string(), text.into());
        Self(values)
    }

    pub fn insert(&mut self, locale: impl Into<String>, text: impl Into<String>) {
        self.0.insert(locale.into(), text.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve for a locale, walking the fallback chain.
    #[must_use]
    pub fn resolve(&self, locale: &str) -> &str {
        if let Some(text) = self.0.get(locale) {
            return text;
        }
        if let Some(text) = self.0.get("en") {
            return text;
        }
        self.0.values().next().map_or("", String::as_str)
    }
}

impl FromIterator<(String, String)> for LocalizedText {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A block label as delivered by the backend: either a bare string or a
/// locale map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedLabel {
    Plain(String),
    Localized(LocalizedText),
}

impl LocalizedLabel {
    #[must_use]
    pub fn resolve(&self, locale: &str) -> &str {
        match self {
            Self::Plain(text) => text,
            Self::Localized(text) => text.resolve(locale),
        }
    }
}

/// The closed set of block field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Text,
    Number,
    Html,
    Select,
    Range,
    Date,
    Boolean,
    GeoLocation,
    Block,
    Media,
}

/// Per-type field configuration. Unknown backend properties are preserved
/// in `extra` so round-tripping a block never loses data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<LocalizedLabel>,
    pub is_required: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub placeholder: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub help_text: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A form field definition plus its collected value.
///
/// Values are always held as a list; scalar backend payloads are wrapped
/// into single-element lists on deserialization so submission stays uniform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub key: String,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default)]
    pub properties: BlockProperties,
    #[serde(default, deserialize_with = "value_list")]
    pub value: Vec<Value>,
}

fn value_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Null => Vec::new(),
        Value::Array(values) => values,
        scalar => vec![scalar],
    })
}

impl Block {
    /// A bare text block, used for fallback checkout forms and tests.
    #[must_use]
    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            key: key.into(),
            kind: BlockKind::Text,
            properties: BlockProperties {
                label: Some(LocalizedLabel::Localized(LocalizedText::plain(label))),
                is_required: true,
                ..BlockProperties::default()
            },
            value: Vec::new(),
        }
    }

    /// Display label: the configured label when present, otherwise the key
    /// humanized (`full_name` → `Full Name`).
    #[must_use]
    pub fn label(&self, locale: &str) -> String {
        if let Some(label) = &self.properties.label {
            let resolved = label.resolve(locale);
            if !resolved.is_empty() {
                return resolved.to_string();
            }
        }
        humanize_key(&self.key)
    }

    /// First collected value, if any.
    #[must_use]
    pub fn first_value(&self) -> Option<&Value> {
        self.value.first()
    }

    /// First collected value as display text, resolving locale maps.
    #[must_use]
    pub fn text_value(&self, locale: &str) -> String {
        match self.first_value() {
            None => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(Value::Object(map)) => map
                .get(locale)
                .or_else(|| map.get("en"))
                .or_else(|| map.values().next())
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            Some(other) => other.to_string(),
        }
    }

    /// The same block with its value replaced by `[value]`.
    #[must_use]
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = vec![value];
        self
    }
}

fn humanize_key(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().collect::<String>() + chars.as_str()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fill form definitions from collected input, wrapping each value as a
/// single-element list. Missing fields submit as empty strings.
#[must_use]
pub fn fill_blocks(definitions: &[Block], form: &BTreeMap<String, Value>) -> Vec<Block> {
    definitions
        .iter()
        .map(|block| {
            let value = form
                .get(&block.key)
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()));
            block.clone().with_value(value)
        })
        .collect()
}

/// Fallback checkout form installed when the business config cannot be
/// fetched.
#[must_use]
pub fn default_checkout_blocks() -> Vec<Block> {
    vec![
        Block::text("email", "Email Address"),
        Block::text("fullName", "Full Name"),
    ]
}
