//! Transport error types, server error decoding, and the result-object
//! shape store actions report through.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures surfaced by the REST client.
///
/// Transport problems and rejected requests both land here; callers branch
/// on the stored message rather than the variant in most flows.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("{0}")]
    Server(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// One field-level failure inside a structured server error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldError {
    pub field: String,
    pub code: String,
}

/// Structured error body the backend returns on 4xx/5xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerError {
    pub error: String,
    pub reason: String,
    pub code: String,
    pub status_code: u16,
    pub validation_errors: Vec<FieldError>,
}

/// Readable name for the error codes the widget can receive.
#[must_use]
pub fn error_code_message(code: &str) -> Option<&'static str> {
    Some(match code {
        "GENERAL.001" => "GENERAL.BAD_REQUEST",
        "GENERAL.002" => "GENERAL.VALIDATION_ERROR",
        "GENERAL.003" => "GENERAL.FORBIDDEN_ERROR",
        "GENERAL.004" => "GENERAL.INTERNAL_SERVER_ERROR",
        "GENERAL.005" => "GENERAL.UNAUTHORIZED",
        "GENERAL.006" => "GENERAL.UNAUTHENTICATED",
        "USER.001" => "USER.NOT_FOUND",
        "USER.002" => "USER.FAILED_TO_CREATE",
        "USER.003" => "USER.FAILED_TO_UPDATE",
        "USER.004" => "USER.FAILED_TO_DELETE",
        "USER.005" => "USER.EMAIL_EXISTS",
        "USER.006" => "USER.FAILED_TO_GET_UPLOAD_URL",
        _ => return None,
    })
}

/// Turn a raw error body into the friendliest text available: a known code
/// name, the server's own reason, or the body unchanged.
#[must_use]
pub fn friendly_server_error(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ServerError>(body) {
        if let Some(message) = error_code_message(&parsed.code) {
            return message.to_string();
        }
        if !parsed.reason.is_empty() {
            return parsed.reason;
        }
        if !parsed.error.is_empty() {
            return parsed.error;
        }
    }
    body.to_string()
}

/// Result-object propagation for store actions: UI layers branch on
/// `success` instead of unwinding. A failed result with no message is a
/// silent no-op (e.g. checkout re-entered while already in flight).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionResult {
    pub success: bool,
    pub error: Option<String>,
}

impl ActionResult {
    #[must_use]
    pub const fn ok() -> Self {
        Self { success: true, error: None }
    }

    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self { success: false, error: Some(message.into()) }
    }

    #[must_use]
    pub const fn noop() -> Self {
        Self { success: false, error: None }
    }
}
