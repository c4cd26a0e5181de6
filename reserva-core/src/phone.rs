//! Phone verification state, local validation, and server error mapping.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seconds a user must wait before requesting another code.
pub const RESEND_COOLDOWN_SECONDS: i64 = 60;

/// The backend issues fixed four-digit verification codes.
pub const VERIFICATION_CODE_LEN: usize = 4;

const PHONE_MIN_DIGITS: usize = 8;
const PHONE_MAX_DIGITS: usize = 15;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Field-level validation failures; these never reach the network.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Phone number is required")]
    PhoneRequired,
    #[error("Phone number is too short")]
    PhoneTooShort,
    #[error("Phone number is too long")]
    PhoneTooLong,
    #[error("Please enter a 4-digit verification code")]
    CodeFormat,
    #[error("Email is required")]
    EmailRequired,
    #[error("Please enter a valid email address")]
    EmailInvalid,
    #[error("{0} is required")]
    Required(&'static str),
}

/// Accepts 8–15 digits after stripping every non-digit character.
pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    if phone.is_empty() {
        return Err(ValidationError::PhoneRequired);
    }
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if digits < PHONE_MIN_DIGITS {
        return Err(ValidationError::PhoneTooShort);
    }
    if digits > PHONE_MAX_DIGITS {
        return Err(ValidationError::PhoneTooLong);
    }
    Ok(())
}

/// Accepts exactly four digits after stripping separators.
pub fn validate_verification_code(code: &str) -> Result<(), ValidationError> {
    let digits = code.chars().filter(char::is_ascii_digit).count();
    if digits != VERIFICATION_CODE_LEN {
        return Err(ValidationError::CodeFormat);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::EmailInvalid);
    }
    Ok(())
}

pub fn validate_required(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

/// Map a server verification failure to user-facing text by substring.
/// Unrecognized messages collapse into the generic variant.
#[must_use]
pub fn map_verify_error(server_message: &str) -> String {
    let lowered = server_message.to_ascii_lowercase();
    if lowered.contains("expired") {
        return "Verification code has expired. Please request a new one.".to_string();
    }
    if lowered.contains("incorrect") || lowered.contains("invalid") {
        return "Incorrect verification code. Please try again.".to_string();
    }
    "Invalid verification code".to_string()
}

/// Transient send-code / verify-code state, scoped to the review step.
///
/// Deliberately not reset by wizard resets: a verified phone stays verified
/// for the whole session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhoneVerification {
    pub phone_number: String,
    pub verification_code: String,
    pub is_phone_verified: bool,
    pub phone_error: Option<String>,
    pub phone_success: Option<String>,
    pub verify_error: Option<String>,
    pub is_sending_code: bool,
    pub is_verifying: bool,
    pub code_sent_at: Option<i64>,
    pub can_resend_at: Option<i64>,
}

impl PhoneVerification {
    /// Record a successful code send for the resend-cooldown UI.
    pub fn mark_code_sent(&mut self, now_seconds: i64) {
        self.code_sent_at = Some(now_seconds);
        self.can_resend_at = Some(now_seconds + RESEND_COOLDOWN_SECONDS);
    }

    /// Record a successful verification and clear the entered code.
    pub fn mark_verified(&mut self) {
        self.is_phone_verified = true;
        self.phone_success = None;
        self.verification_code.clear();
    }
}
