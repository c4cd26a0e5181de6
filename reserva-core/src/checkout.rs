//! Checkout payload assembly: accumulated parts become one reservation
//! request.

use serde::{Deserialize, Serialize};

use crate::blocks::Block;
use crate::cart::ReservationPart;
use crate::errors::ActionResult;
use crate::service::ReservationMethod;

/// A part stripped to the fields the reservation endpoint accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPart {
    pub service_id: String,
    pub from: i64,
    pub to: i64,
    pub blocks: Vec<Block>,
    pub reservation_method: ReservationMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

impl From<&ReservationPart> for CheckoutPart {
    fn from(part: &ReservationPart) -> Self {
        Self {
            service_id: part.service_id.clone(),
            from: part.from,
            to: part.to,
            blocks: part.blocks.clone(),
            reservation_method: part.reservation_method.clone(),
            provider_id: part.provider_id.clone(),
        }
    }
}

/// The single all-or-nothing reservation submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub business_id: String,
    pub blocks: Vec<Block>,
    pub parts: Vec<CheckoutPart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

/// What a successful checkout returns; `client_secret` is only present for
/// payment flows and is handed to the payment layer untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutReceipt {
    pub reservation_id: String,
    pub client_secret: Option<String>,
}

/// Outcome of a checkout action: the result-object shape plus the receipt
/// on success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub result: ActionResult,
    pub receipt: Option<CheckoutReceipt>,
}

impl CheckoutOutcome {
    #[must_use]
    pub const fn completed(receipt: CheckoutReceipt) -> Self {
        Self { result: ActionResult::ok(), receipt: Some(receipt) }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self { result: ActionResult::fail(message), receipt: None }
    }

    #[must_use]
    pub const fn noop() -> Self {
        Self { result: ActionResult::noop(), receipt: None }
    }

    #[must_use]
    pub const fn success(&self) -> bool {
        self.result.success
    }
}

/// Assemble the reservation request from the queued parts.
#[must_use]
pub fn build_reservation_request(
    business_id: &str,
    parts: &[ReservationPart],
    blocks: Vec<Block>,
    payment_method: Option<String>,
) -> ReservationRequest {
    ReservationRequest {
        business_id: business_id.to_string(),
        blocks,
        parts: parts.iter().map(CheckoutPart::from).collect(),
        payment_method,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn part() -> ReservationPart {
        ReservationPart {
            id: Uuid::new_v4(),
            service_id: "svc-1".to_string(),
            service_name: "City Tour".to_string(),
            date: "Sat, Jun 15, 2024".to_string(),
            from: 100,
            to: 200,
            time_text: "09:00 – 10:00".to_string(),
            is_multi_day: false,
            reservation_method: ReservationMethod::new("STANDARD"),
            provider_id: Some("p-1".to_string()),
            blocks: vec![Block::text("note", "Note")],
        }
    }

    #[test]
    fn parts_are_stripped_of_display_fields() {
        let request = build_reservation_request("biz-1", &[part()], Vec::new(), None);
        let json = serde_json::to_value(&request).unwrap();

        let wire_part = &json["parts"][0];
        assert_eq!(wire_part["serviceId"], "svc-1");
        assert_eq!(wire_part["from"], 100);
        assert_eq!(wire_part["providerId"], "p-1");
        assert!(wire_part.get("serviceName").is_none());
        assert!(wire_part.get("date").is_none());
        assert!(wire_part.get("timeText").is_none());
    }

    #[test]
    fn payment_method_is_omitted_when_absent() {
        let request = build_reservation_request("biz-1", &[part()], Vec::new(), None);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("paymentMethod").is_none());

        let paid =
            build_reservation_request("biz-1", &[part()], Vec::new(), Some("CASH".to_string()));
        let json = serde_json::to_value(&paid).unwrap();
        assert_eq!(json["paymentMethod"], "CASH");
    }

    #[test]
    fn receipt_tolerates_missing_client_secret() {
        let receipt: CheckoutReceipt =
            serde_json::from_str(r#"{"reservationId":"res-1"}"#).unwrap();
        assert_eq!(receipt.reservation_id, "res-1");
        assert_eq!(receipt.client_secret, None);
    }
}
