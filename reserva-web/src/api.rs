//! The booking REST client over browser `fetch`.
//!
//! Every method follows the same shape: build the URL, issue the request,
//! and convert failures into `ApiError` values. Transport problems become
//! `Network`; rejected requests become `Server` with the friendliest text
//! the body offers.

use gloo::net::http::{Request, Response};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use reserva_core::{
    ApiError, BookingApi, Business, CheckoutReceipt, OrderRequest, Provider, ReservationRequest,
    SlotQuery, SlotWindow, friendly_server_error,
};

/// `BookingApi` implementation over `fetch`.
#[derive(Debug, Clone)]
pub struct HttpBookingApi {
    base_url: String,
}

impl HttpBookingApi {
    /// Client for the given API origin; the versioned path prefix is
    /// appended per request.
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        let mut base_url = api_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn network_error(err: &gloo::net::Error) -> ApiError {
    ApiError::Network(err.to_string())
}

fn slots_url(base: &str, business_id: &str, query: &SlotQuery) -> String {
    let mut url = format!(
        "{base}/v1/businesses/{}/services/{}/available-slots?from={}&to={}&limit={}",
        business_id,
        &query.service_id,
        query.from,
        query.to,
        query.limit
    );
    if let Some(provider_id) = &query.provider_id {
        url.push_str(&format!("&providerId={provider_id}"));
    }
    url
}

fn providers_url(base: &str, business_id: &str, service_id: &str, limit: u32) -> String {
    format!(
        "{base}/v1/businesses/{business_id}/providers?serviceId={service_id}&limit={limit}"
    )
}

fn business_url(base: &str, business_id: &str) -> String {
    format!("{base}/v1/businesses/{business_id}")
}

fn orders_checkout_url(base: &str, business_id: &str) -> String {
    format!("{base}/v1/businesses/{business_id}/orders/checkout")
}

/// Pull the item list out of either `{items: [...]}` or the nested
/// `{data: {items: [...]}}` envelope older deployments return.
fn extract_items<T: DeserializeOwned>(value: &Value) -> Vec<T> {
    value
        .get("data")
        .and_then(|data| data.get("items"))
        .or_else(|| value.get("items"))
        .and_then(|items| serde_json::from_value(items.clone()).ok())
        .unwrap_or_default()
}

async fn server_error(response: Response) -> ApiError {
    let status_text = response.status_text();
    let body = response.text().await.unwrap_or_default();
    if body.is_empty() {
        ApiError::Server(status_text)
    } else {
        ApiError::Server(friendly_server_error(&body))
    }
}

async fn decode_json(response: Response) -> Result<Value, ApiError> {
    response
        .json::<Value>()
        .await
        .map_err(|err| ApiError::Decode(err.to_string()))
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

impl BookingApi for HttpBookingApi {
    async fn guest_token(&self) -> Result<String, ApiError> {
        let url = format!("{}/v1/users/login", self.base_url);
        let response = Request::post(&url)
            .json(&json!({ "provider": "GUEST" }))
            .map_err(|err| network_error(&err))?
            .send()
            .await
            .map_err(|err| network_error(&err))?;
        if !response.ok() {
            return Err(ApiError::Server("Guest login failed".to_string()));
        }

        let body = decode_json(response).await?;
        body.get("accessToken")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ApiError::Decode("login response carries no accessToken".to_string()))
    }

    async fn available_slots(
        &self,
        business_id: &str,
        query: &SlotQuery,
    ) -> Result<Vec<SlotWindow>, ApiError> {
        let url = slots_url(&self.base_url, business_id, query);
        let response = Request::get(&url)
            .send()
            .await
            .map_err(|err| network_error(&err))?;
        if !response.ok() {
            return Err(server_error(response).await);
        }
        let body = decode_json(response).await?;
        Ok(extract_items(&body))
    }

    async fn providers(
        &self,
        business_id: &str,
        service_id: &str,
        limit: u32,
    ) -> Result<Vec<Provider>, ApiError> {
        let url = providers_url(&self.base_url, business_id, service_id, limit);
        let response = Request::get(&url)
            .send()
            .await
            .map_err(|err| network_error(&err))?;
        if !response.ok() {
            return Err(server_error(response).await);
        }
        let body = decode_json(response).await?;
        Ok(extract_items(&body))
    }

    async fn update_profile_phone(
        &self,
        token: &str,
        phone_number: &str,
    ) -> Result<(), ApiError> {
        let url = format!("{}/v1/users/update", self.base_url);
        let payload = json!({
            "phoneNumber": phone_number,
            "phoneNumbers": [],
            "addresses": [],
        });
        let response = Request::put(&url)
            .header("Authorization", &bearer(token))
            .json(&payload)
            .map_err(|err| network_error(&err))?
            .send()
            .await
            .map_err(|err| network_error(&err))?;
        if !response.ok() {
            return Err(server_error(response).await);
        }
        Ok(())
    }

    async fn confirm_phone(
        &self,
        token: &str,
        phone_number: &str,
        code: &str,
    ) -> Result<(), ApiError> {
        let url = format!("{}/v1/users/confirm/phone-number", self.base_url);
        let payload = json!({ "phoneNumber": phone_number, "code": code });
        let response = Request::put(&url)
            .header("Authorization", &bearer(token))
            .json(&payload)
            .map_err(|err| network_error(&err))?
            .send()
            .await
            .map_err(|err| network_error(&err))?;
        if !response.ok() {
            return Err(server_error(response).await);
        }
        Ok(())
    }

    async fn create_reservation(
        &self,
        token: &str,
        request: &ReservationRequest,
    ) -> Result<CheckoutReceipt, ApiError> {
        let url = format!("{}/v1/reservations", self.base_url);
        let response = Request::post(&url)
            .header("Authorization", &bearer(token))
            .json(request)
            .map_err(|err| network_error(&err))?
            .send()
            .await
            .map_err(|err| network_error(&err))?;
        if !response.ok() {
            return Err(server_error(response).await);
        }
        response
            .json::<CheckoutReceipt>()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn business(&self, business_id: &str) -> Result<Business, ApiError> {
        let url = business_url(&self.base_url, business_id);
        let response = Request::get(&url)
            .send()
            .await
            .map_err(|err| network_error(&err))?;
        if !response.ok() {
            return Err(server_error(response).await);
        }
        response
            .json::<Business>()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn eshop_checkout(
        &self,
        token: &str,
        request: &OrderRequest,
    ) -> Result<CheckoutReceipt, ApiError> {
        let url = orders_checkout_url(&self.base_url, &request.business_id);
        let response = Request::post(&url)
            .header("Authorization", &bearer(token))
            .json(request)
            .map_err(|err| network_error(&err))?
            .send()
            .await
            .map_err(|err| network_error(&err))?;
        if !response.ok() {
            return Err(server_error(response).await);
        }
        response
            .json::<CheckoutReceipt>()
            .await
            .map_err(|err| ApiError::Decode(err.to_string()))
    }
}
