//! # Request Handlers
//!
//! Axum request handlers for the checkout API.
//! Every error leaves as `{"error": "..."}` with the status from
//! [`ShopError::status_code`].

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use shop_core::{
    is_digital_item, CheckoutSessionBuilder, OrderIntent, SharedCheckoutProvider, ShopError,
};
use shop_stripe::{dispatch_webhook_event, verify_payload, StripeEvent};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// Header Stripe puts the webhook signature in
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Prefix of a checkout session id
const SESSION_ID_PREFIX: &str = "cs_";

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create checkout session request
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    /// Item the customer picked; decides price, shipping and fulfillment
    #[serde(default)]
    pub selected_item_name: Option<String>,
    #[serde(default)]
    pub order_notes: Option<String>,
    /// Explicit price id; only honored when it starts with `price_`
    #[serde(default)]
    pub price_id: Option<String>,
}

impl CreateCheckoutRequest {
    fn into_intent(self) -> OrderIntent {
        OrderIntent::new(self.selected_item_name.unwrap_or_default())
            .with_customer_name(self.customer_name.unwrap_or_default())
            .with_customer_email(self.customer_email.unwrap_or_default())
            .with_order_notes(self.order_notes.unwrap_or_default())
            .with_price_id(self.price_id.unwrap_or_default())
    }
}

/// Create checkout session response
#[derive(Debug, Serialize)]
pub struct CreateCheckoutResponse {
    /// Session ID
    pub id: String,
    /// Checkout URL (redirect user here)
    pub url: String,
}

/// Query for the session details endpoint
#[derive(Debug, Deserialize)]
pub struct SessionDetailsQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// What the success page needs to know about a finished checkout
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetailsResponse {
    pub paid: bool,
    pub item_name: String,
    pub is_digital: bool,
    /// Empty unless the item is digital and has a download link
    pub download_url: String,
}

/// Webhook acknowledgement
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn shop_error_to_response(err: ShopError) -> ApiError {
    if err.is_client_error() {
        warn!("Request rejected: {}", err);
    } else {
        error!("Request failed: {}", err);
    }

    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::new(err.to_string())))
}

fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

/// `cs_` followed by one or more ASCII letters, digits or underscores
fn is_valid_session_id(session_id: &str) -> bool {
    session_id
        .strip_prefix(SESSION_ID_PREFIX)
        .is_some_and(|rest| {
            !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
        })
}

fn require_checkout(state: &AppState) -> Result<&SharedCheckoutProvider, ApiError> {
    state.checkout.as_ref().ok_or_else(|| {
        shop_error_to_response(ShopError::Configuration(
            "Missing STRIPE_SECRET_KEY".to_string(),
        ))
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "ok": true,
        "service": "shop-checkout",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a hosted checkout session for one item
///
/// The body is taken raw so the secret check runs before any parsing.
#[instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreateCheckoutResponse>, ApiError> {
    let provider = require_checkout(&state)?;

    let request: CreateCheckoutRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejecting checkout request: {}", e);
        bad_request("Invalid JSON")
    })?;

    let intent = request.into_intent();

    let session_request = CheckoutSessionBuilder::new(&state.storefront, &state.catalog)
        .build(&intent)
        .map_err(shop_error_to_response)?;

    info!(
        "Creating checkout session: item={:?}, digital={}, provider={}",
        intent.selected_item_name,
        intent.is_digital(),
        provider.provider_name()
    );

    let session = provider
        .create_session(&session_request)
        .await
        .map_err(shop_error_to_response)?;

    info!("Checkout session created: {}", session.id);

    Ok(Json(CreateCheckoutResponse {
        id: session.id,
        url: session.url,
    }))
}

/// Look up a finished checkout for the success page
#[instrument(skip(state, query))]
pub async fn checkout_session_details(
    State(state): State<AppState>,
    Query(query): Query<SessionDetailsQuery>,
) -> Result<Json<SessionDetailsResponse>, ApiError> {
    let provider = require_checkout(&state)?;

    let session_id = query.session_id.as_deref().map(str::trim).unwrap_or_default();
    if !is_valid_session_id(session_id) {
        return Err(bad_request("Missing or invalid session_id"));
    }

    let session = provider
        .retrieve_session(session_id)
        .await
        .map_err(shop_error_to_response)?;

    let item_name = session.item_name().to_string();
    let is_digital = is_digital_item(&item_name);
    let download_url = if is_digital {
        state
            .catalog
            .resolve_download_url(&item_name)
            .unwrap_or_default()
            .to_string()
    } else {
        String::new()
    };

    Ok(Json(SessionDetailsResponse {
        paid: session.is_paid(),
        item_name,
        is_digital,
        download_url,
    }))
}

/// Stripe webhook endpoint
///
/// Answers 200 once the delivery is authentic and parseable; fulfillment
/// results are only logged.
#[instrument(skip(state, headers, body), fields(body_len = body.len()))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let secret = state.webhook_secret.as_deref().ok_or_else(|| {
        shop_error_to_response(ShopError::Configuration(
            "Missing STRIPE_WEBHOOK_SECRET".to_string(),
        ))
    })?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| bad_request("Missing stripe-signature header"))?;

    let payload = verify_payload(&body, signature, secret).map_err(|e| {
        warn!("Webhook signature rejected: {}", e);
        bad_request("Invalid webhook signature")
    })?;

    let event = StripeEvent::parse(payload).map_err(|e| {
        warn!("Webhook payload rejected: {}", e);
        bad_request("Invalid webhook payload")
    })?;

    let dispatched = dispatch_webhook_event(state.fulfillment.as_ref(), &event).await;
    debug!("Webhook {} dispatched: {:?}", event.id, dispatched);

    Ok(Json(WebhookResponse { received: true }))
}

/// Fallback for unknown paths
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response() {
        let err = ErrorResponse::new("Test error");
        assert_eq!(err.error, "Test error");
    }

    #[test]
    fn test_shop_error_conversion() {
        let (status, Json(body)) =
            shop_error_to_response(ShopError::Validation("Missing Stripe price id".to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "Missing Stripe price id");

        let (status, _) =
            shop_error_to_response(ShopError::Configuration("Missing STRIPE_SECRET_KEY".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_session_id_validation() {
        assert!(is_valid_session_id("cs_test_a1B2c3"));
        assert!(is_valid_session_id("cs_live_123"));

        for bad in ["", "cs_", "pi_123", "cs_x/../customers/cus_1", "cs_a%2Fb", "cs_a b", "cs_a.b"] {
            assert!(!is_valid_session_id(bad), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_request_into_intent_trims() {
        let request: CreateCheckoutRequest = serde_json::from_str(
            r#"{"customerName":" Ada ","selectedItemName":" Birthday Card (PDF Download) ","priceId":""}"#,
        )
        .unwrap();

        let intent = request.into_intent();
        assert_eq!(intent.customer_name, "Ada");
        assert_eq!(intent.selected_item_name, "Birthday Card (PDF Download)");
        assert!(intent.is_digital());
    }
}
