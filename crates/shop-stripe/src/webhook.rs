//! # Stripe Webhook Handling
//!
//! Parsing and dispatch of verified Stripe events.
//!
//! ```text
//! Unverified ──verify──► VerifiedPayload ──parse──► StripeEvent ──dispatch──► WebhookHandler
//! ```
//!
//! Only [`VerifiedPayload`] can be parsed, so a body is never interpreted
//! before its signature has been checked.

use crate::signature::VerifiedPayload;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use shop_core::{FulfillmentOutcome, ShopError, ShopResult, META_SELECTED_ITEM_NAME};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// `object` tag Stripe puts on checkout session objects
pub const CHECKOUT_SESSION_OBJECT: &str = "checkout.session";

/// Event kinds this service reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// `checkout.session.completed`; the raw `data.object`
    CheckoutSessionCompleted(serde_json::Value),
    /// `checkout.session.async_payment_succeeded`
    AsyncPaymentSucceeded,
    /// `checkout.session.async_payment_failed`
    AsyncPaymentFailed,
    /// Any other event type
    Ignored,
}

/// A verified, parsed Stripe event
#[derive(Debug, Clone, PartialEq)]
pub struct StripeEvent {
    pub id: String,
    pub event_type: String,
    pub kind: EventKind,
}

impl StripeEvent {
    /// Parse a verified payload.
    ///
    /// Fails only when the body is not JSON. Fields that are missing or of an
    /// unexpected type read as empty, which maps to [`EventKind::Ignored`].
    pub fn parse(payload: VerifiedPayload<'_>) -> ShopResult<Self> {
        let envelope: Value = serde_json::from_slice(payload.body())
            .map_err(|e| ShopError::Validation(format!("Invalid webhook payload: {}", e)))?;

        let text = |key: &str| {
            envelope
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let id = text("id");
        let event_type = text("type");

        let kind = match event_type.as_str() {
            "checkout.session.completed" => EventKind::CheckoutSessionCompleted(
                envelope
                    .get("data")
                    .and_then(|data| data.get("object"))
                    .cloned()
                    .unwrap_or_default(),
            ),
            "checkout.session.async_payment_succeeded" => EventKind::AsyncPaymentSucceeded,
            "checkout.session.async_payment_failed" => EventKind::AsyncPaymentFailed,
            _ => EventKind::Ignored,
        };

        Ok(Self {
            id,
            event_type,
            kind,
        })
    }
}

/// The fields of a checkout session object used for fulfillment
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CheckoutSessionObject {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default, deserialize_with = "string_values")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub customer_email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

impl CheckoutSessionObject {
    /// Interpret an event's `data.object`.
    ///
    /// Returns `None` unless it is an object tagged `checkout.session`.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let session: Self = serde_json::from_value(value.clone()).ok()?;
        (session.object == CHECKOUT_SESSION_OBJECT).then_some(session)
    }

    /// Item name carried in metadata, trimmed
    pub fn item_name(&self) -> &str {
        self.metadata
            .get(META_SELECTED_ITEM_NAME)
            .map(|s| s.trim())
            .unwrap_or_default()
    }

    /// Customer email from `customer_details`, falling back to `customer_email`
    pub fn customer_email(&self) -> &str {
        let details = self
            .customer_details
            .as_ref()
            .and_then(|d| d.email.as_deref())
            .filter(|e| !e.is_empty());
        details
            .or(self.customer_email.as_deref())
            .map(str::trim)
            .unwrap_or_default()
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }
}

/// Webhook event handler trait
///
/// Implement this trait to react to events. Every method's outcome is
/// acknowledged to Stripe; it only decides what gets logged.
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    /// Called when a checkout session is completed
    async fn on_checkout_completed(
        &self,
        event_id: &str,
        object: &serde_json::Value,
    ) -> FulfillmentOutcome;

    /// Called when a delayed payment method settles
    async fn on_async_payment(&self, event: &StripeEvent, succeeded: bool) {
        info!(
            "Stripe webhook event: {} {} (succeeded={})",
            event.event_type, event.id, succeeded
        );
    }

    /// Called for event types this service does not handle
    async fn on_ignored(&self, event: &StripeEvent) {
        debug!("Ignoring Stripe webhook event: {} {}", event.event_type, event.id);
    }
}

/// What dispatching an event did
#[derive(Debug)]
pub enum Dispatched {
    /// A completed session went through fulfillment
    Fulfillment(FulfillmentOutcome),
    /// Known event, nothing to do beyond logging
    Acknowledged,
    /// Unknown event type
    Ignored,
}

/// Dispatch a parsed event to the appropriate handler method
pub async fn dispatch_webhook_event(handler: &dyn WebhookHandler, event: &StripeEvent) -> Dispatched {
    match &event.kind {
        EventKind::CheckoutSessionCompleted(object) => {
            info!("Stripe webhook event: {} {}", event.event_type, event.id);
            Dispatched::Fulfillment(handler.on_checkout_completed(&event.id, object).await)
        }
        EventKind::AsyncPaymentSucceeded => {
            handler.on_async_payment(event, true).await;
            Dispatched::Acknowledged
        }
        EventKind::AsyncPaymentFailed => {
            handler.on_async_payment(event, false).await;
            Dispatched::Acknowledged
        }
        EventKind::Ignored => {
            handler.on_ignored(event).await;
            Dispatched::Ignored
        }
    }
}

/// Events that should be enabled in the Stripe Dashboard for this endpoint
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &[
    "checkout.session.completed",
    "checkout.session.async_payment_succeeded",
    "checkout.session.async_payment_failed",
];

/// Keep only string-valued metadata entries; tolerate `null`.
fn string_values<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
        .collect())
}
