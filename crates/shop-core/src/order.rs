//! # Order Types
//!
//! Order intent and checkout session types for the storefront.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Metadata key carrying the customer's name
pub const META_CUSTOMER_NAME: &str = "customer_name";
/// Metadata key carrying the purchased item's name (read back at fulfillment)
pub const META_SELECTED_ITEM_NAME: &str = "selected_item_name";
/// Metadata key carrying the free-text order notes
pub const META_ORDER_NOTES: &str = "order_notes";

/// Order notes longer than this are cut before leaving the service
pub const MAX_ORDER_NOTES_CHARS: usize = 450;

const DIGITAL_MARKER: &str = "pdf download";

/// Returns true if the item name denotes a digital (PDF download) good.
pub fn is_digital_item(item_name: &str) -> bool {
    item_name.to_lowercase().contains(DIGITAL_MARKER)
}

/// Cut `value` to at most `max_chars` characters.
pub fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// A single cart selection, as sent by the storefront.
///
/// Text fields are trimmed on construction. Whether the item is digital is
/// always derived from the item name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderIntent {
    pub customer_name: String,
    pub customer_email: String,
    pub selected_item_name: String,
    pub order_notes: String,
    pub price_id: String,
}

impl OrderIntent {
    /// Create an intent for an item, trimming the name
    pub fn new(selected_item_name: impl AsRef<str>) -> Self {
        Self {
            selected_item_name: selected_item_name.as_ref().trim().to_string(),
            ..Default::default()
        }
    }

    /// Builder: set customer name
    pub fn with_customer_name(mut self, name: impl AsRef<str>) -> Self {
        self.customer_name = name.as_ref().trim().to_string();
        self
    }

    /// Builder: set customer email
    pub fn with_customer_email(mut self, email: impl AsRef<str>) -> Self {
        self.customer_email = email.as_ref().trim().to_string();
        self
    }

    /// Builder: set order notes
    pub fn with_order_notes(mut self, notes: impl AsRef<str>) -> Self {
        self.order_notes = notes.as_ref().trim().to_string();
        self
    }

    /// Builder: set explicit price id
    pub fn with_price_id(mut self, price_id: impl AsRef<str>) -> Self {
        self.price_id = price_id.as_ref().trim().to_string();
        self
    }

    /// Whether the selected item is a digital download
    pub fn is_digital(&self) -> bool {
        is_digital_item(&self.selected_item_name)
    }

    /// Order notes as forwarded in session metadata
    pub fn truncated_notes(&self) -> &str {
        truncate_chars(&self.order_notes, MAX_ORDER_NOTES_CHARS)
    }
}

/// Checkout mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMode {
    /// One-time payment
    #[default]
    Payment,
}

impl CheckoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutMode::Payment => "payment",
        }
    }
}

/// A line item referencing a provider price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Provider price identifier (price_...)
    pub price_id: String,
    pub quantity: u32,
}

/// A fixed-amount shipping rate offered at checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRate {
    /// Amount in minor currency units (cents)
    pub amount: i64,
    /// ISO 4217 code, lowercase
    pub currency: String,
    pub display_name: String,
}

impl ShippingRate {
    pub fn fixed(amount: i64, currency: &str, display_name: &str) -> Self {
        Self {
            amount,
            currency: currency.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

/// Shipping collection attached to physical orders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    pub allowed_countries: Vec<String>,
    pub options: Vec<ShippingRate>,
}

/// A provider-agnostic request to open a hosted checkout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub mode: CheckoutMode,
    /// Contains the provider's session-id placeholder
    pub success_url: String,
    pub cancel_url: String,
    pub line_items: Vec<LineItem>,
    /// Present only for physical goods
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<ShippingPolicy>,
    /// Processing-time notice shown to the customer
    pub processing_notice: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    /// Sent as Idempotency-Key
    pub idempotency_key: String,
}

impl SessionRequest {
    /// Create a payment-mode request with a fresh idempotency key
    pub fn new(success_url: impl Into<String>, cancel_url: impl Into<String>) -> Self {
        Self {
            mode: CheckoutMode::Payment,
            success_url: success_url.into(),
            cancel_url: cancel_url.into(),
            line_items: Vec::new(),
            shipping: None,
            processing_notice: String::new(),
            customer_email: None,
            metadata: BTreeMap::new(),
            idempotency_key: Uuid::new_v4().to_string(),
        }
    }

    /// Whether a shipping address will be collected
    pub fn collects_shipping(&self) -> bool {
        self.shipping.is_some()
    }

    /// Insert a metadata entry only when the value is non-empty
    pub fn insert_metadata(&mut self, key: &str, value: &str) {
        if !value.is_empty() {
            self.metadata.insert(key.to_string(), value.to_string());
        }
    }
}

/// Session returned by the provider after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedSession {
    pub id: String,
    pub url: String,
}

/// A checkout session fetched back from the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedSession {
    pub id: String,
    #[serde(default)]
    pub payment_status: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl RetrievedSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }

    /// Item name carried in metadata, trimmed
    pub fn item_name(&self) -> &str {
        self.metadata
            .get(META_SELECTED_ITEM_NAME)
            .map(|s| s.trim())
            .unwrap_or_default()
    }
}
