//! # Storefront Configuration
//!
//! Branding, redirect URLs and shipping policy for the shop.

use crate::order::ShippingRate;
use serde::{Deserialize, Serialize};

/// Placeholder the checkout provider substitutes with the session id
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// Shown to customers while they enter a shipping address
pub const PROCESSING_NOTICE: &str = "Please allow 3-5 calendar days for processing before the item ships unless Rush Processing is selected at checkout.";

/// Fixed shipping rates offered on physical orders, in cents
pub const STANDARD_SHIPPING: (i64, &str) = (0, "Standard Shipping (3–5 business days)");
pub const PRIORITY_SHIPPING: (i64, &str) = (499, "Priority Shipping (2-3 business days)");
pub const RUSH_SHIPPING: (i64, &str) = (1999, "Rush Processing (24 hours) + Priority Shipping");

/// Storefront settings shared by checkout and fulfillment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storefront {
    /// Display name used in customer emails
    pub name: String,

    /// URL to redirect after successful payment
    pub success_url: String,

    /// URL to redirect if customer cancels
    pub cancel_url: String,

    /// Support address shown in fulfillment emails
    #[serde(default)]
    pub support_email: Option<String>,

    /// Country shipping addresses are restricted to
    pub shipping_country: String,

    /// Currency for shipping rates
    pub currency: String,
}

impl Default for Storefront {
    fn default() -> Self {
        Self {
            name: "Florence Mae Gifts".to_string(),
            success_url: format!(
                "https://www.florencemaegifts.com/index.html?checkout=success&session_id={}",
                SESSION_ID_PLACEHOLDER
            ),
            cancel_url: "https://www.florencemaegifts.com/index.html".to_string(),
            support_email: None,
            shipping_country: "US".to_string(),
            currency: "usd".to_string(),
        }
    }
}

impl Storefront {
    /// Create a storefront with the default policy
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: set success URL
    pub fn with_success_url(mut self, url: impl Into<String>) -> Self {
        self.success_url = url.into();
        self
    }

    /// Builder: set cancel URL
    pub fn with_cancel_url(mut self, url: impl Into<String>) -> Self {
        self.cancel_url = url.into();
        self
    }

    /// Builder: set support email
    pub fn with_support_email(mut self, email: impl Into<String>) -> Self {
        self.support_email = Some(email.into());
        self
    }

    /// Get the success URL with the session_id placeholder for Stripe
    pub fn success_url_with_session(&self) -> String {
        if self.success_url.contains(SESSION_ID_PLACEHOLDER) {
            self.success_url.clone()
        } else if self.success_url.contains('?') {
            format!("{}&session_id={}", self.success_url, SESSION_ID_PLACEHOLDER)
        } else {
            format!("{}?session_id={}", self.success_url, SESSION_ID_PLACEHOLDER)
        }
    }

    /// The three shipping rates offered on physical orders
    pub fn shipping_rates(&self) -> Vec<ShippingRate> {
        [STANDARD_SHIPPING, PRIORITY_SHIPPING, RUSH_SHIPPING]
            .into_iter()
            .map(|(amount, name)| ShippingRate::fixed(amount, &self.currency, name))
            .collect()
    }
}
