//! # Checkout Session Builder
//!
//! Turns a cart selection into a provider-agnostic [`SessionRequest`],
//! applying the shop's pricing and shipping policy.
//!
//! ```text
//! OrderIntent ──► resolve price ──► base request (payment, urls, 1 item, notice)
//!                                        │
//!                     physical? ─────────┼──► shipping: US only, 3 fixed rates
//!                                        │
//!                                        └──► email prefill + metadata
//! ```

use crate::catalog::Catalog;
use crate::error::{ShopError, ShopResult};
use crate::order::{
    LineItem, OrderIntent, SessionRequest, ShippingPolicy, META_CUSTOMER_NAME, META_ORDER_NOTES,
    META_SELECTED_ITEM_NAME,
};
use crate::storefront::{Storefront, PROCESSING_NOTICE};
use tracing::debug;

/// Builds checkout session requests from order intents
#[derive(Debug, Clone, Copy)]
pub struct CheckoutSessionBuilder<'a> {
    storefront: &'a Storefront,
    catalog: &'a Catalog,
}

impl<'a> CheckoutSessionBuilder<'a> {
    pub fn new(storefront: &'a Storefront, catalog: &'a Catalog) -> Self {
        Self {
            storefront,
            catalog,
        }
    }

    /// Build the session request for one selection.
    ///
    /// Fails with [`ShopError::Validation`] when no price can be resolved.
    pub fn build(&self, intent: &OrderIntent) -> ShopResult<SessionRequest> {
        let price_id = self
            .catalog
            .resolve_price_id(&intent.price_id, &intent.selected_item_name)
            .ok_or_else(|| ShopError::Validation("Missing Stripe price id".to_string()))?;

        let is_digital = intent.is_digital();

        let mut request = SessionRequest::new(
            self.storefront.success_url_with_session(),
            self.storefront.cancel_url.clone(),
        );
        request.line_items.push(LineItem {
            price_id: price_id.to_string(),
            quantity: 1,
        });
        request.processing_notice = PROCESSING_NOTICE.to_string();

        if !is_digital {
            request.shipping = Some(ShippingPolicy {
                allowed_countries: vec![self.storefront.shipping_country.clone()],
                options: self.storefront.shipping_rates(),
            });
        }

        if !intent.customer_email.is_empty() {
            request.customer_email = Some(intent.customer_email.clone());
        }

        request.insert_metadata(META_CUSTOMER_NAME, &intent.customer_name);
        request.insert_metadata(META_SELECTED_ITEM_NAME, &intent.selected_item_name);
        request.insert_metadata(META_ORDER_NOTES, intent.truncated_notes());

        debug!(
            "Built checkout request: item={:?}, price={}, digital={}",
            intent.selected_item_name, price_id, is_digital
        );

        Ok(request)
    }
}
