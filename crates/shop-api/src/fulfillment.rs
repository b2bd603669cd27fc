//! # Digital Fulfillment
//!
//! Emails the download link for a completed checkout of a digital item.
//! Never fails the webhook: every path ends in a [`FulfillmentOutcome`].

use async_trait::async_trait;
use shop_core::{Catalog, Email, FulfillmentOutcome, SharedMailer, SkipReason, Storefront};
use shop_stripe::{CheckoutSessionObject, WebhookHandler};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Sends download emails for completed checkout sessions
pub struct FulfillmentEmailer {
    mailer: Option<SharedMailer>,
    catalog: Arc<Catalog>,
    storefront: Arc<Storefront>,
}

impl FulfillmentEmailer {
    pub fn new(mailer: Option<SharedMailer>, catalog: Arc<Catalog>, storefront: Arc<Storefront>) -> Self {
        Self {
            mailer,
            catalog,
            storefront,
        }
    }

    /// Whether a mailer is available
    pub fn is_configured(&self) -> bool {
        self.mailer.is_some()
    }

    /// Send the download email if every precondition holds.
    ///
    /// `session` is the event's raw `data.object`. At most one email is sent.
    #[instrument(skip(self, session))]
    pub async fn maybe_send(&self, session: &serde_json::Value) -> FulfillmentOutcome {
        let Some(mailer) = &self.mailer else {
            return FulfillmentOutcome::Skipped(SkipReason::MailerNotConfigured);
        };

        let Some(session) = CheckoutSessionObject::from_value(session) else {
            return FulfillmentOutcome::Skipped(SkipReason::NotACheckoutSession);
        };

        let item_name = session.item_name();
        if item_name.is_empty() {
            return FulfillmentOutcome::Skipped(SkipReason::MissingItemName);
        }

        let Some(download_url) = self.catalog.resolve_download_url(item_name) else {
            return FulfillmentOutcome::Skipped(SkipReason::NoDownloadForItem);
        };

        let to = session.customer_email();
        if to.is_empty() {
            return FulfillmentOutcome::Skipped(SkipReason::MissingCustomerEmail);
        }

        let from = mailer.from_address();
        let support_email = self.storefront.support_email.as_deref().unwrap_or(from);

        let email = Email::new(
            from,
            to,
            format!("Your {} download: {}", self.storefront.name, item_name),
        )
        .html(render_download_email(
            item_name,
            download_url,
            &session.id,
            support_email,
        ));

        match mailer.send(&email).await {
            Ok(message_id) => FulfillmentOutcome::Sent {
                to: to.to_string(),
                message_id,
            },
            Err(e) => FulfillmentOutcome::Failed(e),
        }
    }
}

#[async_trait]
impl WebhookHandler for FulfillmentEmailer {
    async fn on_checkout_completed(
        &self,
        event_id: &str,
        object: &serde_json::Value,
    ) -> FulfillmentOutcome {
        let outcome = self.maybe_send(object).await;

        match &outcome {
            FulfillmentOutcome::Sent { to, message_id } => {
                info!("Sent download email for {} to {} ({})", event_id, to, message_id)
            }
            FulfillmentOutcome::Skipped(SkipReason::NoDownloadForItem) => {
                info!("No download email for {}: {}", event_id, SkipReason::NoDownloadForItem)
            }
            FulfillmentOutcome::Skipped(reason) => {
                warn!("Skipped download email for {}: {}", event_id, reason)
            }
            FulfillmentOutcome::Failed(e) => {
                error!("Download email failed for {}: {}", event_id, e)
            }
        }

        outcome
    }
}

/// Escape text for interpolation into HTML content or attribute values
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render the download email body. All interpolated values are escaped.
pub fn render_download_email(
    item_name: &str,
    download_url: &str,
    session_id: &str,
    support_email: &str,
) -> String {
    let item_name = escape_html(item_name);
    let download_url = escape_html(download_url);

    let order_reference = if session_id.is_empty() {
        String::new()
    } else {
        format!(
            r#"<p style="font-size:12px;color:#666;">Order reference: {}</p>"#,
            escape_html(session_id)
        )
    };

    format!(
        r#"<div style="font-family:Arial,sans-serif;line-height:1.5;color:#111;max-width:640px;margin:0 auto;">
  <h2 style="margin:0 0 12px 0;">Thank you for your purchase 💖</h2>
  <p>Your digital download is ready:</p>
  <p><strong>{item_name}</strong></p>
  <p style="margin:18px 0;">
    <a href="{download_url}" style="background:#FE6666;color:#fff;text-decoration:none;padding:10px 16px;border-radius:6px;display:inline-block;">Download your file</a>
  </p>
  <p style="font-size:13px;color:#444;">If the button doesn't work, copy and paste this link into your browser:</p>
  <p style="font-size:13px;word-break:break-all;"><a href="{download_url}">{download_url}</a></p>
  {order_reference}
  <p style="font-size:12px;color:#666;">Need help? Reply to this email or contact {support_email}.</p>
</div>"#,
        support_email = escape_html(support_email),
    )
}
