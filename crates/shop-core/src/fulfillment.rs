//! # Fulfillment Outcomes
//!
//! Result of attempting to deliver a digital purchase. Every outcome is
//! acknowledged to the payment provider; the variants only differ in how
//! they are logged.

use crate::error::ShopError;
use std::fmt;

/// Why a completed session did not produce an email
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Email provider credentials are absent
    MailerNotConfigured,
    /// Event object is not a checkout session
    NotACheckoutSession,
    /// Metadata carries no item name
    MissingItemName,
    /// Item has no download URL (physical goods land here)
    NoDownloadForItem,
    /// No customer email on the session
    MissingCustomerEmail,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::MailerNotConfigured => "mailer not configured",
            SkipReason::NotACheckoutSession => "object is not a checkout session",
            SkipReason::MissingItemName => "no item name in metadata",
            SkipReason::NoDownloadForItem => "no download link for item",
            SkipReason::MissingCustomerEmail => "no customer email",
        };
        f.write_str(reason)
    }
}

/// Outcome of one fulfillment attempt
#[derive(Debug)]
pub enum FulfillmentOutcome {
    /// Download email accepted by the mailer
    Sent { to: String, message_id: String },
    /// A precondition was not met; nothing was sent
    Skipped(SkipReason),
    /// Sending was attempted and failed
    Failed(ShopError),
}

impl FulfillmentOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, FulfillmentOutcome::Sent { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, FulfillmentOutcome::Failed(_))
    }
}
