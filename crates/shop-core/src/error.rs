//! # Shop Error Types
//!
//! Typed error handling for the checkout service.
//! All fallible operations return `Result<T, ShopError>`.

use thiserror::Error;

/// Core error type for checkout, webhook and fulfillment operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// A required secret or credential is not configured
    #[error("{0}")]
    Configuration(String),

    /// Malformed input, unresolved price, invalid session id
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid webhook signature, stale timestamp
    #[error("{0}")]
    Authentication(String),

    /// Downstream provider answered with a non-success status
    #[error("{message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with a provider
    #[error("Network error: {0}")]
    Network(String),

    /// Provider response could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Digital fulfillment failed; logged, never surfaced to a client
    #[error("Fulfillment error: {0}")]
    Fulfillment(String),
}

impl ShopError {
    /// Shorthand for a provider error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ShopError::ProviderError {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::Configuration(_) => 500,
            ShopError::Validation(_) => 400,
            ShopError::Authentication(_) => 400,
            ShopError::ProviderError { .. } => 400,
            ShopError::Network(_) => 500,
            ShopError::Serialization(_) => 500,
            ShopError::Fulfillment(_) => 500,
        }
    }

    /// Whether the error is a client-side problem
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

/// Result type alias for shop operations
pub type ShopResult<T> = Result<T, ShopError>;
