//! # Resend Mailer
//!
//! Sends HTML email through the Resend `POST /emails` API.

use crate::config::ResendConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shop_core::{Email, Mailer, ShopError, ShopResult};
use tracing::{error, info, instrument};

const PROVIDER: &str = "resend";

/// Resend-backed [`Mailer`]
pub struct ResendMailer {
    config: ResendConfig,
    client: Client,
}

impl ResendMailer {
    /// Create a new Resend mailer
    pub fn new(config: ResendConfig) -> ShopResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ShopError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    #[instrument(skip(self, email), fields(recipients = email.to.len()))]
    async fn send(&self, email: &Email) -> ShopResult<String> {
        let payload = ResendEmailRequest {
            from: &email.from,
            to: &email.to,
            subject: &email.subject,
            html: &email.html,
        };

        let url = format!("{}/emails", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .json(&payload)
            .send()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::Network(e.to_string()))?;

        if !status.is_success() {
            error!("Resend API error: status={}, body={}", status, body);
            return Err(ShopError::provider(
                PROVIDER,
                format!("Resend send failed ({}): {}", status.as_u16(), body),
            ));
        }

        let sent: ResendEmailResponse = serde_json::from_str(&body).unwrap_or_default();

        info!("Resend accepted email: id={}", sent.id);

        Ok(sent.id)
    }

    fn from_address(&self) -> &str {
        &self.config.from_email
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Resend API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct ResendEmailRequest<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ResendEmailResponse {
    #[serde(default)]
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn email() -> Email {
        Email::new("shop@example.com", "ada@example.com", "Your download").html("<p>hello</p>")
    }

    #[tokio::test]
    async fn test_send_posts_json() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_test"))
            .and(body_partial_json(json!({
                "from": "shop@example.com",
                "to": ["ada@example.com"],
                "subject": "Your download",
                "html": "<p>hello</p>"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "email_123" })))
            .expect(1)
            .mount(&server)
            .await;

        let config = ResendConfig::new("re_test", "shop@example.com").with_api_base_url(server.uri());
        let mailer = ResendMailer::new(config).unwrap();

        assert_eq!(mailer.send(&email()).await.unwrap(), "email_123");
        assert_eq!(mailer.from_address(), "shop@example.com");
    }

    #[tokio::test]
    async fn test_send_failure_is_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid from"))
            .mount(&server)
            .await;

        let config = ResendConfig::new("re_test", "shop@example.com").with_api_base_url(server.uri());
        let mailer = ResendMailer::new(config).unwrap();

        let err = mailer.send(&email()).await.unwrap_err();
        assert!(matches!(err, ShopError::ProviderError { .. }));
        assert_eq!(err.to_string(), "Resend send failed (422): invalid from");
    }
}
