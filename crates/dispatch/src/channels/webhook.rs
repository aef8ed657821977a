//! Webhook delivery via HTTP POST.
//!
//! [`WebhookChannel`] posts a JSON payload describing the notification to a
//! configured endpoint. A single attempt is made per delivery — retrying
//! against the transport is deliberately out of scope — and any HTTP error
//! or non-2xx status is reduced to `false` per the channel contract.

use std::time::Duration;

use crate::channel::{ChannelHandler, DeliveryRequest};

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// WebhookConfig
// ---------------------------------------------------------------------------

/// Configuration for the webhook channel.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Endpoint that receives the JSON payload.
    pub endpoint: String,
}

impl WebhookConfig {
    /// Load configuration from the `WEBHOOK_URL` environment variable.
    ///
    /// Returns `None` when unset, signalling that the webhook channel is
    /// not configured and should not be registered.
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var("WEBHOOK_URL").ok()?;
        Some(Self { endpoint })
    }
}

// ---------------------------------------------------------------------------
// WebhookChannel
// ---------------------------------------------------------------------------

/// HTTP POST delivery channel.
pub struct WebhookChannel {
    client: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookChannel {
    /// Create the channel with a pre-configured HTTP client.
    ///
    /// Panics only if the TLS backend cannot be initialized, which is fatal
    /// at bootstrap anyway.
    pub fn new(config: WebhookConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }
}

#[async_trait::async_trait]
impl ChannelHandler for WebhookChannel {
    fn name(&self) -> &'static str {
        courier_core::channels::CHANNEL_WEBHOOK
    }

    fn display_name(&self) -> &'static str {
        "Webhook"
    }

    fn description(&self) -> Option<&'static str> {
        Some("POST to an external HTTP endpoint")
    }

    async fn deliver(&self, request: &DeliveryRequest<'_>) -> bool {
        let payload = serde_json::json!({
            "user_id": request.user.id,
            "username": request.user.username,
            "notification": request.notification.name,
            "message": request.message,
            "path": request.path,
            "context": request.context,
        });

        let response = match self.client.post(&self.config.endpoint).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    endpoint = %self.config.endpoint,
                    notification = %request.notification.name,
                    error = %e,
                    "Webhook delivery failed"
                );
                return false;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                endpoint = %self.config.endpoint,
                notification = %request.notification.name,
                status = response.status().as_u16(),
                "Webhook returned non-success status"
            );
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_webhook_url() {
        std::env::remove_var("WEBHOOK_URL");
        assert!(WebhookConfig::from_env().is_none());
    }

    #[test]
    fn new_does_not_panic() {
        let _channel = WebhookChannel::new(WebhookConfig {
            endpoint: "http://localhost:9/hooks".into(),
        });
    }
}
