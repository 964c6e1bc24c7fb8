//! HTTP wish-gateway transport
//!
//! Implements the outbound send capability against a message gateway that
//! schedules delivery at a wall-clock time in the reference timezone. The
//! gateway itself (WhatsApp bridge or similar) is an external collaborator.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};
use wishbot_core::WishTransport;
use wishbot_domain::{Result, TransportConfig, WallClock, WishBotError};

const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Outbound message request body
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    phone: &'a str,
    body: &'a str,
    hour: u32,
    minute: u32,
}

/// Reqwest-backed wish transport
pub struct HttpWishTransport {
    client: Client,
    gateway_url: String,
    access_token: String,
}

impl std::fmt::Debug for HttpWishTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpWishTransport")
            .field("gateway_url", &self.gateway_url)
            .finish_non_exhaustive()
    }
}

impl HttpWishTransport {
    /// Create a transport from configuration.
    ///
    /// # Errors
    /// `WishBotError::MissingCredentials` when no access token is
    /// configured; `WishBotError::Internal` when the HTTP client cannot be
    /// built.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let access_token = config.access_token.clone().ok_or_else(|| {
            WishBotError::MissingCredentials("Missing credentials for API access.".into())
        })?;

        let client = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|e| WishBotError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            gateway_url: config.gateway_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }
}

#[async_trait]
impl WishTransport for HttpWishTransport {
    async fn send(&self, phone: &str, body: &str, send_at: WallClock) -> Result<()> {
        let url = format!("{}/messages", self.gateway_url);
        let request =
            SendRequest { phone, body, hour: send_at.hour, minute: send_at.minute };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                WishBotError::DeliveryFailed(format!("Gateway request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            warn!(%status, "gateway rejected message");
            return Err(WishBotError::DeliveryFailed(format!(
                "Gateway error ({}): {}",
                status, detail
            )));
        }

        debug!(send_at = %send_at, "message accepted by gateway");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_is_missing_credentials() {
        let config =
            TransportConfig { gateway_url: "http://localhost:8787".into(), access_token: None };
        let err = HttpWishTransport::new(&config).unwrap_err();
        assert!(matches!(err, WishBotError::MissingCredentials(_)));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = TransportConfig {
            gateway_url: "http://localhost:8787/".into(),
            access_token: Some("token".into()),
        };
        let transport = HttpWishTransport::new(&config).unwrap();
        assert_eq!(transport.gateway_url, "http://localhost:8787");
    }
}
