use crate::error::{AppError, Result};
use crate::models::NotificationMessage;
use crate::notifications::NotificationSender;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Posts notification messages as JSON to an HTTP endpoint
#[derive(Clone)]
pub struct WebhookSender {
    pub(crate) client: Client,
    pub(crate) url: String,
    pub(crate) timeout_secs: u64,
}

impl WebhookSender {
    /// Create a new webhook sender
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout_secs,
        })
    }

    /// Send HTTP POST request to the webhook URL
    async fn post(&self, payload: &NotificationMessage) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .header("User-Agent", concat!("incident-service/", env!("CARGO_PKG_VERSION")))
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout(format!(
                        "Notification request timed out after {} seconds",
                        self.timeout_secs
                    ))
                } else if e.is_connect() {
                    AppError::Network(format!("Failed to connect to notification service: {}", e))
                } else {
                    AppError::Network(format!("Notification request failed: {}", e))
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(AppError::Network(format!(
                "Notification service returned non-success status {}: {}",
                status,
                if body.is_empty() {
                    "No response body"
                } else {
                    &body
                }
            )));
        }

        Ok(body)
    }
}

#[async_trait]
impl NotificationSender for WebhookSender {
    async fn send(&self, message: &NotificationMessage) -> Result<()> {
        self.post(message).await.map(|_| ())
    }

    fn destination(&self) -> &str {
        &self.url
    }
}
