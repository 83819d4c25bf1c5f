use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use tracing::{info, instrument};

use super::Notifier;
use crate::config::Webhook;

/// Posts `{"message": ..., "timestamp": ...}` to a generic webhook
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    webhook: Webhook,
}

impl WebhookNotifier {
    pub fn new(webhook: Webhook) -> Self {
        Self::with_client(webhook, super::http_client())
    }

    pub fn with_client(webhook: Webhook, client: Client) -> Self {
        Self { client, webhook }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip(self, message))]
    async fn send(&self, message: &str) -> Result<()> {
        let payload = json!({
            "message": message,
            "timestamp": Utc::now().to_rfc3339()
        });

        let response = self
            .client
            .post(&self.webhook.url)
            .json(&payload)
            .send()
            .await
            .context("failed to send webhook notification")?;

        if !response.status().is_success() {
            anyhow::bail!("Webhook notification failed with status: {}", response.status());
        }

        info!("Successfully sent webhook notification");
        Ok(())
    }
}
