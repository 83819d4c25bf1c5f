use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info, instrument};

use super::Notifier;
use crate::config::Discord;

/// Body of a Discord webhook execution
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub content: String,
}

/// Posts notifications to a Discord webhook
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    client: Client,
    discord: Discord,
}

impl DiscordNotifier {
    pub fn new(discord: Discord) -> Self {
        Self::with_client(discord, super::http_client())
    }

    pub fn with_client(discord: Discord, client: Client) -> Self {
        Self { client, discord }
    }

    /// Message text, with the configured user mentioned at the end
    pub fn build_message(&self, text: &str) -> Message {
        let content = match &self.discord.user_id {
            Some(user_id) => format!("{text} <@{user_id}>"),
            None => text.to_string(),
        };

        Message { content }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    #[instrument(skip(self, message))]
    async fn send(&self, message: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.discord.url)
            .json(&self.build_message(message))
            .send()
            .await
            .context("failed to send Discord message")?;

        let status = response.status();
        if !status.is_success() {
            if let Ok(error_text) = response.text().await {
                error!("Discord API error response: {}", error_text);
            }
            anyhow::bail!("Discord message failed with status: {}", status);
        }

        info!("Successfully sent Discord message");
        Ok(())
    }
}
