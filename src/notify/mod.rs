//! Status-change notifications
//!
//! The sweep only needs "send this text somewhere". [`Notifier`] is that
//! capability; [`NotificationSender`] fans a message out to every configured
//! channel (Discord, generic webhook).

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error, instrument};

use crate::config::NotificationChannel;

pub mod discord;
pub mod webhook;

pub use discord::DiscordNotifier;
pub use webhook::WebhookNotifier;

/// Template used when none is configured
pub const DEFAULT_TEMPLATE: &str = "The server !name is now !status!";

/// Timeout for a single delivery attempt
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// A channel that accepts plain text messages
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
}

/// Substitute `!name` and `!status` in `template`
pub fn render_message(template: &str, host_name: &str, status: &str) -> String {
    template
        .replace("!name", host_name)
        .replace("!status", status)
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(SEND_TIMEOUT)
        .build()
        .expect("Failed to build HTTP client")
}

/// Sends every message to all configured channels
#[derive(Default)]
pub struct NotificationSender {
    channels: Vec<Box<dyn Notifier>>,
}

impl NotificationSender {
    pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self {
        Self { channels }
    }

    pub fn from_config(channels: &[NotificationChannel]) -> Self {
        let client = http_client();

        let channels = channels
            .iter()
            .map(|channel| -> Box<dyn Notifier> {
                match channel {
                    NotificationChannel::Discord(discord) => Box::new(
                        DiscordNotifier::with_client(discord.clone(), client.clone()),
                    ),
                    NotificationChannel::Webhook(webhook) => Box::new(
                        WebhookNotifier::with_client(webhook.clone(), client.clone()),
                    ),
                }
            })
            .collect();

        Self { channels }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[async_trait]
impl Notifier for NotificationSender {
    /// Deliver to every channel; fails if at least one channel failed
    #[instrument(skip(self, message), fields(channels = self.channels.len()))]
    async fn send(&self, message: &str) -> Result<()> {
        if self.channels.is_empty() {
            debug!("no notification channels configured, dropping: {message}");
            return Ok(());
        }

        let mut failed = 0;
        for channel in &self.channels {
            if let Err(e) = channel.send(message).await {
                error!("notification channel failed: {e:#}");
                failed += 1;
            }
        }

        if failed > 0 {
            anyhow::bail!(
                "{failed} of {} notification channels failed",
                self.channels.len()
            );
        }

        Ok(())
    }
}
