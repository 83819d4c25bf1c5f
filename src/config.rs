use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tracing::trace;

use crate::{Host, HostId, HostStatus};

/// Storage backend configuration
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (no persistence)
    #[default]
    #[serde(rename = "none")]
    None,

    /// SQLite database
    Sqlite {
        /// Path to the SQLite database file
        #[serde(default = "default_sqlite_path")]
        path: PathBuf,

        /// Retention period in days (history older than this is deleted)
        #[serde(default = "default_retention_days")]
        retention_days: u32,
    },
}

impl StorageConfig {
    pub fn retention_days(&self) -> Option<u32> {
        match self {
            StorageConfig::None => None,
            StorageConfig::Sqlite { retention_days, .. } => Some(*retention_days),
        }
    }
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("./fleetwatch.db")
}

fn default_retention_days() -> u32 {
    30
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub hosts: Option<Vec<HostConfig>>,

    /// Storage configuration (optional - defaults to in-memory)
    pub storage: Option<StorageConfig>,

    /// Channels every status change is sent to
    pub notifications: Option<Vec<NotificationChannel>>,

    /// Message template with `!name` and `!status` placeholders
    pub notification_template: Option<String>,

    #[serde(default)]
    pub sweep: SweepConfig,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct HostConfig {
    pub id: HostId,
    pub name: String,
    #[serde(default = "default_monitoring")]
    pub monitoring: bool,
    pub monitoring_url: Option<String>,
}

impl From<HostConfig> for Host {
    fn from(config: HostConfig) -> Self {
        Host {
            id: config.id,
            name: config.name,
            monitoring: config.monitoring,
            monitoring_url: config.monitoring_url,
            status: HostStatus::default(),
        }
    }
}

fn default_monitoring() -> bool {
    true
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    Discord(Discord),
    Webhook(Webhook),
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Webhook {
    pub url: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Discord {
    pub url: String,
    pub user_id: Option<String>,
}

/// Timing and parallelism of sweeps
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SweepConfig {
    /// Seconds between two sweeps
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Timeout for every request against a host's monitoring API, in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout: u64,

    /// Timeout for every store write, in seconds
    #[serde(default = "default_store_timeout")]
    pub store_timeout: u64,

    /// Hosts probed at the same time within one sweep
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_cleanup_interval_hours")]
    pub cleanup_interval_hours: u32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            http_timeout: default_http_timeout(),
            store_timeout: default_store_timeout(),
            concurrency: default_concurrency(),
            cleanup_interval_hours: default_cleanup_interval_hours(),
        }
    }
}

impl SweepConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(1))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout.max(1))
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout.max(1))
    }
}

fn default_interval() -> u64 {
    60
}

fn default_http_timeout() -> u64 {
    5
}

fn default_store_timeout() -> u64 {
    5
}

fn default_concurrency() -> usize {
    1
}

fn default_cleanup_interval_hours() -> u32 {
    24
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    parse_config(&file_content)
}

pub fn parse_config(content: &str) -> anyhow::Result<Config> {
    serde_json::from_str(content)
        .context("Invalid configuration file provided!")
        .inspect(|config| trace!("loaded config: {config:?}"))
}
