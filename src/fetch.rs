//! Metric fetchers - one bounded GET per metric against a host's monitoring API
//!
//! Every metric lives under a fixed path below the host's base URL and is
//! decoded from its own JSON shape. Fetchers only report *what* went wrong;
//! whether a failure means "host unreachable" or "metric missing" is decided
//! by the probe pipeline (see [`crate::probe`]).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

/// Metrics reported as a single number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Cpu,
    Memory,
    Disk,
    Gpu,
    Temperature,
}

impl Metric {
    /// Path below the host's base URL
    pub fn path(&self) -> &'static str {
        match self {
            Metric::Cpu => "/api/4/cpu",
            Metric::Memory => "/api/4/mem",
            Metric::Disk => "/api/4/fs",
            Metric::Gpu => "/api/4/gpu",
            Metric::Temperature => "/api/4/sensors/label/value/Composite",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Cpu => write!(f, "cpu"),
            Metric::Memory => write!(f, "memory"),
            Metric::Disk => write!(f, "disk"),
            Metric::Gpu => write!(f, "gpu"),
            Metric::Temperature => write!(f, "temperature"),
        }
    }
}

pub const UPTIME_PATH: &str = "/api/4/uptime";

/// Result type alias for metric fetches
pub type FetchResult<T> = Result<T, FetchError>;

/// Ways a single metric request can fail
#[derive(Debug)]
pub enum FetchError {
    /// Connection refused, timeout, reading the body failed, ...
    Transport(String),

    /// The endpoint answered with something other than 200
    Status(u16),

    /// The body was not the expected JSON shape
    Decode(String),

    /// The endpoint returned an empty list
    Empty,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(msg) => write!(f, "request failed: {}", msg),
            FetchError::Status(code) => write!(f, "bad status code: {}", code),
            FetchError::Decode(msg) => write!(f, "failed to parse JSON: {}", msg),
            FetchError::Empty => write!(f, "endpoint returned no entries"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

/// Source of raw metric values for one host
///
/// Implemented over HTTP by [`HttpFetcher`]; tests substitute stubs.
#[async_trait]
pub trait MetricFetcher: Send + Sync {
    /// Fetch a single numeric metric
    async fn fetch(&self, base_url: &str, metric: Metric) -> FetchResult<f64>;

    /// Fetch the raw uptime string
    ///
    /// Best-effort: any failure yields an empty string.
    async fn fetch_uptime(&self, base_url: &str) -> String;
}

#[derive(Debug, Deserialize)]
struct CpuResponse {
    #[serde(default)]
    total: f64,
}

#[derive(Debug, Deserialize)]
struct MemoryResponse {
    #[serde(default)]
    percent: f64,
}

#[derive(Debug, Deserialize)]
struct FsEntry {
    #[serde(default)]
    percent: f64,
}

#[derive(Debug, Deserialize)]
struct GpuResponse {
    #[serde(default)]
    proc: f64,
}

#[derive(Debug, Deserialize)]
struct TemperatureResponse {
    #[serde(rename = "Composite", default)]
    composite: Vec<SensorValue>,
}

#[derive(Debug, Deserialize)]
struct SensorValue {
    #[serde(default)]
    value: f64,
}

#[derive(Debug, Deserialize)]
struct UptimeResponse {
    value: String,
}

/// Fetches metrics over HTTP with one shared client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests never take longer than `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// GET `url`, require 200 and return the body
    async fn get_body(&self, url: &str) -> FetchResult<String> {
        trace!("requesting {url}");

        let response = self.client.get(url).send().await?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        let body = self.get_body(url).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl MetricFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, base_url: &str, metric: Metric) -> FetchResult<f64> {
        let url = format!("{}{}", base_url, metric.path());

        let value = match metric {
            Metric::Cpu => self.get_json::<CpuResponse>(&url).await?.total,
            Metric::Memory => self.get_json::<MemoryResponse>(&url).await?.percent,
            Metric::Disk => {
                let entries = self.get_json::<Vec<FsEntry>>(&url).await?;
                entries.first().ok_or(FetchError::Empty)?.percent
            }
            Metric::Gpu => self.get_json::<GpuResponse>(&url).await?.proc,
            Metric::Temperature => self
                .get_json::<TemperatureResponse>(&url)
                .await?
                .composite
                .first()
                .map_or(0.0, |sensor| sensor.value),
        };

        trace!("{metric}: {value}");
        Ok(value)
    }

    #[instrument(skip(self))]
    async fn fetch_uptime(&self, base_url: &str) -> String {
        let url = format!("{}{}", base_url, UPTIME_PATH);

        match self.get_body(&url).await {
            Ok(body) => parse_uptime_body(&body),
            Err(e) => {
                debug!("uptime unavailable: {e}");
                String::new()
            }
        }
    }
}

/// `{"value": "..."}` if possible, otherwise the body itself without quotes
pub fn parse_uptime_body(body: &str) -> String {
    match serde_json::from_str::<UptimeResponse>(body) {
        Ok(response) if !response.value.is_empty() => response.value,
        _ => body.trim().trim_matches('"').to_string(),
    }
}
