pub mod actors;
pub mod config;
pub mod fetch;
pub mod notify;
pub mod probe;
pub mod storage;
pub mod sweep;
pub mod transition;
pub mod uptime;
pub mod util;

use serde::{Deserialize, Serialize};

/// Identifier of a monitored host, as assigned by the store
pub type HostId = i64;

/// A monitored host as known to the store
///
/// The sweep receives a read-only copy each cycle; updated status is written
/// back through the store, never through this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    pub id: HostId,
    pub name: String,

    /// Whether this host takes part in sweeps at all
    pub monitoring: bool,

    /// Base URL of the host's monitoring API (e.g. "http://10.0.0.5:61208")
    pub monitoring_url: Option<String>,

    /// Last persisted status snapshot
    #[serde(default)]
    pub status: HostStatus,
}

impl Host {
    /// Base URL without trailing slash, if the host is set up for probing
    pub fn probe_url(&self) -> Option<&str> {
        if !self.monitoring {
            return None;
        }

        self.monitoring_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostStatus {
    pub online: bool,
    pub cpu_usage: f64,
    pub ram_usage: f64,
    pub disk_usage: f64,
    pub gpu_usage: f64,
    pub temperature: f64,
    /// "online since" display string, empty when unknown
    pub uptime: String,
}

/// Outcome of probing one host in one sweep
///
/// An offline result always carries zeroed metrics and an empty uptime;
/// use [`ProbeResult::offline`] to build one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub host_id: HostId,
    pub online: bool,
    pub cpu_usage: f64,
    pub ram_usage: f64,
    pub disk_usage: f64,
    pub gpu_usage: f64,
    pub temperature: f64,
    pub uptime: String,
}

impl ProbeResult {
    pub fn offline(host_id: HostId) -> Self {
        Self {
            host_id,
            online: false,
            cpu_usage: 0.0,
            ram_usage: 0.0,
            disk_usage: 0.0,
            gpu_usage: 0.0,
            temperature: 0.0,
            uptime: String::new(),
        }
    }

    /// "online" / "offline", as used in notification messages
    pub fn status_label(&self) -> &'static str {
        if self.online { "online" } else { "offline" }
    }

    pub fn to_status(&self) -> HostStatus {
        HostStatus {
            online: self.online,
            cpu_usage: self.cpu_usage,
            ram_usage: self.ram_usage,
            disk_usage: self.disk_usage,
            gpu_usage: self.gpu_usage,
            temperature: self.temperature,
            uptime: self.uptime.clone(),
        }
    }
}
