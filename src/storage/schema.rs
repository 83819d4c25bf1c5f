//! History rows appended after every probe

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{HostId, ProbeResult};

/// One immutable history record of a probe
///
/// Entries are only ever appended; pruning is done by
/// [`StatusStore::cleanup_history`](super::StatusStore::cleanup_history).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub host_id: HostId,
    pub online: bool,
    pub cpu_usage: f64,
    pub ram_usage: f64,
    pub disk_usage: f64,
    pub gpu_usage: f64,
    pub temperature: f64,

    /// When the entry was written (always UTC)
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_probe(result: &ProbeResult, created_at: DateTime<Utc>) -> Self {
        Self {
            host_id: result.host_id,
            online: result.online,
            cpu_usage: round_two(result.cpu_usage),
            ram_usage: round_two(result.ram_usage),
            disk_usage: round_two(result.disk_usage),
            gpu_usage: round_two(result.gpu_usage),
            temperature: round_two(result.temperature),
            created_at,
        }
    }
}

/// History keeps two decimals
fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
