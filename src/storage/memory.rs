//! In-memory store (no persistence)
//!
//! Useful for:
//! - Testing without database dependencies
//! - Running without any storage configured
//!
//! ## Limitations
//!
//! - **No persistence**: All data lost on restart
//! - **Limited history**: At most `MAX_HISTORY_PER_HOST` entries per host

use std::collections::{BTreeMap, HashMap, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, trace};

use super::backend::{HealthStatus, StatusStore};
use super::error::{StorageError, StorageResult};
use super::schema::HistoryEntry;
use crate::{Host, HostId, ProbeResult};

/// Maximum history entries kept in memory per host
const MAX_HISTORY_PER_HOST: usize = 1000;

#[derive(Debug, Default)]
struct Inner {
    hosts: BTreeMap<HostId, Host>,
    history: HashMap<HostId, VecDeque<HistoryEntry>>,
    notification_template: Option<String>,
}

/// In-memory store
///
/// History is a ring buffer per host; when full, the oldest entry is evicted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already containing `hosts`
    pub fn with_hosts(hosts: impl IntoIterator<Item = Host>) -> Self {
        let inner = Inner {
            hosts: hosts.into_iter().map(|host| (host.id, host)).collect(),
            ..Inner::default()
        };

        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Total history entries across all hosts
    pub async fn history_len(&self) -> usize {
        self.inner.read().await.history.values().map(VecDeque::len).sum()
    }
}

#[async_trait]
impl StatusStore for MemoryStore {
    async fn list_hosts(&self) -> StorageResult<Vec<Host>> {
        Ok(self.inner.read().await.hosts.values().cloned().collect())
    }

    async fn register_host(&self, host: &Host) -> StorageResult<()> {
        let mut inner = self.inner.write().await;

        inner
            .hosts
            .entry(host.id)
            .and_modify(|existing| {
                existing.name = host.name.clone();
                existing.monitoring = host.monitoring;
                existing.monitoring_url = host.monitoring_url.clone();
            })
            .or_insert_with(|| host.clone());

        debug!("registered host {} ({})", host.id, host.name);
        Ok(())
    }

    async fn update_host_status(&self, result: &ProbeResult) -> StorageResult<()> {
        let mut inner = self.inner.write().await;

        let host = inner
            .hosts
            .get_mut(&result.host_id)
            .ok_or(StorageError::UnknownHost(result.host_id))?;
        host.status = result.to_status();

        trace!("updated status of host {}", result.host_id);
        Ok(())
    }

    async fn append_history(&self, entry: HistoryEntry) -> StorageResult<()> {
        let mut inner = self.inner.write().await;

        let history = inner.history.entry(entry.host_id).or_default();
        history.push_back(entry);
        if history.len() > MAX_HISTORY_PER_HOST {
            history.pop_front();
        }

        Ok(())
    }

    async fn notification_template(&self) -> StorageResult<Option<String>> {
        Ok(self
            .inner
            .read()
            .await
            .notification_template
            .clone()
            .filter(|template| !template.is_empty()))
    }

    async fn set_notification_template(&self, template: &str) -> StorageResult<()> {
        self.inner.write().await.notification_template = Some(template.to_string());
        Ok(())
    }

    async fn latest_history(
        &self,
        host_id: HostId,
        limit: usize,
    ) -> StorageResult<Vec<HistoryEntry>> {
        let inner = self.inner.read().await;

        let entries = inner
            .history
            .get(&host_id)
            .map(|history| {
                let skip = history.len().saturating_sub(limit);
                history.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default();

        Ok(entries)
    }

    async fn cleanup_history(&self, before: DateTime<Utc>) -> StorageResult<usize> {
        let mut inner = self.inner.write().await;

        let mut deleted = 0;
        for history in inner.history.values_mut() {
            let len = history.len();
            history.retain(|entry| entry.created_at >= before);
            deleted += len - history.len();
        }

        debug!("deleted {deleted} history entries before {before}");
        Ok(deleted)
    }

    async fn health_check(&self) -> StorageResult<HealthStatus> {
        let inner = self.inner.read().await;

        Ok(HealthStatus {
            healthy: true,
            message: "In-memory storage operational".to_string(),
            metadata: HashMap::from([
                ("backend".to_string(), "memory".to_string()),
                ("hosts".to_string(), inner.hosts.len().to_string()),
            ]),
        })
    }

    async fn close(&self) -> StorageResult<()> {
        debug!("closing in-memory store (no-op)");
        Ok(())
    }
}
