//! Store trait definition
//!
//! The sweep treats persistence as an opaque collaborator: it reads the host
//! list and the notification template, and writes status snapshots and
//! history entries. Everything else (schema, pruning, serving the dashboard)
//! is the backend's business.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::StorageResult;
use super::schema::HistoryEntry;
use crate::{Host, HostId, ProbeResult};

/// Health status of the storage backend
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Is the backend operational?
    pub healthy: bool,

    /// Human-readable status message
    pub message: String,

    /// Additional backend-specific metadata
    pub metadata: std::collections::HashMap<String, String>,
}

/// Trait for persistent host/status stores
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync` and tolerate concurrent calls, as
/// hosts of one sweep may be processed in parallel.
///
/// ## Error Handling
///
/// Methods return `StorageResult<T>`. Implementations should convert
/// backend-specific errors to `StorageError` variants.
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// All known hosts, ordered by id
    async fn list_hosts(&self) -> StorageResult<Vec<Host>>;

    /// Insert a host or update its name and monitoring settings
    ///
    /// The stored status snapshot of an existing host is left untouched.
    async fn register_host(&self, host: &Host) -> StorageResult<()>;

    /// Overwrite the current status snapshot of a host
    async fn update_host_status(&self, result: &ProbeResult) -> StorageResult<()>;

    /// Append one history entry
    async fn append_history(&self, entry: HistoryEntry) -> StorageResult<()>;

    /// The configured notification template, `None` if unset or empty
    async fn notification_template(&self) -> StorageResult<Option<String>>;

    async fn set_notification_template(&self, template: &str) -> StorageResult<()>;

    /// The `limit` most recent history entries of a host, oldest first
    async fn latest_history(&self, host_id: HostId, limit: usize)
    -> StorageResult<Vec<HistoryEntry>>;

    /// Delete history entries created before `before`
    ///
    /// Returns the number of entries deleted.
    async fn cleanup_history(&self, before: DateTime<Utc>) -> StorageResult<usize>;

    /// Check backend health
    async fn health_check(&self) -> StorageResult<HealthStatus>;

    /// Close the backend and release resources
    async fn close(&self) -> StorageResult<()>;
}
