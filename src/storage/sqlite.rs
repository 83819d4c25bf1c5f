//! SQLite store implementation
//!
//! ## Features
//!
//! - **Embedded**: No separate database server required
//! - **WAL mode**: Dashboard reads do not block sweep writes
//! - **Connection pooling**: Parallel sweeps share a small pool
//! - **Migrations**: Automatic schema versioning with sqlx
//!
//! ## Tables
//!
//! - `hosts`: identity, monitoring settings and the latest status snapshot
//! - `host_history`: append-only probe history (`created_at` in Unix millis)
//! - `settings`: key/value pairs such as the notification template

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info, instrument, trace, warn};

use super::backend::{HealthStatus, StatusStore};
use super::error::{StorageError, StorageResult};
use super::schema::HistoryEntry;
use crate::{Host, HostId, HostStatus, ProbeResult};

const NOTIFICATION_TEMPLATE_KEY: &str = "notification_template";

/// SQLite-backed store
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    db_path: String,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path` and run migrations
    ///
    /// ## Example
    ///
    /// ```no_run
    /// # use fleetwatch::storage::sqlite::SqliteStore;
    /// # async fn example() -> anyhow::Result<()> {
    /// let store = SqliteStore::new("./fleetwatch.db").await?;
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all)]
    pub async fn new(db_path: impl AsRef<Path>) -> StorageResult<Self> {
        let db_path_str = db_path.as_ref().to_string_lossy().to_string();

        info!("initializing SQLite store at: {}", db_path_str);

        let options = SqliteConnectOptions::new()
            .filename(&db_path_str)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        debug!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;

        info!("SQLite store ready");

        Ok(Self {
            pool,
            db_path: db_path_str,
        })
    }

    fn millis_to_timestamp(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap_or_else(Utc::now)
    }

    fn host_from_row(row: &SqliteRow) -> StorageResult<Host> {
        Ok(Host {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            monitoring: row.try_get("monitoring")?,
            monitoring_url: row.try_get("monitoring_url")?,
            status: HostStatus {
                online: row.try_get("online")?,
                cpu_usage: row.try_get("cpu_usage")?,
                ram_usage: row.try_get("ram_usage")?,
                disk_usage: row.try_get("disk_usage")?,
                gpu_usage: row.try_get("gpu_usage")?,
                temperature: row.try_get("temperature")?,
                uptime: row.try_get("uptime")?,
            },
        })
    }

    fn history_from_row(row: &SqliteRow) -> StorageResult<HistoryEntry> {
        Ok(HistoryEntry {
            host_id: row.try_get("host_id")?,
            online: row.try_get("online")?,
            cpu_usage: row.try_get("cpu_usage")?,
            ram_usage: row.try_get("ram_usage")?,
            disk_usage: row.try_get("disk_usage")?,
            gpu_usage: row.try_get("gpu_usage")?,
            temperature: row.try_get("temperature")?,
            created_at: Self::millis_to_timestamp(row.try_get("created_at")?),
        })
    }
}

#[async_trait]
impl StatusStore for SqliteStore {
    #[instrument(skip(self))]
    async fn list_hosts(&self) -> StorageResult<Vec<Host>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, monitoring, monitoring_url, online,
                   cpu_usage, ram_usage, disk_usage, gpu_usage, temperature, uptime
            FROM hosts
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::host_from_row).collect()
    }

    #[instrument(skip(self, host), fields(host_id = host.id))]
    async fn register_host(&self, host: &Host) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO hosts (id, name, monitoring, monitoring_url)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                monitoring = excluded.monitoring,
                monitoring_url = excluded.monitoring_url
            "#,
        )
        .bind(host.id)
        .bind(&host.name)
        .bind(host.monitoring)
        .bind(&host.monitoring_url)
        .execute(&self.pool)
        .await?;

        debug!("registered host {}", host.name);
        Ok(())
    }

    #[instrument(skip(self, result), fields(host_id = result.host_id))]
    async fn update_host_status(&self, result: &ProbeResult) -> StorageResult<()> {
        let outcome = sqlx::query(
            r#"
            UPDATE hosts SET
                online = ?, cpu_usage = ?, ram_usage = ?, disk_usage = ?,
                gpu_usage = ?, temperature = ?, uptime = ?
            WHERE id = ?
            "#,
        )
        .bind(result.online)
        .bind(result.cpu_usage)
        .bind(result.ram_usage)
        .bind(result.disk_usage)
        .bind(result.gpu_usage)
        .bind(result.temperature)
        .bind(&result.uptime)
        .bind(result.host_id)
        .execute(&self.pool)
        .await?;

        if outcome.rows_affected() == 0 {
            return Err(StorageError::UnknownHost(result.host_id));
        }

        trace!("status updated");
        Ok(())
    }

    #[instrument(skip(self, entry), fields(host_id = entry.host_id))]
    async fn append_history(&self, entry: HistoryEntry) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO host_history (
                host_id, online, cpu_usage, ram_usage, disk_usage,
                gpu_usage, temperature, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.host_id)
        .bind(entry.online)
        .bind(entry.cpu_usage)
        .bind(entry.ram_usage)
        .bind(entry.disk_usage)
        .bind(entry.gpu_usage)
        .bind(entry.temperature)
        .bind(entry.created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        trace!("history entry appended");
        Ok(())
    }

    async fn notification_template(&self) -> StorageResult<Option<String>> {
        let template: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
                .bind(NOTIFICATION_TEMPLATE_KEY)
                .fetch_optional(&self.pool)
                .await?;

        Ok(template.filter(|template| !template.is_empty()))
    }

    async fn set_notification_template(&self, template: &str) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(NOTIFICATION_TEMPLATE_KEY)
        .bind(template)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn latest_history(
        &self,
        host_id: HostId,
        limit: usize,
    ) -> StorageResult<Vec<HistoryEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT host_id, online, cpu_usage, ram_usage, disk_usage,
                   gpu_usage, temperature, created_at
            FROM host_history
            WHERE host_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(host_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut entries = rows
            .iter()
            .map(Self::history_from_row)
            .collect::<StorageResult<Vec<_>>>()?;

        // Reverse to get chronological order (oldest first)
        entries.reverse();
        Ok(entries)
    }

    #[instrument(skip(self), fields(before = %before))]
    async fn cleanup_history(&self, before: DateTime<Utc>) -> StorageResult<usize> {
        let result = sqlx::query("DELETE FROM host_history WHERE created_at < ?")
            .bind(before.timestamp_millis())
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() as usize;
        info!("deleted {} old history entries", deleted);

        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> StorageResult<HealthStatus> {
        match sqlx::query("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => Ok(HealthStatus {
                healthy: true,
                message: "SQLite backend operational".to_string(),
                metadata: HashMap::from([
                    ("backend".to_string(), "sqlite".to_string()),
                    ("db_path".to_string(), self.db_path.clone()),
                ]),
            }),
            Err(e) => {
                warn!("health check failed: {}", e);
                Ok(HealthStatus {
                    healthy: false,
                    message: format!("health check failed: {}", e),
                    metadata: HashMap::new(),
                })
            }
        }
    }

    async fn close(&self) -> StorageResult<()> {
        info!("closing SQLite store");
        self.pool.close().await;
        Ok(())
    }
}
