//! Stores for host status and probe history
//!
//! The sweep only sees the [`StatusStore`] trait; backends are swapped at
//! startup from the `storage` section of the config.
//!
//! ## Backends
//!
//! - **SQLite** (feature `storage-sqlite`): embedded database file
//! - **In-Memory**: no persistence, for testing or storage-less setups
//!
//! ## Usage
//!
//! ```no_run
//! use fleetwatch::storage::{StatusStore, sqlite::SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = SqliteStore::new("./fleetwatch.db").await?;
//!     let hosts = store.list_hosts().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tracing::info;

use crate::config::StorageConfig;

pub mod backend;
pub mod error;
pub mod memory;
pub mod schema;
#[cfg(feature = "storage-sqlite")]
pub mod sqlite;

pub use backend::{HealthStatus, StatusStore};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use schema::HistoryEntry;

/// Open the store selected by `config`
pub async fn open_store(config: &StorageConfig) -> StorageResult<Arc<dyn StatusStore>> {
    match config {
        StorageConfig::None => {
            info!("using in-memory store, nothing will be persisted");
            Ok(Arc::new(MemoryStore::new()))
        }
        #[cfg(feature = "storage-sqlite")]
        StorageConfig::Sqlite { path, .. } => Ok(Arc::new(sqlite::SqliteStore::new(path).await?)),
        #[cfg(not(feature = "storage-sqlite"))]
        StorageConfig::Sqlite { .. } => Err(StorageError::InvalidConfig(
            "sqlite backend requires the storage-sqlite feature".to_string(),
        )),
    }
}
