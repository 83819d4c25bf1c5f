//! Integration tests for SQLite persistence
//!
//! These tests verify that:
//! - Sweep results land in the database
//! - Status survives reopening the database
//! - Retention cleanup removes old history

use std::sync::Arc;

use chrono::{Duration, Utc};
use fleetwatch::ProbeResult;
use fleetwatch::storage::sqlite::SqliteStore;
use fleetwatch::storage::{HistoryEntry, StatusStore};
use tempfile::tempdir;
use wiremock::MockServer;

use crate::helpers::*;

#[tokio::test]
async fn test_sweep_persists_to_sqlite() {
    let temp_dir = tempdir().unwrap();
    let db_path = temp_dir.path().join("fleet.db");

    let server = MockServer::start().await;
    mount_healthy_agent(&server, 42.0, 55.0, 61.0).await;

    let store = Arc::new(SqliteStore::new(&db_path).await.unwrap());
    store
        .register_host(&create_test_host(1, "web-1", &server.uri()))
        .await
        .unwrap();

    let runner = create_runner(store.clone(), RecordingNotifier::default(), 1);
    let summary = runner.sweep_all().await.unwrap();
    assert_eq!(summary.online, 1);

    store.close().await.unwrap();

    let reopened = SqliteStore::new(&db_path).await.unwrap();
    let hosts = reopened.list_hosts().await.unwrap();
    assert_eq!(hosts.len(), 1);
    assert!(hosts[0].status.online);
    assert_eq!(hosts[0].status.cpu_usage, 42.0);

    let history = reopened.latest_history(1, 10).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].disk_usage, 61.0);
}

#[tokio::test]
async fn test_registering_again_keeps_status() {
    let temp_dir = tempdir().unwrap();
    let store = SqliteStore::new(temp_dir.path().join("fleet.db"))
        .await
        .unwrap();

    let mut host = create_test_host(1, "web-1", "http://web-1");
    store.register_host(&host).await.unwrap();

    let mut result = ProbeResult::offline(1);
    result.online = true;
    result.cpu_usage = 12.0;
    store.update_host_status(&result).await.unwrap();

    host.name = "web-1-renamed".to_string();
    store.register_host(&host).await.unwrap();

    let stored = &store.list_hosts().await.unwrap()[0];
    assert_eq!(stored.name, "web-1-renamed");
    assert!(stored.status.online);
    assert_eq!(stored.status.cpu_usage, 12.0);
}

#[tokio::test]
async fn test_retention_cleanup() {
    let temp_dir = tempdir().unwrap();
    let store = SqliteStore::new(temp_dir.path().join("fleet.db"))
        .await
        .unwrap();
    store
        .register_host(&create_test_host(1, "web-1", "http://web-1"))
        .await
        .unwrap();

    let now = Utc::now();
    for age in [40, 35, 1, 0] {
        let entry = HistoryEntry::from_probe(&ProbeResult::offline(1), now - Duration::days(age));
        store.append_history(entry).await.unwrap();
    }

    let deleted = store
        .cleanup_history(now - Duration::days(30))
        .await
        .unwrap();

    assert_eq!(deleted, 2);
    assert_eq!(store.latest_history(1, 10).await.unwrap().len(), 2);
}
