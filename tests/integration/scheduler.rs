//! Scheduler actor driving real sweeps

use std::sync::Arc;
use std::time::Duration;

use fleetwatch::actors::SweepHandle;
use fleetwatch::storage::MemoryStore;
use wiremock::MockServer;

use crate::helpers::*;

#[tokio::test]
async fn test_interval_triggers_sweeps() {
    let server = MockServer::start().await;
    mount_healthy_agent(&server, 1.0, 2.0, 3.0).await;

    let store = Arc::new(MemoryStore::with_hosts([create_test_host(
        1,
        "web-1",
        &server.uri(),
    )]));
    let notifier = RecordingNotifier::default();
    let runner = Arc::new(create_runner(store.clone(), notifier.clone(), 1));

    let handle = SweepHandle::spawn(runner, Duration::from_secs(1), None);

    tokio::time::timeout(Duration::from_secs(5), async {
        while store.history_len().await < 2 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .expect("expected at least two scheduled sweeps");

    handle.shutdown().await.unwrap();

    assert_eq!(notifier.messages(), vec!["The server web-1 is now online!"]);
}

#[tokio::test]
async fn test_sweep_now_through_handle() {
    let server = MockServer::start().await;
    mount_healthy_agent(&server, 1.0, 2.0, 3.0).await;

    let store = Arc::new(MemoryStore::with_hosts([create_test_host(
        1,
        "web-1",
        &server.uri(),
    )]));
    let runner = Arc::new(create_runner(store, RecordingNotifier::default(), 1));

    let handle = SweepHandle::spawn(runner, Duration::from_secs(3600), None);

    let summary = handle.sweep_now().await.unwrap();
    assert_eq!(summary.online, 1);

    handle.shutdown().await.unwrap();
    assert!(handle.sweep_now().await.is_err());
}
