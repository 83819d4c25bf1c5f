//! Concurrency tests
//!
//! Parallel sweeps must produce the same per-host outcome as sequential ones,
//! and the transition detector must report exactly one change per host.

use std::sync::Arc;

use fleetwatch::Host;
use fleetwatch::storage::{MemoryStore, StatusStore};
use fleetwatch::transition::TransitionDetector;
use wiremock::MockServer;

use crate::helpers::*;

async fn fleet(size: i64) -> (Vec<MockServer>, Vec<Host>) {
    let mut servers = Vec::new();
    let mut hosts = Vec::new();

    for id in 0..size {
        let server = MockServer::start().await;
        mount_healthy_agent(&server, id as f64, 50.0, 50.0).await;
        hosts.push(create_test_host(id, &format!("host-{id}"), &server.uri()));
        servers.push(server);
    }

    (servers, hosts)
}

#[tokio::test]
async fn test_parallel_sweep_matches_sequential() {
    let (_servers, hosts) = fleet(8).await;

    let sequential_store = Arc::new(MemoryStore::with_hosts(hosts.clone()));
    let parallel_store = Arc::new(MemoryStore::with_hosts(hosts));

    let sequential = create_runner(sequential_store.clone(), RecordingNotifier::default(), 1);
    let parallel = create_runner(parallel_store.clone(), RecordingNotifier::default(), 4);

    let a = sequential.sweep_all().await.unwrap();
    let b = parallel.sweep_all().await.unwrap();

    assert_eq!(a, b);
    assert_eq!(b.online, 8);

    let a_hosts = sequential_store.list_hosts().await.unwrap();
    let b_hosts = parallel_store.list_hosts().await.unwrap();
    for (a, b) in a_hosts.iter().zip(&b_hosts) {
        assert_eq!(a.status.online, b.status.online);
        assert_eq!(a.status.cpu_usage, b.status.cpu_usage);
    }
}

#[tokio::test]
async fn test_parallel_sweep_notifies_each_host_once() {
    let (_servers, hosts) = fleet(6).await;
    let store = Arc::new(MemoryStore::with_hosts(hosts));
    let notifier = RecordingNotifier::default();
    let runner = create_runner(store.clone(), notifier.clone(), 6);

    runner.sweep_all().await.unwrap();
    runner.sweep_all().await.unwrap();

    let mut messages = notifier.messages();
    messages.sort();
    messages.dedup();
    assert_eq!(messages.len(), 6);
    assert_eq!(notifier.messages().len(), 6);
    assert_eq!(store.history_len().await, 12);
}

#[tokio::test]
async fn test_detector_shared_across_tasks() {
    let detector = Arc::new(TransitionDetector::new());

    let mut tasks = vec![];
    for host_id in 0..16 {
        for _ in 0..4 {
            let detector = detector.clone();
            tasks.push(tokio::spawn(async move {
                detector.is_transition(host_id, true)
            }));
        }
    }

    let mut transitions = 0;
    for task in tasks {
        if task.await.unwrap() {
            transitions += 1;
        }
    }

    assert_eq!(transitions, 16);
    assert_eq!(detector.len(), 16);
}
