//! Failure tests for sweeps
//!
//! These tests verify that a sweep handles failures gracefully:
//! - Unreachable or erroring monitoring APIs
//! - Malformed responses
//! - Optional metrics missing

use std::sync::Arc;

use fleetwatch::HostStatus;
use fleetwatch::storage::{MemoryStore, StatusStore};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_unreachable_host_goes_offline() {
    let hosts = vec![create_test_host(1, "gone", "http://127.0.0.1:9")];
    let store = Arc::new(MemoryStore::with_hosts(hosts));
    let notifier = RecordingNotifier::default();
    let runner = create_runner(store.clone(), notifier.clone(), 1);

    let summary = runner.sweep_all().await.unwrap();

    assert_eq!(summary.offline, 1);
    assert_eq!(notifier.messages(), vec!["The server gone is now offline!"]);
    assert_eq!(
        store.list_hosts().await.unwrap()[0].status,
        HostStatus::default()
    );
    assert_eq!(store.history_len().await, 1);
}

#[tokio::test]
async fn test_server_error_on_cpu_goes_offline() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/4/cpu"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let hosts = vec![create_test_host(1, "web-1", &server.uri())];
    let store = Arc::new(MemoryStore::with_hosts(hosts));
    let runner = create_runner(store.clone(), RecordingNotifier::default(), 1);

    let summary = runner.sweep_all().await.unwrap();

    assert_eq!(summary.offline, 1);
    // nothing after the failed CPU request is fetched
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_malformed_memory_response_goes_offline() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/4/cpu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "total": 5.0 })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4/mem"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{invalid json"))
        .mount(&server)
        .await;

    let hosts = vec![create_test_host(1, "web-1", &server.uri())];
    let store = Arc::new(MemoryStore::with_hosts(hosts));
    let runner = create_runner(store.clone(), RecordingNotifier::default(), 1);

    let summary = runner.sweep_all().await.unwrap();

    assert_eq!(summary.offline, 1);
    assert_eq!(store.list_hosts().await.unwrap()[0].status.cpu_usage, 0.0);
}

#[tokio::test]
async fn test_empty_filesystem_list_goes_offline() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/4/cpu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "total": 5.0 })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4/mem"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "percent": 5.0 })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4/fs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let hosts = vec![create_test_host(1, "web-1", &server.uri())];
    let store = Arc::new(MemoryStore::with_hosts(hosts));
    let runner = create_runner(store, RecordingNotifier::default(), 1);

    assert_eq!(runner.sweep_all().await.unwrap().offline, 1);
}

#[tokio::test]
async fn test_missing_optional_metrics_stay_online() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/4/cpu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "total": 5.0 })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4/mem"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "percent": 6.0 })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4/fs"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([{ "percent": 7.0 }])),
        )
        .mount(&server)
        .await;
    // gpu, sensors and uptime answer 404

    let hosts = vec![create_test_host(1, "web-1", &server.uri())];
    let store = Arc::new(MemoryStore::with_hosts(hosts));
    let runner = create_runner(store.clone(), RecordingNotifier::default(), 1);

    let summary = runner.sweep_all().await.unwrap();

    assert_eq!(summary.online, 1);
    let status = &store.list_hosts().await.unwrap()[0].status;
    assert_eq!(status.gpu_usage, 0.0);
    assert_eq!(status.temperature, 0.0);
    assert_eq!(status.uptime, "");
}

#[tokio::test]
async fn test_one_failing_host_does_not_affect_others() {
    let server = MockServer::start().await;
    mount_healthy_agent(&server, 42.0, 55.0, 61.0).await;

    let hosts = vec![
        create_test_host(1, "gone", "http://127.0.0.1:9"),
        create_test_host(2, "web-1", &server.uri()),
    ];
    let store = Arc::new(MemoryStore::with_hosts(hosts));
    let notifier = RecordingNotifier::default();
    let runner = create_runner(store.clone(), notifier.clone(), 1);

    let summary = runner.sweep_all().await.unwrap();

    assert_eq!(summary.online, 1);
    assert_eq!(summary.offline, 1);
    assert_eq!(notifier.messages().len(), 2);
    assert!(store.list_hosts().await.unwrap()[1].status.online);
}
