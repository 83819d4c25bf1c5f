//! Helper functions for integration tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fleetwatch::notify::Notifier;
use fleetwatch::storage::StatusStore;
use fleetwatch::sweep::{SweepOptions, SweepRunner};
use fleetwatch::transition::TransitionDetector;
use fleetwatch::{Host, HostStatus, fetch::HttpFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn create_test_host(id: i64, name: &str, url: &str) -> Host {
    Host {
        id,
        name: name.to_string(),
        monitoring: true,
        monitoring_url: Some(url.to_string()),
        status: HostStatus::default(),
    }
}

/// Collects every message instead of sending it
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) -> anyhow::Result<()> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

pub fn create_runner(
    store: Arc<dyn StatusStore>,
    notifier: RecordingNotifier,
    concurrency: usize,
) -> SweepRunner {
    SweepRunner::new(
        Arc::new(HttpFetcher::new(Duration::from_secs(2))),
        store,
        Arc::new(notifier),
        Arc::new(TransitionDetector::new()),
        SweepOptions {
            concurrency,
            ..SweepOptions::default()
        },
    )
}

/// Mount a healthy monitoring API on `server`
pub async fn mount_healthy_agent(server: &MockServer, cpu: f64, mem: f64, disk: f64) {
    Mock::given(method("GET"))
        .and(path("/api/4/cpu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "total": cpu })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/4/mem"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "percent": mem })),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/4/fs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{ "percent": disk }, { "percent": 3.0 }])),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/4/gpu"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "proc": 12.5 })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/4/sensors/label/value/Composite"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "Composite": [{ "value": 48.0 }] })),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/4/uptime"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"0:05:10\""))
        .mount(server)
        .await;
}
