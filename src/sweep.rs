//! Sweep - one pass over every monitored host
//!
//! ## Per-host flow
//!
//! ```text
//! Host → skip if unmonitored → HostProbe → TransitionDetector ─(transition)→ Notifier
//!                                   │
//!                                   └──→ store: update status + append history (always)
//! ```
//!
//! Hosts are handled independently. Store and notifier failures are logged
//! at the host boundary and never abort the sweep; the next sweep is the
//! only retry.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use futures::{FutureExt, StreamExt};
use futures::stream;
use tracing::{debug, error, info, instrument, warn};

use crate::fetch::MetricFetcher;
use crate::notify::{DEFAULT_TEMPLATE, Notifier, render_message};
use crate::probe::HostProbe;
use crate::storage::{HistoryEntry, StatusStore, StorageError, StorageResult};
use crate::transition::TransitionDetector;
use crate::{Host, ProbeResult};

#[derive(Debug, Clone)]
pub struct SweepOptions {
    /// Hosts processed at the same time
    pub concurrency: usize,

    /// Upper bound for every single store call
    pub store_timeout: Duration,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            store_timeout: Duration::from_secs(5),
        }
    }
}

/// Counters describing one finished sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub probed: usize,
    pub online: usize,
    pub offline: usize,
    pub skipped: usize,
    pub notified: usize,
    /// Store writes or notifications that failed
    pub failures: usize,
}

impl SweepSummary {
    fn record(&mut self, outcome: HostOutcome) {
        match outcome {
            HostOutcome::Skipped => self.skipped += 1,
            HostOutcome::Probed {
                online,
                notified,
                failures,
            } => {
                self.probed += 1;
                if online {
                    self.online += 1;
                } else {
                    self.offline += 1;
                }
                if notified {
                    self.notified += 1;
                }
                self.failures += failures;
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum HostOutcome {
    Skipped,
    Probed {
        online: bool,
        notified: bool,
        failures: usize,
    },
}

/// Runs sweeps against a store, a notifier and a fetcher
///
/// The [`TransitionDetector`] is injected so callers decide how long the
/// "last known status" memory lives.
pub struct SweepRunner {
    probe: HostProbe,
    store: Arc<dyn StatusStore>,
    notifier: Arc<dyn Notifier>,
    transitions: Arc<TransitionDetector>,
    options: SweepOptions,
}

impl SweepRunner {
    pub fn new(
        fetcher: Arc<dyn MetricFetcher>,
        store: Arc<dyn StatusStore>,
        notifier: Arc<dyn Notifier>,
        transitions: Arc<TransitionDetector>,
        options: SweepOptions,
    ) -> Self {
        Self {
            probe: HostProbe::new(fetcher),
            store,
            notifier,
            transitions,
            options,
        }
    }

    pub fn store(&self) -> &Arc<dyn StatusStore> {
        &self.store
    }

    pub fn transitions(&self) -> &Arc<TransitionDetector> {
        &self.transitions
    }

    /// Read the host list from the store and sweep it
    pub async fn sweep_all(&self) -> Result<SweepSummary> {
        let hosts = self
            .with_timeout(self.store.list_hosts())
            .await
            .context("failed to list hosts")?;

        Ok(self.run_sweep(&hosts).await)
    }

    /// Sweep `hosts` once
    ///
    /// Always runs to completion; every failure is confined to its host.
    #[instrument(skip_all, fields(hosts = hosts.len()))]
    pub async fn run_sweep(&self, hosts: &[Host]) -> SweepSummary {
        let template = self.load_template().await;
        let concurrency = self.options.concurrency.max(1);

        debug!("starting sweep (concurrency {concurrency})");

        let outcomes: Vec<HostOutcome> = stream::iter(hosts)
            .map(|host| self.handle_host(host, &template))
            .buffer_unordered(concurrency)
            .collect::<Vec<_>>()
            .boxed()
            .await;

        let summary = outcomes
            .into_iter()
            .fold(SweepSummary::default(), |mut summary, outcome| {
                summary.record(outcome);
                summary
            });

        info!(
            "sweep finished: {} probed ({} online, {} offline), {} skipped, {} notified, {} failures",
            summary.probed,
            summary.online,
            summary.offline,
            summary.skipped,
            summary.notified,
            summary.failures
        );

        summary
    }

    /// Template from the store, falling back to [`DEFAULT_TEMPLATE`]
    async fn load_template(&self) -> String {
        match self.with_timeout(self.store.notification_template()).await {
            Ok(Some(template)) => template,
            Ok(None) => DEFAULT_TEMPLATE.to_string(),
            Err(e) => {
                warn!("failed to load notification template, using default: {e}");
                DEFAULT_TEMPLATE.to_string()
            }
        }
    }

    #[instrument(skip(self, host, template), fields(host = %host.name))]
    async fn handle_host(&self, host: &Host, template: &str) -> HostOutcome {
        let Some(result) = self.probe.probe_host(host).await else {
            debug!("monitoring disabled or not configured, skipping");
            return HostOutcome::Skipped;
        };

        let mut failures = 0;

        let notified = self.transitions.is_transition(host.id, result.online);
        if notified {
            let message = render_message(template, &host.name, result.status_label());
            info!("status changed, notifying: {message}");

            if let Err(e) = self.notifier.send(&message).await {
                error!("failed to send notification: {e:#}");
                failures += 1;
            }
        }

        failures += self.persist(&result).await;

        HostOutcome::Probed {
            online: result.online,
            notified,
            failures,
        }
    }

    /// Write status and history; returns the number of failed writes
    async fn persist(&self, result: &ProbeResult) -> usize {
        let mut failures = 0;

        if let Err(e) = self.with_timeout(self.store.update_host_status(result)).await {
            error!("Failed to update host status (ID: {}): {}", result.host_id, e);
            failures += 1;
        }

        let entry = HistoryEntry::from_probe(result, Utc::now());
        if let Err(e) = self.with_timeout(self.store.append_history(entry)).await {
            error!("Failed to insert host history (ID: {}): {}", result.host_id, e);
            failures += 1;
        }

        failures
    }

    async fn with_timeout<T>(&self, call: impl Future<Output = StorageResult<T>>) -> StorageResult<T> {
        let limit = self.options.store_timeout;
        tokio::time::timeout(limit, call)
            .await
            .map_err(|_| StorageError::Timeout(limit))?
    }
}
