//! Host probe - the ordered fetch pipeline producing one [`ProbeResult`]
//!
//! ## Pipeline
//!
//! ```text
//! CPU (required) → Uptime → Memory (required) → Disk (required) → GPU (optional) → Temperature (optional)
//! ```
//!
//! Each stage either continues or stops the pipeline. A failing *required*
//! stage stops it immediately and the host is reported offline with all
//! metrics zeroed; later stages are never requested. *Optional* stages and
//! the uptime stage never stop the pipeline, their failures become `0` / `""`.
//!
//! A failed optional fetch and a genuine zero reading end up identical in the
//! result.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::fetch::{Metric, MetricFetcher};
use crate::uptime::format_uptime;
use crate::{Host, HostId, ProbeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Failure means the host is unreachable
    Required(Metric),

    /// Failure degrades to a zero value
    Optional(Metric),

    /// Best-effort uptime string
    Uptime,
}

/// Stages in the order they are executed
pub const PIPELINE: [Stage; 6] = [
    Stage::Required(Metric::Cpu),
    Stage::Uptime,
    Stage::Required(Metric::Memory),
    Stage::Required(Metric::Disk),
    Stage::Optional(Metric::Gpu),
    Stage::Optional(Metric::Temperature),
];

enum StageOutcome {
    Continue,
    Offline,
}

/// Probes hosts through a shared [`MetricFetcher`]
#[derive(Clone)]
pub struct HostProbe {
    fetcher: Arc<dyn MetricFetcher>,
}

impl HostProbe {
    pub fn new(fetcher: Arc<dyn MetricFetcher>) -> Self {
        Self { fetcher }
    }

    /// Probe a host, `None` if it is not set up for monitoring
    pub async fn probe_host(&self, host: &Host) -> Option<ProbeResult> {
        let base_url = host.probe_url()?;
        Some(self.probe(host.id, &host.name, base_url).await)
    }

    /// Run the full pipeline against `base_url`
    #[instrument(skip(self, base_url), fields(host = %name))]
    pub async fn probe(&self, host_id: HostId, name: &str, base_url: &str) -> ProbeResult {
        let mut result = ProbeResult {
            online: true,
            ..ProbeResult::offline(host_id)
        };

        for stage in PIPELINE {
            if let StageOutcome::Offline = self.run_stage(stage, base_url, &mut result).await {
                info!("host is offline");
                return ProbeResult::offline(host_id);
            }
        }

        info!(
            "Updated - CPU: {:.2}%, RAM: {:.2}%, Disk: {:.2}%, GPU: {:.2}%, Temp: {:.2}°C, Uptime: {}",
            result.cpu_usage,
            result.ram_usage,
            result.disk_usage,
            result.gpu_usage,
            result.temperature,
            result.uptime
        );

        result
    }

    async fn run_stage(&self, stage: Stage, base_url: &str, result: &mut ProbeResult) -> StageOutcome {
        match stage {
            Stage::Required(metric) => match self.fetcher.fetch(base_url, metric).await {
                Ok(value) => {
                    set_metric(result, metric, value);
                    StageOutcome::Continue
                }
                Err(e) => {
                    warn!("{metric} fetch failed: {e}");
                    StageOutcome::Offline
                }
            },
            Stage::Optional(metric) => {
                let value = self
                    .fetcher
                    .fetch(base_url, metric)
                    .await
                    .unwrap_or_else(|e| {
                        debug!("{metric} unavailable, using 0: {e}");
                        0.0
                    });
                set_metric(result, metric, value);
                StageOutcome::Continue
            }
            Stage::Uptime => {
                let raw = self.fetcher.fetch_uptime(base_url).await;
                if !raw.is_empty() {
                    result.uptime = format_uptime(&raw);
                    debug!("uptime: {raw} (formatted: {})", result.uptime);
                }
                StageOutcome::Continue
            }
        }
    }
}

fn set_metric(result: &mut ProbeResult, metric: Metric, value: f64) {
    match metric {
        Metric::Cpu => result.cpu_usage = value,
        Metric::Memory => result.ram_usage = value,
        Metric::Disk => result.disk_usage = value,
        Metric::Gpu => result.gpu_usage = value,
        Metric::Temperature => result.temperature = value,
    }
}
