//! SweepActor - runs sweeps on a fixed interval
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → SweepRunner::sweep_all → SweepSummary (logged)
//!     ↑
//!     └─── Commands (SweepNow, UpdateInterval, Shutdown)
//! ```
//!
//! Sweeps run inline in the actor loop. A tick that fires while a sweep is
//! still running is delayed, never run concurrently.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use super::messages::SweepCommand;
use crate::sweep::{SweepRunner, SweepSummary};

/// How long history is kept and how often it is pruned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub days: u32,
    pub every: Duration,
}

impl RetentionPolicy {
    pub fn new(days: u32, cleanup_interval_hours: u32) -> Self {
        Self {
            days,
            every: Duration::from_secs(u64::from(cleanup_interval_hours.max(1)) * 3600),
        }
    }
}

/// Actor owning the sweep timer
pub struct SweepActor {
    runner: Arc<SweepRunner>,

    command_rx: mpsc::Receiver<SweepCommand>,

    interval_duration: Duration,

    /// `None` keeps history forever
    retention: Option<RetentionPolicy>,
}

fn ticker(period: Duration) -> Interval {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

impl SweepActor {
    pub fn new(
        runner: Arc<SweepRunner>,
        command_rx: mpsc::Receiver<SweepCommand>,
        interval_duration: Duration,
        retention: Option<RetentionPolicy>,
    ) -> Self {
        if let Some(policy) = retention {
            debug!("retention cleanup enabled: {} days", policy.days);
        }

        Self {
            runner,
            command_rx,
            interval_duration,
            retention,
        }
    }

    /// Run until a Shutdown command arrives or every handle is dropped
    #[instrument(skip(self), fields(interval = ?self.interval_duration))]
    pub async fn run(mut self) {
        debug!("starting sweep actor");

        let mut sweep_ticker = ticker(self.interval_duration);

        let has_retention = self.retention.is_some();
        let mut cleanup_ticker = ticker(
            self.retention
                .map(|policy| policy.every)
                .unwrap_or(Duration::from_secs(24 * 3600)),
        );

        loop {
            tokio::select! {
                _ = sweep_ticker.tick() => {
                    if let Err(e) = self.sweep().await {
                        error!("sweep failed: {:#}", e);
                    }
                }

                // first tick fires immediately, so this also prunes at startup
                _ = cleanup_ticker.tick(), if has_retention => {
                    self.run_cleanup().await;
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        SweepCommand::SweepNow { respond_to } => {
                            debug!("received SweepNow command");
                            let result = self.sweep().await;
                            let _ = respond_to.send(result);
                        }

                        SweepCommand::UpdateInterval { interval_secs } => {
                            debug!("updating interval to {interval_secs}s");
                            self.interval_duration = Duration::from_secs(interval_secs.max(1));
                            sweep_ticker = ticker(self.interval_duration);
                        }

                        SweepCommand::Shutdown => {
                            debug!("received shutdown command");
                            break;
                        }
                    }
                }

                else => {
                    warn!("command channel closed, shutting down");
                    break;
                }
            }
        }

        debug!("sweep actor stopped");
    }

    async fn sweep(&self) -> Result<SweepSummary> {
        self.runner.sweep_all().await
    }

    /// Delete history older than the retention period
    async fn run_cleanup(&self) {
        let Some(policy) = self.retention else {
            return;
        };

        let cutoff = Utc::now() - chrono::Duration::days(i64::from(policy.days));
        debug!("running retention cleanup (deleting history before {cutoff})");

        match self.runner.store().cleanup_history(cutoff).await {
            Ok(0) => debug!("retention cleanup: nothing to delete"),
            Ok(deleted) => info!("retention cleanup deleted {deleted} history entries"),
            Err(e) => error!("failed to clean up history: {}", e),
        }
    }
}

/// Handle for controlling a [`SweepActor`]
#[derive(Clone)]
pub struct SweepHandle {
    sender: mpsc::Sender<SweepCommand>,

    /// Actor task, taken by the first `shutdown`
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl SweepHandle {
    /// Spawn the actor as a tokio task
    pub fn spawn(
        runner: Arc<SweepRunner>,
        interval: Duration,
        retention: Option<RetentionPolicy>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let actor = SweepActor::new(runner, cmd_rx, interval, retention);
        let task = tokio::spawn(actor.run());

        Self {
            sender: cmd_tx,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    /// Run a sweep immediately and wait for its summary
    pub async fn sweep_now(&self) -> Result<SweepSummary> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SweepCommand::SweepNow { respond_to: tx })
            .await
            .context("failed to send SweepNow command")?;

        rx.await.context("failed to receive response")?
    }

    pub async fn update_interval(&self, interval_secs: u64) -> Result<()> {
        self.sender
            .send(SweepCommand::UpdateInterval { interval_secs })
            .await
            .context("failed to send UpdateInterval command")?;
        Ok(())
    }

    /// Stop the actor and wait until it has exited
    ///
    /// A sweep that is already running finishes, including its store writes.
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(SweepCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;

        if let Some(task) = self.task.lock().await.take() {
            task.await.context("sweep actor panicked")?;
        }

        Ok(())
    }
}
