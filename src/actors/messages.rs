//! Message types for the scheduler actor

use tokio::sync::oneshot;

use crate::sweep::SweepSummary;

/// Commands that can be sent to a [`SweepActor`](super::scheduler::SweepActor)
#[derive(Debug)]
pub enum SweepCommand {
    /// Run a sweep right now, bypassing the interval timer
    SweepNow {
        /// Channel to send the result back
        respond_to: oneshot::Sender<anyhow::Result<SweepSummary>>,
    },

    /// Change the sweep interval
    ///
    /// The timer restarts, so the next sweep runs immediately.
    UpdateInterval {
        /// New interval in seconds
        interval_secs: u64,
    },

    /// Stop after the sweep in progress (if any) finishes
    Shutdown,
}
