//! Online/offline transition detection for notification dedup
//!
//! Remembers the last observed status per host. A status is worth notifying
//! about when it is the first one seen for a host since the detector was
//! created, or when it differs from the previous one. State is kept in memory
//! only, so after a restart every host notifies once.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::trace;

use crate::HostId;

#[derive(Debug, Default)]
pub struct TransitionDetector {
    last_status: Mutex<HashMap<HostId, bool>>,
}

impl TransitionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `online` for `host_id` and report whether it is a transition
    ///
    /// Check and update happen under one lock, so concurrent callers for the
    /// same host see exactly one transition per change.
    pub fn is_transition(&self, host_id: HostId, online: bool) -> bool {
        let mut last_status = self
            .last_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let previous = last_status.insert(host_id, online);
        let transition = previous != Some(online);

        trace!("host {host_id}: previous={previous:?}, current={online}, transition={transition}");
        transition
    }

    /// Last recorded status, `None` if the host was never observed
    pub fn last_status(&self, host_id: HostId) -> Option<bool> {
        self.last_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&host_id)
            .copied()
    }

    /// Number of hosts observed so far
    pub fn len(&self) -> usize {
        self.last_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
