//! Task synchronization boundary.
//!
//! There is no remote task service yet. [`SimulatedSync`] waits for a
//! configured delay and reports success so the rest of the flow (status
//! messages, last-sync bookkeeping) behaves as it will with a real backend.

use crate::Result;
use crate::models::Task;
use std::time::Duration;

/// Default simulated sync delay in milliseconds.
pub const DEFAULT_SYNC_DELAY_MS: u64 = 1000;

/// Pushes the local task set to a remote.
pub trait SyncBackend {
    fn sync(&self, tasks: &[Task]) -> Result<()>;

    fn name(&self) -> &'static str;
}

/// Sync backend that only sleeps.
#[derive(Debug, Clone)]
pub struct SimulatedSync {
    delay: Duration,
}

impl SimulatedSync {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedSync {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SYNC_DELAY_MS))
    }
}

impl SyncBackend for SimulatedSync {
    fn sync(&self, tasks: &[Task]) -> Result<()> {
        tracing::debug!(count = tasks.len(), delay_ms = self.delay.as_millis() as u64, "simulated sync");
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
