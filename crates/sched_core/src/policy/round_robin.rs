use sim_types::Tick;

use super::ReadyPolicy;
use crate::process::ProcessRecord;

/// Round robin with a fixed time slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundRobin {
    quantum: Tick,
}

impl RoundRobin {
    /// Creates a round-robin policy with the given quantum.
    pub fn new(quantum: Tick) -> Self {
        Self { quantum }
    }
}

impl ReadyPolicy for RoundRobin {
    fn goes_before(&self, _candidate: &ProcessRecord, _queued: &ProcessRecord) -> bool {
        false
    }

    // Nothing waiting can take the CPU mid-slice.
    fn should_preempt(&self, _holder: &ProcessRecord, _best: Option<&ProcessRecord>) -> bool {
        false
    }

    fn begin_slice(&self, record: &mut ProcessRecord) {
        record.quantum_remaining = Some(self.quantum);
    }

    // An exhausted slice is taken away even when nobody else is waiting.
    fn slice_expired(&self, running: &ProcessRecord) -> bool {
        running.quantum_remaining == Some(0)
    }
}
