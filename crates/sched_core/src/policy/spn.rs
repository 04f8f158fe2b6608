use super::ReadyPolicy;
use crate::process::ProcessRecord;

/// Shortest process next: shortest CPU burst first, never preemptive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spn;

impl ReadyPolicy for Spn {
    fn goes_before(&self, candidate: &ProcessRecord, queued: &ProcessRecord) -> bool {
        candidate.descriptor.cpu_burst_duration < queued.descriptor.cpu_burst_duration
    }

    fn should_preempt(&self, _holder: &ProcessRecord, _best: Option<&ProcessRecord>) -> bool {
        false
    }
}
