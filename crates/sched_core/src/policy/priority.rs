use super::ReadyPolicy;
use crate::process::ProcessRecord;

/// External priority: higher value runs first, preemptive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExternalPriority;

impl ReadyPolicy for ExternalPriority {
    // Placed before the first record with a strictly lower priority.
    fn goes_before(&self, candidate: &ProcessRecord, queued: &ProcessRecord) -> bool {
        candidate.descriptor.external_priority > queued.descriptor.external_priority
    }

    fn should_preempt(&self, holder: &ProcessRecord, best: Option<&ProcessRecord>) -> bool {
        match best {
            Some(best) => {
                holder.remaining_cpu != 1
                    && best.descriptor.external_priority > holder.descriptor.external_priority
            }
            None => false,
        }
    }
}
