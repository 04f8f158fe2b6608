use super::ReadyPolicy;
use crate::process::ProcessRecord;

/// Shortest remaining time next: preemptive variant of SPN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Srtn;

impl ReadyPolicy for Srtn {
    fn goes_before(&self, candidate: &ProcessRecord, queued: &ProcessRecord) -> bool {
        candidate.remaining_cpu < queued.remaining_cpu
    }

    // A holder with a single tick left always finishes its burst.
    fn should_preempt(&self, holder: &ProcessRecord, best: Option<&ProcessRecord>) -> bool {
        match best {
            Some(best) => holder.remaining_cpu != 1 && best.remaining_cpu < holder.remaining_cpu,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::test_support::ready;

    #[test]
    fn srtn_preempts_for_strictly_shorter_remaining() {
        let running = ready("A", 0, 4, 0);
        let shorter = ready("B", 2, 2, 0);
        let equal = ready("C", 2, 4, 0);
        assert!(Srtn.should_preempt(&running, Some(&shorter)));
        assert!(!Srtn.should_preempt(&running, Some(&equal)));
        assert!(!Srtn.should_preempt(&running, None));
    }

    #[test]
    fn srtn_lets_last_tick_finish() {
        let running = ready("A", 0, 1, 0);
        let mut instant = ready("B", 0, 1, 0);
        instant.remaining_cpu = 0;
        assert!(!Srtn.should_preempt(&running, Some(&instant)));
    }

    #[test]
    fn srtn_orders_by_remaining_ticks() {
        let mut partially_run = ready("A", 0, 6, 0);
        partially_run.remaining_cpu = 2;
        let fresh = ready("B", 0, 3, 0);
        assert!(Srtn.goes_before(&partially_run, &fresh));
    }
}
