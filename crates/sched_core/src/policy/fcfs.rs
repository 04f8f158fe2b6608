use super::ReadyPolicy;
use crate::process::ProcessRecord;

/// First-come, first-served: ordered by the tick a record became ready.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fcfs;

impl ReadyPolicy for Fcfs {
    fn goes_before(&self, candidate: &ProcessRecord, queued: &ProcessRecord) -> bool {
        candidate.ready_since < queued.ready_since
    }

    fn should_preempt(&self, _holder: &ProcessRecord, _best: Option<&ProcessRecord>) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::test_support::ready;

    #[test]
    fn fcfs_orders_by_ready_tick_and_keeps_ties_stable() {
        let early = ready("A", 1, 9, 0);
        let late = ready("B", 4, 1, 0);
        let same = ready("C", 1, 1, 0);
        assert!(Fcfs.goes_before(&early, &late));
        assert!(!Fcfs.goes_before(&late, &early));
        assert!(!Fcfs.goes_before(&same, &early));
    }

    #[test]
    fn fcfs_never_preempts() {
        let running = ready("A", 0, 10, 0);
        let short = ready("B", 0, 1, 9);
        assert!(!Fcfs.should_preempt(&running, Some(&short)));
    }
}
