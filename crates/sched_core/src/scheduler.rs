use alloc::collections::VecDeque;

use sim_types::Tick;

use crate::config::IoReturnDispatch;
use crate::policy::{Policy, ReadyPolicy};
use crate::process::ProcessRecord;

/// Index of a runtime record inside the engine's record table.
pub type RecordId = usize;

/// Policy-ordered ready queue for a single CPU.
#[derive(Debug)]
pub struct Scheduler {
    ready: VecDeque<RecordId>,
    policy: Policy,
    io_return: IoReturnDispatch,
}

impl Scheduler {
    /// Creates an empty scheduler driven by `policy`.
    pub fn new(policy: Policy, io_return: IoReturnDispatch) -> Self {
        Self {
            ready: VecDeque::new(),
            policy,
            io_return,
        }
    }

    /// Inserts a record at the position its policy key dictates.
    pub fn push_ready(&mut self, id: RecordId, records: &[ProcessRecord]) {
        assert!(
            !self.ready.contains(&id),
            "record {} inserted into the ready queue twice",
            id
        );
        let candidate = &records[id];
        let position = self
            .ready
            .iter()
            .position(|&queued| self.policy.goes_before(candidate, &records[queued]))
            .unwrap_or(self.ready.len());
        self.ready.insert(position, id);
    }

    /// Removes and returns the first eligible record in queue order.
    ///
    /// With `honor_io_return` set and a next-tick rule, records whose I/O
    /// finished at `now` are skipped.
    pub fn select_next(
        &mut self,
        records: &[ProcessRecord],
        now: Tick,
        honor_io_return: bool,
    ) -> Option<RecordId> {
        let defer = honor_io_return && self.io_return == IoReturnDispatch::NextTick;
        let position = self
            .ready
            .iter()
            .position(|&id| !(defer && records[id].io_returned_at == Some(now)))?;
        self.ready.remove(position)
    }

    /// Asks the policy whether `holder` must give up the CPU.
    pub fn should_preempt(&self, holder: &ProcessRecord, records: &[ProcessRecord]) -> bool {
        let best = self.ready.front().map(|&id| &records[id]);
        self.policy.should_preempt(holder, best)
    }

    /// Returns true if the running record has used up its time slice.
    pub fn slice_expired(&self, running: &ProcessRecord) -> bool {
        self.policy.slice_expired(running)
    }

    /// Runs the policy's dispatch hook on a record.
    pub fn begin_slice(&self, record: &mut ProcessRecord) {
        self.policy.begin_slice(record);
    }

    /// Returns the number of ready processes.
    pub fn ready_count(&self) -> usize {
        self.ready.len()
    }

    /// Iterates over queued records in dispatch order.
    pub fn ready_ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.ready.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::test_support::ready;
    use crate::policy::{ExternalPriority, Fcfs, RoundRobin};

    #[test]
    fn scheduler_keeps_priority_order_stable() {
        let records = vec![
            ready("A", 0, 3, 2),
            ready("B", 0, 3, 5),
            ready("C", 0, 3, 2),
            ready("D", 0, 3, 5),
        ];
        let mut scheduler = Scheduler::new(
            Policy::Priority(ExternalPriority),
            IoReturnDispatch::SameTick,
        );
        for id in 0..records.len() {
            scheduler.push_ready(id, &records);
        }
        let order: Vec<RecordId> = scheduler.ready_ids().collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn scheduler_round_robin_cycles_in_insertion_order() {
        let records = vec![ready("A", 3, 1, 0), ready("B", 0, 1, 0)];
        let mut scheduler = Scheduler::new(
            Policy::RoundRobin(RoundRobin::new(2)),
            IoReturnDispatch::SameTick,
        );
        scheduler.push_ready(0, &records);
        scheduler.push_ready(1, &records);

        assert_eq!(scheduler.select_next(&records, 0, true), Some(0));
        scheduler.push_ready(0, &records);
        assert_eq!(scheduler.select_next(&records, 0, true), Some(1));
        assert_eq!(scheduler.ready_count(), 1);
    }

    #[test]
    fn next_tick_rule_skips_records_back_from_io() {
        let mut records = vec![ready("A", 0, 3, 9), ready("B", 0, 3, 1)];
        records[0].io_returned_at = Some(4);
        let mut scheduler = Scheduler::new(
            Policy::Priority(ExternalPriority),
            IoReturnDispatch::NextTick,
        );
        scheduler.push_ready(0, &records);
        scheduler.push_ready(1, &records);

        assert!(scheduler.should_preempt(&ready("X", 0, 5, 0), &records));
        assert_eq!(scheduler.select_next(&records, 4, true), Some(1));
        assert_eq!(scheduler.select_next(&records, 4, true), None);
        assert_eq!(scheduler.select_next(&records, 4, false), Some(0));
    }

    #[test]
    #[should_panic(expected = "inserted into the ready queue twice")]
    fn scheduler_rejects_double_insertion() {
        let records = vec![ready("A", 0, 1, 0)];
        let mut scheduler = Scheduler::new(Policy::Fcfs(Fcfs), IoReturnDispatch::SameTick);
        scheduler.push_ready(0, &records);
        scheduler.push_ready(0, &records);
    }
}
