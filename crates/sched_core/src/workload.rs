use alloc::vec::Vec;

use sim_types::{OverheadParams, SimError, Tick};

use crate::process::ProcessDescriptor;

/// A validated, non-empty set of process descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    processes: Vec<ProcessDescriptor>,
}

impl Workload {
    /// Validates descriptors and wraps them into a workload.
    pub fn new(processes: Vec<ProcessDescriptor>) -> Result<Self, SimError> {
        if processes.is_empty() {
            return Err(SimError::EmptyWorkload);
        }
        for (index, descriptor) in processes.iter().enumerate() {
            descriptor.validate(index)?;
            let duplicate = processes[..index]
                .iter()
                .any(|earlier| earlier.name == descriptor.name);
            if duplicate {
                return Err(SimError::DuplicateProcess(index));
            }
        }
        Ok(Self { processes })
    }

    /// Returns the descriptors in input order.
    pub fn processes(&self) -> &[ProcessDescriptor] {
        &self.processes
    }

    /// Returns the number of processes.
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// Returns true if the workload holds no processes.
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Latest arrival time in the workload.
    pub fn last_arrival(&self) -> Tick {
        self.processes
            .iter()
            .map(|process| process.arrival_time)
            .max()
            .unwrap_or(0)
    }

    /// Upper bound on the ticks the workload can keep the CPU and devices busy.
    pub fn demand(&self, overheads: &OverheadParams) -> Tick {
        self.processes.iter().fold(0, |acc: Tick, process| {
            let per_burst = process
                .cpu_burst_duration
                .saturating_add(process.io_burst_duration)
                .saturating_add(overheads.total());
            acc.saturating_add(per_burst.saturating_mul(Tick::from(process.cpu_burst_count)))
        })
    }

    pub(crate) fn into_processes(self) -> Vec<ProcessDescriptor> {
        self.processes
    }
}
