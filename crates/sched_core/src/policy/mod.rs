//! Ready-queue ordering and preemption rules, one module per algorithm.

mod fcfs;
mod priority;
mod round_robin;
mod spn;
mod srtn;

pub use fcfs::Fcfs;
pub use priority::ExternalPriority;
pub use round_robin::RoundRobin;
pub use spn::Spn;
pub use srtn::Srtn;

use sim_types::{SimError, Tick};

use crate::config::Algorithm;
use crate::process::ProcessRecord;

/// Capability contract shared by every ready-queue policy.
///
/// Ordering is decided at insertion time: a candidate is placed in front of
/// the first queued record it `goes_before`, so records with equal keys keep
/// their insertion order.
pub trait ReadyPolicy {
    /// Returns true if `candidate` must be queued ahead of `queued`.
    fn goes_before(&self, candidate: &ProcessRecord, queued: &ProcessRecord) -> bool;

    /// Decides whether `holder` loses the CPU, given the head of the ready queue.
    fn should_preempt(&self, holder: &ProcessRecord, best: Option<&ProcessRecord>) -> bool;

    /// Hook run when a record is dispatched.
    fn begin_slice(&self, _record: &mut ProcessRecord) {}

    /// Checked after every executed tick that leaves the burst unfinished.
    fn slice_expired(&self, _running: &ProcessRecord) -> bool {
        false
    }
}

/// The policy selected for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Fcfs(Fcfs),
    RoundRobin(RoundRobin),
    Spn(Spn),
    Srtn(Srtn),
    Priority(ExternalPriority),
}

impl Policy {
    /// Builds the policy for an algorithm; round robin needs a positive quantum.
    pub fn for_algorithm(algorithm: Algorithm, quantum: Option<Tick>) -> Result<Self, SimError> {
        let policy = match algorithm {
            Algorithm::Fcfs => Policy::Fcfs(Fcfs),
            Algorithm::RoundRobin => match quantum {
                Some(quantum) if quantum > 0 => Policy::RoundRobin(RoundRobin::new(quantum)),
                _ => return Err(SimError::InvalidParameter("quantum")),
            },
            Algorithm::Spn => Policy::Spn(Spn),
            Algorithm::Srtn => Policy::Srtn(Srtn),
            Algorithm::Priority => Policy::Priority(ExternalPriority),
        };
        Ok(policy)
    }

    /// Returns the algorithm this policy implements.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Policy::Fcfs(_) => Algorithm::Fcfs,
            Policy::RoundRobin(_) => Algorithm::RoundRobin,
            Policy::Spn(_) => Algorithm::Spn,
            Policy::Srtn(_) => Algorithm::Srtn,
            Policy::Priority(_) => Algorithm::Priority,
        }
    }

    fn as_dyn(&self) -> &dyn ReadyPolicy {
        match self {
            Policy::Fcfs(policy) => policy,
            Policy::RoundRobin(policy) => policy,
            Policy::Spn(policy) => policy,
            Policy::Srtn(policy) => policy,
            Policy::Priority(policy) => policy,
        }
    }
}

impl ReadyPolicy for Policy {
    fn goes_before(&self, candidate: &ProcessRecord, queued: &ProcessRecord) -> bool {
        self.as_dyn().goes_before(candidate, queued)
    }

    fn should_preempt(&self, holder: &ProcessRecord, best: Option<&ProcessRecord>) -> bool {
        self.as_dyn().should_preempt(holder, best)
    }

    fn begin_slice(&self, record: &mut ProcessRecord) {
        self.as_dyn().begin_slice(record)
    }

    fn slice_expired(&self, running: &ProcessRecord) -> bool {
        self.as_dyn().slice_expired(running)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_robin_requires_quantum() {
        assert_eq!(
            Policy::for_algorithm(Algorithm::RoundRobin, None),
            Err(SimError::InvalidParameter("quantum"))
        );
        assert_eq!(
            Policy::for_algorithm(Algorithm::RoundRobin, Some(0)),
            Err(SimError::InvalidParameter("quantum"))
        );
        let policy = Policy::for_algorithm(Algorithm::RoundRobin, Some(3))
            .expect("policy should build");
        assert_eq!(policy.algorithm(), Algorithm::RoundRobin);
    }

    #[test]
    fn every_algorithm_maps_back_to_itself() {
        for algorithm in Algorithm::ALL {
            let policy =
                Policy::for_algorithm(algorithm, Some(2)).expect("policy should build");
            assert_eq!(policy.algorithm(), algorithm);
        }
    }
}
