#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod engine;
pub mod event;
pub mod policy;
pub mod process;
pub mod scheduler;
pub mod stats;
pub mod workload;

pub use config::{parse_sim_config, Algorithm, IoReturnDispatch, SimConfig};
pub use engine::{default_iteration_cap, CpuSlot, Engine, Outcome, OverheadWindow, SimulationRun};
pub use event::{Event, EventKind, EventLog};
pub use policy::{Policy, ReadyPolicy};
pub use process::{LifecycleState, ProcessDescriptor, ProcessRecord};
pub use scheduler::{RecordId, Scheduler};
pub use sim_types::{OverheadKind, OverheadParams, Priority, SimError, Tick};
pub use stats::{BatchMetrics, CpuCounters, CpuUsage, ProcessMetrics, Statistics};
pub use workload::Workload;

/// Validates, runs and summarizes a workload in one call.
pub fn simulate(
    processes: alloc::vec::Vec<ProcessDescriptor>,
    config: SimConfig,
) -> Result<(Outcome, Statistics), SimError> {
    let workload = Workload::new(processes)?;
    let outcome = Engine::new(workload, config)?.run();
    let statistics = Statistics::compute(outcome.run())?;
    Ok((outcome, statistics))
}
