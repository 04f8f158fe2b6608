use alloc::string::{String, ToString};

use serde::{Deserialize, Serialize};
use sim_types::{Priority, SimError, Tick};

/// Immutable input describing one process of a workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "tiempo_arribo")]
    pub arrival_time: Tick,
    #[serde(alias = "cantidad_rafagas_cpu")]
    pub cpu_burst_count: u32,
    #[serde(alias = "duracion_rafaga_cpu")]
    pub cpu_burst_duration: Tick,
    #[serde(alias = "duracion_rafaga_es", default)]
    pub io_burst_duration: Tick,
    #[serde(alias = "prioridad_externa", default)]
    pub external_priority: Priority,
}

impl ProcessDescriptor {
    /// Creates a descriptor from its raw fields.
    pub fn new(
        name: &str,
        arrival_time: Tick,
        cpu_burst_count: u32,
        cpu_burst_duration: Tick,
        io_burst_duration: Tick,
        external_priority: Priority,
    ) -> Self {
        Self {
            name: name.to_string(),
            arrival_time,
            cpu_burst_count,
            cpu_burst_duration,
            io_burst_duration,
            external_priority,
        }
    }

    /// Total CPU demand across all bursts.
    pub fn total_cpu(&self) -> Tick {
        Tick::from(self.cpu_burst_count).saturating_mul(self.cpu_burst_duration)
    }

    pub(crate) fn validate(&self, index: usize) -> Result<(), SimError> {
        if self.name.trim().is_empty() {
            return Err(SimError::InvalidProcess { index, field: "name" });
        }
        if self.cpu_burst_count == 0 {
            return Err(SimError::InvalidProcess {
                index,
                field: "cpu_burst_count",
            });
        }
        if self.cpu_burst_duration == 0 {
            return Err(SimError::InvalidProcess {
                index,
                field: "cpu_burst_duration",
            });
        }
        Ok(())
    }
}

/// Lifecycle states a process moves through during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    New,
    Ready,
    Running,
    Blocked,
    Terminating,
    Terminated,
}

impl LifecycleState {
    /// Returns the lowercase label used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::New => "new",
            LifecycleState::Ready => "ready",
            LifecycleState::Running => "running",
            LifecycleState::Blocked => "blocked",
            LifecycleState::Terminating => "terminating",
            LifecycleState::Terminated => "terminated",
        }
    }
}

/// Per-process runtime state, owned by the engine while a run is in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRecord {
    pub descriptor: ProcessDescriptor,
    pub state: LifecycleState,
    pub remaining_bursts: u32,
    /// Ticks left in the current CPU burst.
    pub remaining_cpu: Tick,
    /// Ticks left in the current I/O burst.
    pub remaining_io: Tick,
    /// Cleared once the admission window (TIP) has been paid.
    pub first_dispatch: bool,
    /// Only used by round robin.
    pub quantum_remaining: Option<Tick>,
    /// Tick the record last entered the ready queue.
    pub ready_since: Tick,
    /// Tick the record last came back from I/O.
    pub io_returned_at: Option<Tick>,
    pub block_start: Option<Tick>,
    pub ticks_in_ready: Tick,
    pub cpu_ticks: Tick,
    pub overhead_ticks: Tick,
    pub completion: Option<Tick>,
    pub return_time: Option<Tick>,
    pub normalized_return_time: Option<f64>,
}

impl ProcessRecord {
    /// Creates a fresh record for a descriptor that has not arrived yet.
    pub fn new(descriptor: ProcessDescriptor) -> Self {
        Self {
            state: LifecycleState::New,
            remaining_bursts: descriptor.cpu_burst_count,
            remaining_cpu: descriptor.cpu_burst_duration,
            remaining_io: 0,
            first_dispatch: true,
            quantum_remaining: None,
            ready_since: descriptor.arrival_time,
            io_returned_at: None,
            block_start: None,
            ticks_in_ready: 0,
            cpu_ticks: 0,
            overhead_ticks: 0,
            completion: None,
            return_time: None,
            normalized_return_time: None,
            descriptor,
        }
    }

    /// Returns the process name.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Returns true once the record reached its final state.
    pub fn is_terminated(&self) -> bool {
        self.state == LifecycleState::Terminated
    }

    /// Stamps completion and derives the return-time metrics.
    pub(crate) fn finalize(&mut self, at: Tick) {
        let return_time = at.saturating_sub(self.descriptor.arrival_time);
        self.state = LifecycleState::Terminated;
        self.completion = Some(at);
        self.return_time = Some(return_time);
        self.normalized_return_time =
            Some(return_time as f64 / self.descriptor.total_cpu() as f64);
    }
}
