#![cfg_attr(not(test), no_std)]

use core::fmt;

use serde::{Deserialize, Serialize};

/// Discrete simulation time, in CPU ticks.
pub type Tick = u64;

/// External priority; higher values are more important.
pub type Priority = i64;

/// Common error codes returned by simulator interfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// The workload contains no processes.
    EmptyWorkload,
    /// A descriptor field is out of range.
    InvalidProcess { index: usize, field: &'static str },
    /// A descriptor reuses a name already taken by an earlier one.
    DuplicateProcess(usize),
    /// A run parameter is missing or out of range.
    InvalidParameter(&'static str),
    /// A config text line could not be understood.
    InvalidConfig(&'static str),
    /// Collected counters contradict each other.
    InconsistentAccounting(&'static str),
}

impl SimError {
    /// Returns a stable, human-readable error label.
    pub fn as_str(&self) -> &'static str {
        match self {
            SimError::EmptyWorkload => "empty workload",
            SimError::InvalidProcess { .. } => "invalid process",
            SimError::DuplicateProcess(_) => "duplicate process name",
            SimError::InvalidParameter(_) => "invalid parameter",
            SimError::InvalidConfig(_) => "invalid config",
            SimError::InconsistentAccounting(_) => "inconsistent accounting",
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::EmptyWorkload => f.write_str(self.as_str()),
            SimError::InvalidProcess { index, field } => {
                write!(f, "{}: entry {} has bad `{}`", self.as_str(), index, field)
            }
            SimError::DuplicateProcess(index) => write!(f, "{}: entry {}", self.as_str(), index),
            SimError::InvalidParameter(name)
            | SimError::InvalidConfig(name)
            | SimError::InconsistentAccounting(name) => write!(f, "{}: {}", self.as_str(), name),
        }
    }
}

/// Operating-system work charged to the CPU around process execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OverheadKind {
    /// Admission, paid once on a process's first dispatch.
    Tip,
    /// Context switch, paid on every later dispatch.
    Tcp,
    /// Teardown, paid once after the final CPU burst.
    Tfp,
}

impl OverheadKind {
    /// Returns the short label used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            OverheadKind::Tip => "TIP",
            OverheadKind::Tcp => "TCP",
            OverheadKind::Tfp => "TFP",
        }
    }
}

/// Durations of the three overhead windows, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OverheadParams {
    pub tip: Tick,
    pub tcp: Tick,
    pub tfp: Tick,
}

impl OverheadParams {
    /// Creates overhead parameters from the three window lengths.
    pub const fn new(tip: Tick, tcp: Tick, tfp: Tick) -> Self {
        Self { tip, tcp, tfp }
    }

    /// Returns the window length for the given kind.
    pub fn duration(&self, kind: OverheadKind) -> Tick {
        match kind {
            OverheadKind::Tip => self.tip,
            OverheadKind::Tcp => self.tcp,
            OverheadKind::Tfp => self.tfp,
        }
    }

    /// Sum of all three windows, saturating at `Tick::MAX`.
    pub fn total(&self) -> Tick {
        self.tip.saturating_add(self.tcp).saturating_add(self.tfp)
    }
}
