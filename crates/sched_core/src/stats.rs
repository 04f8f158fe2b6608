use alloc::string::String;
use alloc::vec::Vec;

use serde::Serialize;
use sim_types::{SimError, Tick};

use crate::engine::SimulationRun;
use crate::process::ProcessRecord;

/// Raw per-slot CPU counters collected by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CpuCounters {
    pub busy: Tick,
    pub overhead: Tick,
    pub idle: Tick,
}

/// CPU time split into busy, overhead and idle shares.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CpuUsage {
    pub busy: Tick,
    pub overhead: Tick,
    pub idle: Tick,
    pub total: Tick,
    pub busy_percent: f64,
    pub overhead_percent: f64,
    pub idle_percent: f64,
}

impl CpuUsage {
    /// Derives idle time from elapsed time and checks it against the counters.
    pub fn from_counters(counters: &CpuCounters, elapsed: Tick) -> Result<Self, SimError> {
        let idle = elapsed
            .checked_sub(counters.busy)
            .and_then(|rest| rest.checked_sub(counters.overhead))
            .ok_or(SimError::InconsistentAccounting("busy and overhead exceed elapsed time"))?;
        if idle != counters.idle {
            return Err(SimError::InconsistentAccounting("idle counter disagrees with elapsed time"));
        }
        Ok(Self {
            busy: counters.busy,
            overhead: counters.overhead,
            idle,
            total: elapsed,
            busy_percent: percent(counters.busy, elapsed),
            overhead_percent: percent(counters.overhead, elapsed),
            idle_percent: percent(idle, elapsed),
        })
    }
}

fn percent(part: Tick, total: Tick) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / total as f64
}

/// Results for one process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessMetrics {
    pub name: String,
    pub arrival: Tick,
    pub completion: Option<Tick>,
    pub return_time: Option<Tick>,
    pub normalized_return_time: Option<f64>,
    pub ticks_in_ready: Tick,
    pub cpu_ticks: Tick,
    pub overhead_ticks: Tick,
}

impl From<&ProcessRecord> for ProcessMetrics {
    fn from(record: &ProcessRecord) -> Self {
        Self {
            name: record.descriptor.name.clone(),
            arrival: record.descriptor.arrival_time,
            completion: record.completion,
            return_time: record.return_time,
            normalized_return_time: record.normalized_return_time,
            ticks_in_ready: record.ticks_in_ready,
            cpu_ticks: record.cpu_ticks,
            overhead_ticks: record.overhead_ticks,
        }
    }
}

/// Results for the whole batch ("tanda").
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchMetrics {
    pub completed: usize,
    /// Last completion minus first arrival.
    pub batch_return_time: Option<Tick>,
    pub mean_return_time: Option<f64>,
    pub mean_normalized_return_time: Option<f64>,
}

/// Summary statistics of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub cpu: CpuUsage,
    pub processes: Vec<ProcessMetrics>,
    pub batch: BatchMetrics,
}

impl Statistics {
    /// Reduces a run into CPU usage, per-process and batch metrics.
    pub fn compute(run: &SimulationRun) -> Result<Self, SimError> {
        let cpu = CpuUsage::from_counters(&run.counters, run.elapsed())?;
        let processes: Vec<ProcessMetrics> = run.records.iter().map(ProcessMetrics::from).collect();

        let finished: Vec<&ProcessRecord> =
            run.records.iter().filter(|record| record.is_terminated()).collect();
        let last_completion = finished.iter().filter_map(|record| record.completion).max();
        let batch_return_time = match (run.first_arrival, last_completion) {
            (Some(first), Some(last)) => Some(last.saturating_sub(first)),
            _ => None,
        };
        let mean_return_time = mean(finished.iter().filter_map(|record| record.return_time.map(|t| t as f64)));
        let mean_normalized_return_time =
            mean(finished.iter().filter_map(|record| record.normalized_return_time));

        Ok(Self {
            cpu,
            processes,
            batch: BatchMetrics {
                completed: finished.len(),
                batch_return_time,
                mean_return_time,
                mean_normalized_return_time,
            },
        })
    }

    /// Looks up metrics by process name.
    pub fn process(&self, name: &str) -> Option<&ProcessMetrics> {
        self.processes.iter().find(|metrics| metrics.name == name)
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 {
        return None;
    }
    Some(sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_usage_derives_idle_and_shares() {
        let counters = CpuCounters {
            busy: 6,
            overhead: 2,
            idle: 2,
        };
        let usage = CpuUsage::from_counters(&counters, 10).expect("usage should compute");
        assert_eq!(usage.idle, 2);
        assert_eq!(usage.total, 10);
        assert_eq!(usage.busy_percent, 60.0);
        assert_eq!(usage.overhead_percent, 20.0);
        assert_eq!(usage.idle_percent, 20.0);
    }

    #[test]
    fn negative_idle_is_reported_not_clamped() {
        let counters = CpuCounters {
            busy: 5,
            overhead: 4,
            idle: 0,
        };
        let result = CpuUsage::from_counters(&counters, 8);
        assert!(matches!(result, Err(SimError::InconsistentAccounting(_))));
    }

    #[test]
    fn idle_counter_mismatch_is_reported() {
        let counters = CpuCounters {
            busy: 5,
            overhead: 1,
            idle: 1,
        };
        let result = CpuUsage::from_counters(&counters, 8);
        assert!(matches!(result, Err(SimError::InconsistentAccounting(_))));
    }

    #[test]
    fn zero_elapsed_time_has_zero_shares() {
        let usage = CpuUsage::from_counters(&CpuCounters::default(), 0)
            .expect("usage should compute");
        assert_eq!(usage.busy_percent, 0.0);
        assert_eq!(usage.idle_percent, 0.0);
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean(core::iter::empty()), None);
        assert_eq!(mean([1.0, 2.0, 6.0].into_iter()), Some(3.0));
    }
}
