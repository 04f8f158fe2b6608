use std::fs;
use std::path::Path;

use serde::Serialize;
use sched_core::{
    Algorithm, BatchMetrics, CpuUsage, EventLog, IoReturnDispatch, Outcome, OverheadParams,
    ProcessMetrics, Statistics, Tick,
};

use crate::CliError;

/// JSON document written by `--export`.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub simulation: SimulationSection,
    pub processes: &'a [ProcessMetrics],
    pub cpu: &'a CpuUsage,
    pub batch: &'a BatchMetrics,
    pub events: &'a EventLog,
}

/// Parameters and outcome of the exported run.
#[derive(Debug, Serialize)]
pub struct SimulationSection {
    pub algorithm: Algorithm,
    #[serde(flatten)]
    pub overheads: OverheadParams,
    pub quantum: Option<Tick>,
    pub io_return: IoReturnDispatch,
    pub end_tick: Tick,
    pub iterations: u64,
    pub outcome: &'static str,
}

impl<'a> ExportDocument<'a> {
    /// Collects the exported view of a run.
    pub fn new(outcome: &'a Outcome, stats: &'a Statistics) -> Self {
        let run = outcome.run();
        Self {
            simulation: SimulationSection {
                algorithm: run.config.algorithm,
                overheads: run.config.overheads,
                quantum: run.config.quantum,
                io_return: run.config.io_return_rule(),
                end_tick: run.end_tick,
                iterations: run.iterations,
                outcome: if outcome.is_completed() {
                    "completed"
                } else {
                    "cap_reached"
                },
            },
            processes: &stats.processes,
            cpu: &stats.cpu,
            batch: &stats.batch,
            events: &run.events,
        }
    }
}

/// Renders the export document as pretty JSON.
pub fn export_json(outcome: &Outcome, stats: &Statistics) -> Result<String, CliError> {
    let text = serde_json::to_string_pretty(&ExportDocument::new(outcome, stats))?;
    Ok(text)
}

/// Writes the export document to `path`.
pub fn write_export(path: &Path, outcome: &Outcome, stats: &Statistics) -> Result<(), CliError> {
    let text = export_json(outcome, stats)?;
    fs::write(path, text).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("exported run to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sched_core::{simulate, ProcessDescriptor, SimConfig};

    fn sample() -> (Outcome, Statistics) {
        simulate(
            vec![
                ProcessDescriptor::new("P1", 0, 2, 2, 1, 2),
                ProcessDescriptor::new("P2", 1, 1, 3, 0, 4),
            ],
            SimConfig::new(Algorithm::Priority).with_overheads(OverheadParams::new(1, 1, 1)),
        )
        .expect("simulation should succeed")
    }

    #[test]
    fn export_contains_parameters_results_and_events() {
        let (outcome, stats) = sample();
        let text = export_json(&outcome, &stats).expect("export should serialize");
        let value: serde_json::Value = serde_json::from_str(&text).expect("export should be JSON");

        assert_eq!(value["simulation"]["algorithm"], "pe");
        assert_eq!(value["simulation"]["tip"], 1);
        assert_eq!(value["simulation"]["io_return"], "next-tick");
        assert_eq!(value["simulation"]["outcome"], "completed");
        assert_eq!(value["processes"].as_array().map(Vec::len), Some(2));
        assert_eq!(
            value["events"].as_array().map(Vec::len),
            Some(outcome.run().events.len())
        );
        assert_eq!(value["events"][0]["kind"], "arrival");
        assert_eq!(value["cpu"]["total"], stats.cpu.total);
    }

    #[test]
    fn export_is_byte_identical_across_runs() {
        let (first, first_stats) = sample();
        let (second, second_stats) = sample();
        assert_eq!(
            export_json(&first, &first_stats).expect("export should serialize"),
            export_json(&second, &second_stats).expect("export should serialize")
        );
    }
}
