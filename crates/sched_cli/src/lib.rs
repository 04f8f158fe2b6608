pub mod args;
pub mod export;
pub mod logger;
pub mod workload;

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use sched_core::{simulate, Outcome, SimError, Statistics};
use sched_report::{format_report, ReportOptions};

pub use args::{command, CliOptions};
pub use export::{export_json, write_export, ExportDocument};
pub use workload::{load_workload, parse_workload};

/// Errors surfaced by the command-line driver.
#[derive(Debug)]
pub enum CliError {
    /// Argument parsing failed or help/version was requested.
    Args(clap::Error),
    /// A file could not be read or written.
    Io { path: PathBuf, source: io::Error },
    /// Workload JSON is malformed or an export failed to serialize.
    Json(serde_json::Error),
    /// The simulator rejected its input or accounting failed.
    Sim(SimError),
    /// Options are individually valid but do not combine.
    Usage(&'static str),
}

impl CliError {
    /// Returns a stable, human-readable error label.
    pub fn as_str(&self) -> &'static str {
        match self {
            CliError::Args(_) => "invalid arguments",
            CliError::Io { .. } => "io error",
            CliError::Json(_) => "invalid json",
            CliError::Sim(err) => err.as_str(),
            CliError::Usage(_) => "usage error",
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Args(err) => write!(f, "{}", err),
            CliError::Io { path, source } => {
                write!(f, "{}: {}: {}", self.as_str(), path.display(), source)
            }
            CliError::Json(err) => write!(f, "{}: {}", self.as_str(), err),
            CliError::Sim(err) => write!(f, "{}", err),
            CliError::Usage(message) => write!(f, "{}: {}", self.as_str(), message),
        }
    }
}

impl std::error::Error for CliError {}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> Self {
        CliError::Args(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Json(err)
    }
}

impl From<SimError> for CliError {
    fn from(err: SimError) -> Self {
        CliError::Sim(err)
    }
}

/// How a run ended, for the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    CapReached,
}

/// Runs a simulation from in-memory workload and config text.
pub fn run_simulation(
    options: &CliOptions,
    workload_text: &str,
    config_text: Option<&str>,
) -> Result<(Outcome, Statistics), CliError> {
    let config = options.resolve_config(config_text)?;
    let processes = parse_workload(workload_text)?;
    let result = simulate(processes, config)?;
    Ok(result)
}

/// Loads inputs from disk, runs, prints the report and writes the export.
pub fn run(options: &CliOptions) -> Result<RunStatus, CliError> {
    let config_text = match &options.config {
        Some(path) => Some(fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?),
        None => None,
    };
    let config = options.resolve_config(config_text.as_deref())?;
    let processes = load_workload(&options.workload)?;
    let (outcome, stats) = simulate(processes, config)?;

    let report = format_report(
        &outcome,
        &stats,
        ReportOptions {
            events: options.events,
            gantt: options.gantt,
        },
    );
    print!("{}", report);

    if let Some(path) = &options.export {
        write_export(path, &outcome, &stats)?;
    }
    if outcome.is_completed() {
        Ok(RunStatus::Completed)
    } else {
        Ok(RunStatus::CapReached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TANDA: &str = r#"[
        {"nombre": "P1", "tiempo_arribo": 0, "cantidad_rafagas_cpu": 4, "duracion_rafaga_cpu": 3, "duracion_rafaga_es": 2, "prioridad_externa": 3},
        {"nombre": "P2", "tiempo_arribo": 1, "cantidad_rafagas_cpu": 2, "duracion_rafaga_cpu": 8, "duracion_rafaga_es": 5, "prioridad_externa": 1},
        {"nombre": "P3", "tiempo_arribo": 3, "cantidad_rafagas_cpu": 5, "duracion_rafaga_cpu": 2, "duracion_rafaga_es": 1, "prioridad_externa": 4},
        {"nombre": "P4", "tiempo_arribo": 6, "cantidad_rafagas_cpu": 3, "duracion_rafaga_cpu": 6, "duracion_rafaga_es": 4, "prioridad_externa": 2},
        {"nombre": "P5", "tiempo_arribo": 10, "cantidad_rafagas_cpu": 1, "duracion_rafaga_cpu": 10, "duracion_rafaga_es": 0, "prioridad_externa": 5}
    ]"#;

    fn options(args: &[&str]) -> CliOptions {
        CliOptions::parse_from(std::iter::once("tandasim").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn run_simulation_completes_lab_workload() {
        let options = options(&["-w", "tanda.json", "-a", "rr", "-q", "5"]);
        let (outcome, stats) =
            run_simulation(&options, TANDA, Some("algorithm = \"rr\"\ntip = 1\ntcp = 1\ntfp = 1\n"))
                .expect("simulation should succeed");

        assert!(outcome.is_completed());
        assert_eq!(stats.batch.completed, 5);
        assert_eq!(stats.cpu.busy, 12 + 16 + 10 + 18 + 10);
    }

    #[test]
    fn empty_workload_surfaces_as_sim_error() {
        let options = options(&["-w", "tanda.json", "-a", "fcfs"]);
        let result = run_simulation(&options, "[]", None);
        assert!(matches!(result, Err(CliError::Sim(SimError::EmptyWorkload))));
    }

    #[test]
    fn run_reports_missing_workload_file() {
        let options = options(&["-w", "/nonexistent/tanda.json", "-a", "fcfs"]);
        match run(&options) {
            Err(CliError::Io { path, .. }) => assert!(path.ends_with("tanda.json")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn error_messages_carry_labels() {
        let err = CliError::from(SimError::DuplicateProcess(3));
        assert_eq!(err.as_str(), "duplicate process name");
        assert_eq!(err.to_string(), "duplicate process name: entry 3");
        let usage = CliError::Usage("no algorithm given");
        assert_eq!(usage.to_string(), "usage error: no algorithm given");
    }
}
