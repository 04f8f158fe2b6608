use std::fs;
use std::path::Path;

use sched_core::ProcessDescriptor;

use crate::CliError;

/// Parses a JSON array of process descriptors.
///
/// Both the English field names and the legacy Spanish ones are accepted.
pub fn parse_workload(text: &str) -> Result<Vec<ProcessDescriptor>, CliError> {
    let processes: Vec<ProcessDescriptor> = serde_json::from_str(text)?;
    Ok(processes)
}

/// Reads and parses a workload file.
pub fn load_workload(path: &Path) -> Result<Vec<ProcessDescriptor>, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let processes = parse_workload(&text)?;
    log::info!("loaded {} processes from {}", processes.len(), path.display());
    Ok(processes)
}
