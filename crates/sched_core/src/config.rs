use alloc::string::{String, ToString};

use serde::{Deserialize, Serialize};
use sim_types::{OverheadParams, SimError, Tick};

/// Scheduling algorithms understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "fcfs")]
    Fcfs,
    #[serde(rename = "rr")]
    RoundRobin,
    #[serde(rename = "spn")]
    Spn,
    #[serde(rename = "srtn")]
    Srtn,
    #[serde(rename = "pe")]
    Priority,
}

impl Algorithm {
    /// All algorithms, in report order.
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Fcfs,
        Algorithm::RoundRobin,
        Algorithm::Spn,
        Algorithm::Srtn,
        Algorithm::Priority,
    ];

    /// Returns the short name used in config text and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Fcfs => "fcfs",
            Algorithm::RoundRobin => "rr",
            Algorithm::Spn => "spn",
            Algorithm::Srtn => "srtn",
            Algorithm::Priority => "pe",
        }
    }

    /// Parses a short name, case-insensitively.
    pub fn parse(value: &str) -> Result<Self, SimError> {
        let value = value.trim();
        Algorithm::ALL
            .iter()
            .copied()
            .find(|algorithm| algorithm.as_str().eq_ignore_ascii_case(value))
            .ok_or(SimError::InvalidParameter("algorithm"))
    }

    /// Returns true if the algorithm may take the CPU away from a running process.
    pub fn is_preemptive(self) -> bool {
        matches!(
            self,
            Algorithm::RoundRobin | Algorithm::Srtn | Algorithm::Priority
        )
    }

    /// I/O-return rule used when the config does not name one.
    pub fn default_io_return(self) -> IoReturnDispatch {
        match self {
            Algorithm::Priority => IoReturnDispatch::NextTick,
            _ => IoReturnDispatch::SameTick,
        }
    }
}

/// When a process that just finished I/O may be picked by a plain dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IoReturnDispatch {
    /// Eligible in the tick its I/O finished.
    SameTick,
    /// Eligible from the following tick; it may still preempt right away.
    NextTick,
}

impl IoReturnDispatch {
    /// Returns the config text spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            IoReturnDispatch::SameTick => "same-tick",
            IoReturnDispatch::NextTick => "next-tick",
        }
    }

    /// Parses the config text spelling.
    pub fn parse(value: &str) -> Result<Self, SimError> {
        match value.trim() {
            "same-tick" => Ok(IoReturnDispatch::SameTick),
            "next-tick" => Ok(IoReturnDispatch::NextTick),
            _ => Err(SimError::InvalidParameter("io_return")),
        }
    }
}

/// Parameters of a single simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    pub algorithm: Algorithm,
    pub overheads: OverheadParams,
    /// Round-robin time slice.
    pub quantum: Option<Tick>,
    /// Overrides the algorithm's default I/O-return rule.
    pub io_return: Option<IoReturnDispatch>,
    /// Overrides the derived safety cap on loop iterations.
    pub iteration_cap: Option<u64>,
}

impl SimConfig {
    /// Creates a config with zero overheads and no overrides.
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            overheads: OverheadParams::default(),
            quantum: None,
            io_return: None,
            iteration_cap: None,
        }
    }

    /// Sets the overhead window lengths.
    pub fn with_overheads(mut self, overheads: OverheadParams) -> Self {
        self.overheads = overheads;
        self
    }

    /// Sets the round-robin quantum.
    pub fn with_quantum(mut self, quantum: Tick) -> Self {
        self.quantum = Some(quantum);
        self
    }

    /// Forces an I/O-return rule.
    pub fn with_io_return(mut self, rule: IoReturnDispatch) -> Self {
        self.io_return = Some(rule);
        self
    }

    /// Forces the safety cap.
    pub fn with_iteration_cap(mut self, cap: u64) -> Self {
        self.iteration_cap = Some(cap);
        self
    }

    /// Returns the effective I/O-return rule.
    pub fn io_return_rule(&self) -> IoReturnDispatch {
        self.io_return
            .unwrap_or_else(|| self.algorithm.default_io_return())
    }

    /// Checks parameter ranges before a run is built.
    pub fn validate(&self) -> Result<(), SimError> {
        match (self.algorithm, self.quantum) {
            (_, Some(0)) => return Err(SimError::InvalidParameter("quantum")),
            (Algorithm::RoundRobin, None) => return Err(SimError::InvalidParameter("quantum")),
            _ => {}
        }
        if self.iteration_cap == Some(0) {
            return Err(SimError::InvalidParameter("iteration_cap"));
        }
        Ok(())
    }

    /// Serializes the config into the text format read by `parse_sim_config`.
    pub fn to_config_text(&self) -> String {
        let mut out = String::new();
        out.push_str("algorithm = \"");
        out.push_str(self.algorithm.as_str());
        out.push_str("\"\n");
        push_number(&mut out, "tip", self.overheads.tip);
        push_number(&mut out, "tcp", self.overheads.tcp);
        push_number(&mut out, "tfp", self.overheads.tfp);
        if let Some(quantum) = self.quantum {
            push_number(&mut out, "quantum", quantum);
        }
        if let Some(rule) = self.io_return {
            out.push_str("io_return = \"");
            out.push_str(rule.as_str());
            out.push_str("\"\n");
        }
        if let Some(cap) = self.iteration_cap {
            push_number(&mut out, "iteration_cap", cap);
        }
        out
    }
}

fn push_number(out: &mut String, key: &str, value: u64) {
    out.push_str(key);
    out.push_str(" = ");
    out.push_str(&value.to_string());
    out.push('\n');
}

/// Parses a `key = value` run config. `algorithm` is required.
pub fn parse_sim_config(input: &str) -> Result<SimConfig, SimError> {
    let mut algorithm: Option<Algorithm> = None;
    let mut tip: Option<Tick> = None;
    let mut tcp: Option<Tick> = None;
    let mut tfp: Option<Tick> = None;
    let mut quantum: Option<Tick> = None;
    let mut io_return: Option<IoReturnDispatch> = None;
    let mut iteration_cap: Option<u64> = None;

    for line in input.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next().map(str::trim).unwrap_or("");
        let value = parts
            .next()
            .map(str::trim)
            .ok_or(SimError::InvalidConfig("missing '='"))?;
        match key {
            "algorithm" => {
                ensure_unset(&algorithm, "algorithm")?;
                let name = parse_string(value, "algorithm")?;
                algorithm = Some(
                    Algorithm::parse(name).map_err(|_| SimError::InvalidConfig("algorithm"))?,
                );
            }
            "tip" => {
                ensure_unset(&tip, "tip")?;
                tip = Some(parse_number(value, "tip")?);
            }
            "tcp" => {
                ensure_unset(&tcp, "tcp")?;
                tcp = Some(parse_number(value, "tcp")?);
            }
            "tfp" => {
                ensure_unset(&tfp, "tfp")?;
                tfp = Some(parse_number(value, "tfp")?);
            }
            "quantum" => {
                ensure_unset(&quantum, "quantum")?;
                quantum = Some(parse_number(value, "quantum")?);
            }
            "io_return" => {
                ensure_unset(&io_return, "io_return")?;
                let rule = parse_string(value, "io_return")?;
                io_return = Some(
                    IoReturnDispatch::parse(rule)
                        .map_err(|_| SimError::InvalidConfig("io_return"))?,
                );
            }
            "iteration_cap" => {
                ensure_unset(&iteration_cap, "iteration_cap")?;
                iteration_cap = Some(parse_number(value, "iteration_cap")?);
            }
            _ => return Err(SimError::InvalidConfig("unknown key")),
        }
    }

    let algorithm = algorithm.ok_or(SimError::InvalidConfig("algorithm"))?;
    Ok(SimConfig {
        algorithm,
        overheads: OverheadParams::new(
            tip.unwrap_or_default(),
            tcp.unwrap_or_default(),
            tfp.unwrap_or_default(),
        ),
        quantum,
        io_return,
        iteration_cap,
    })
}

fn ensure_unset<T>(field: &Option<T>, key: &'static str) -> Result<(), SimError> {
    if field.is_some() {
        return Err(SimError::InvalidConfig(key));
    }
    Ok(())
}

fn parse_string<'a>(value: &'a str, key: &'static str) -> Result<&'a str, SimError> {
    let trimmed = value.trim();
    if !trimmed.starts_with('"') || !trimmed.ends_with('"') || trimmed.len() < 2 {
        return Err(SimError::InvalidConfig(key));
    }
    Ok(&trimmed[1..trimmed.len() - 1])
}

fn parse_number(value: &str, key: &'static str) -> Result<u64, SimError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| SimError::InvalidConfig(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config_success() {
        let config = parse_sim_config(
            r#"
            # lab run
            algorithm = "rr"
            tip = 1
            tcp = 2
            tfp = 1
            quantum = 4
            io_return = "next-tick"
            iteration_cap = 5000
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.algorithm, Algorithm::RoundRobin);
        assert_eq!(config.overheads, OverheadParams::new(1, 2, 1));
        assert_eq!(config.quantum, Some(4));
        assert_eq!(config.io_return_rule(), IoReturnDispatch::NextTick);
        assert_eq!(config.iteration_cap, Some(5000));
    }

    #[test]
    fn parse_config_defaults_missing_overheads_to_zero() {
        let config = parse_sim_config(r#"algorithm = "srtn""#).expect("config should parse");
        assert_eq!(config.overheads, OverheadParams::default());
        assert_eq!(config.quantum, None);
        assert_eq!(config.io_return_rule(), IoReturnDispatch::SameTick);
    }

    #[test]
    fn parse_config_rejects_missing_algorithm() {
        let result = parse_sim_config("tip = 1");
        assert_eq!(result, Err(SimError::InvalidConfig("algorithm")));
    }

    #[test]
    fn parse_config_rejects_duplicate_keys() {
        let result = parse_sim_config(
            r#"
            algorithm = "fcfs"
            tcp = 1
            tcp = 2
            "#,
        );
        assert_eq!(result, Err(SimError::InvalidConfig("tcp")));
    }

    #[test]
    fn parse_config_rejects_unquoted_algorithm_and_bad_numbers() {
        assert_eq!(
            parse_sim_config("algorithm = fcfs"),
            Err(SimError::InvalidConfig("algorithm"))
        );
        assert_eq!(
            parse_sim_config("algorithm = \"fcfs\"\ntip = -1"),
            Err(SimError::InvalidConfig("tip"))
        );
        assert_eq!(
            parse_sim_config("algorithm = \"fcfs\"\nspeed = 3"),
            Err(SimError::InvalidConfig("unknown key"))
        );
    }

    #[test]
    fn config_text_round_trips_through_parser() {
        let config = SimConfig::new(Algorithm::Priority)
            .with_overheads(OverheadParams::new(1, 1, 2))
            .with_io_return(IoReturnDispatch::SameTick);
        let parsed = parse_sim_config(&config.to_config_text()).expect("config should parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn validate_requires_positive_quantum_for_round_robin() {
        let missing = SimConfig::new(Algorithm::RoundRobin);
        assert_eq!(missing.validate(), Err(SimError::InvalidParameter("quantum")));
        let zero = SimConfig::new(Algorithm::RoundRobin).with_quantum(0);
        assert_eq!(zero.validate(), Err(SimError::InvalidParameter("quantum")));
        let ok = SimConfig::new(Algorithm::RoundRobin).with_quantum(3);
        assert_eq!(ok.validate(), Ok(()));
        assert!(SimConfig::new(Algorithm::Fcfs).validate().is_ok());
    }

    #[test]
    fn algorithm_parse_is_case_insensitive() {
        assert_eq!(Algorithm::parse("PE"), Ok(Algorithm::Priority));
        assert_eq!(Algorithm::parse(" Rr "), Ok(Algorithm::RoundRobin));
        assert!(Algorithm::parse("lottery").is_err());
        assert!(Algorithm::Srtn.is_preemptive());
        assert!(!Algorithm::Spn.is_preemptive());
    }
}
