use std::ffi::OsString;
use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};
use sched_core::{parse_sim_config, Algorithm, IoReturnDispatch, SimConfig, Tick};

use crate::CliError;

/// Builds the command-line interface definition.
pub fn command() -> Command {
    Command::new("tandasim")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Single-CPU process scheduling simulator")
        .arg(
            Arg::new("workload")
                .short('w')
                .long("workload")
                .value_name("FILE")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON array of process descriptors"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Run config in key = value form; flags override it"),
        )
        .arg(
            Arg::new("algorithm")
                .short('a')
                .long("algorithm")
                .value_parser(["fcfs", "rr", "spn", "srtn", "pe"])
                .help("Scheduling algorithm"),
        )
        .arg(tick_arg("tip", "Admission overhead (TIP) in ticks"))
        .arg(tick_arg("tcp", "Context-switch overhead (TCP) in ticks"))
        .arg(tick_arg("tfp", "Teardown overhead (TFP) in ticks"))
        .arg(tick_arg("quantum", "Round-robin time slice in ticks").short('q'))
        .arg(
            Arg::new("io-return")
                .long("io-return")
                .value_parser(["same-tick", "next-tick"])
                .help("When a process back from I/O may be dispatched"),
        )
        .arg(tick_arg("iteration-cap", "Safety cap on loop iterations"))
        .arg(
            Arg::new("export")
                .short('o')
                .long("export")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Write parameters, results and events as JSON"),
        )
        .arg(
            Arg::new("events")
                .long("events")
                .action(ArgAction::SetTrue)
                .help("Print the event log"),
        )
        .arg(
            Arg::new("gantt")
                .long("gantt")
                .action(ArgAction::SetTrue)
                .help("Print a text Gantt chart"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Raise log verbosity (repeatable)"),
        )
}

fn tick_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("TICKS")
        .value_parser(value_parser!(u64))
        .help(help)
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub workload: PathBuf,
    pub config: Option<PathBuf>,
    pub algorithm: Option<Algorithm>,
    pub tip: Option<Tick>,
    pub tcp: Option<Tick>,
    pub tfp: Option<Tick>,
    pub quantum: Option<Tick>,
    pub io_return: Option<IoReturnDispatch>,
    pub iteration_cap: Option<u64>,
    pub export: Option<PathBuf>,
    pub events: bool,
    pub gantt: bool,
    pub verbosity: u8,
}

impl CliOptions {
    /// Parses options from an argument list whose first item is the program name.
    pub fn parse_from<I, T>(args: I) -> Result<Self, CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = command().try_get_matches_from(args)?;
        let workload = matches
            .get_one::<PathBuf>("workload")
            .cloned()
            .ok_or(CliError::Usage("missing --workload"))?;
        let algorithm = matches
            .get_one::<String>("algorithm")
            .map(|name| Algorithm::parse(name))
            .transpose()?;
        let io_return = matches
            .get_one::<String>("io-return")
            .map(|rule| IoReturnDispatch::parse(rule))
            .transpose()?;
        Ok(Self {
            workload,
            config: matches.get_one::<PathBuf>("config").cloned(),
            algorithm,
            tip: matches.get_one::<u64>("tip").copied(),
            tcp: matches.get_one::<u64>("tcp").copied(),
            tfp: matches.get_one::<u64>("tfp").copied(),
            quantum: matches.get_one::<u64>("quantum").copied(),
            io_return,
            iteration_cap: matches.get_one::<u64>("iteration-cap").copied(),
            export: matches.get_one::<PathBuf>("export").cloned(),
            events: matches.get_flag("events"),
            gantt: matches.get_flag("gantt"),
            verbosity: matches.get_count("verbose"),
        })
    }

    /// Merges the optional config text with command-line overrides.
    pub fn resolve_config(&self, config_text: Option<&str>) -> Result<SimConfig, CliError> {
        let mut config = match (config_text, self.algorithm) {
            (Some(text), _) => parse_sim_config(text)?,
            (None, Some(algorithm)) => SimConfig::new(algorithm),
            (None, None) => {
                return Err(CliError::Usage(
                    "no algorithm given; pass --algorithm or a config file",
                ))
            }
        };
        if let Some(algorithm) = self.algorithm {
            config.algorithm = algorithm;
        }
        if let Some(tip) = self.tip {
            config.overheads.tip = tip;
        }
        if let Some(tcp) = self.tcp {
            config.overheads.tcp = tcp;
        }
        if let Some(tfp) = self.tfp {
            config.overheads.tfp = tfp;
        }
        if let Some(quantum) = self.quantum {
            config.quantum = Some(quantum);
        }
        if let Some(rule) = self.io_return {
            config.io_return = Some(rule);
        }
        if let Some(cap) = self.iteration_cap {
            config.iteration_cap = Some(cap);
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sched_core::{OverheadParams, SimError};

    fn parse(args: &[&str]) -> Result<CliOptions, CliError> {
        CliOptions::parse_from(std::iter::once("tandasim").chain(args.iter().copied()))
    }

    #[test]
    fn parses_flags_and_counts_verbosity() {
        let options = parse(&[
            "--workload", "tanda.json", "-a", "rr", "-q", "4", "--tcp", "2", "--gantt", "-vv",
        ])
        .expect("arguments should parse");

        assert_eq!(options.workload, PathBuf::from("tanda.json"));
        assert_eq!(options.algorithm, Some(Algorithm::RoundRobin));
        assert_eq!(options.quantum, Some(4));
        assert_eq!(options.tcp, Some(2));
        assert!(options.gantt);
        assert!(!options.events);
        assert_eq!(options.verbosity, 2);
    }

    #[test]
    fn workload_is_required() {
        let result = parse(&["-a", "fcfs"]);
        assert!(matches!(result, Err(CliError::Args(_))));
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let result = parse(&["-w", "x.json", "-a", "lottery"]);
        assert!(matches!(result, Err(CliError::Args(_))));
    }

    #[test]
    fn flags_override_config_text() {
        let options = parse(&["-w", "x.json", "--tip", "0", "--io-return", "same-tick"])
            .expect("arguments should parse");
        let config = options
            .resolve_config(Some("algorithm = \"pe\"\ntip = 2\ntcp = 1\ntfp = 1\n"))
            .expect("config should resolve");

        assert_eq!(config.algorithm, Algorithm::Priority);
        assert_eq!(config.overheads, OverheadParams::new(0, 1, 1));
        assert_eq!(config.io_return_rule(), IoReturnDispatch::SameTick);
    }

    #[test]
    fn missing_algorithm_is_a_usage_error() {
        let options = parse(&["-w", "x.json"]).expect("arguments should parse");
        assert!(matches!(
            options.resolve_config(None),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn round_robin_without_quantum_fails_validation() {
        let options = parse(&["-w", "x.json", "-a", "rr"]).expect("arguments should parse");
        assert!(matches!(
            options.resolve_config(None),
            Err(CliError::Sim(SimError::InvalidParameter("quantum")))
        ));
    }
}
