use std::process::ExitCode;

use sched_cli::{logger, CliError, CliOptions, RunStatus};

fn main() -> ExitCode {
    let options = match CliOptions::parse_from(std::env::args_os()) {
        Ok(options) => options,
        Err(CliError::Args(err)) => err.exit(),
        Err(err) => {
            eprintln!("tandasim: {}", err);
            return ExitCode::from(1);
        }
    };
    if let Err(err) = logger::init(options.verbosity) {
        eprintln!("tandasim: logger unavailable: {}", err);
    }

    match sched_cli::run(&options) {
        Ok(RunStatus::Completed) => ExitCode::SUCCESS,
        Ok(RunStatus::CapReached) => {
            log::warn!("run stopped at the safety cap; results are partial");
            ExitCode::from(2)
        }
        Err(err) => {
            log::error!("{}", err);
            ExitCode::from(1)
        }
    }
}
