use std::{
    io::{self, IsTerminal},
    process::ExitCode,
};

use aamva_barcodes::logging::{init_logging, LogConfig};
use clap::Parser;

mod cli;
mod commands;

use crate::cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_config = LogConfig {
        use_env_filter: !cli.verbosity.is_present(),
        ..LogConfig::default()
    }
    .with_level_filter(cli.verbosity.tracing_level_filter())
    .with_format(cli.log_format.into())
    .with_ansi(io::stderr().is_terminal());
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    let result = match &cli.command {
        Command::Encode(args) => commands::run_encode(args),
        Command::Inspect(args) => commands::run_inspect(args),
        Command::Jurisdictions => commands::run_jurisdictions(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
