//! vigil: check request data against a rule schema from the command line.
//!
//! Exit codes: `0` accepted, `1` rejected, `2` the check could not run.

use std::process::ExitCode;

use clap::Parser;
use serde_json::Value;

mod cli;
mod commands;
mod config;
mod logging;

use crate::cli::{Cli, Command};
use crate::commands::{run_check, run_scenes};
use crate::config::Settings;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let settings = Settings::load(cli)?;
    logging::init(&settings.log)?;

    match &cli.command {
        Command::Check(args) => {
            let report = run_check(args, &settings.with_check_flags(args))?;
            print_json(&report.body)?;
            Ok(if report.accepted {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Command::Scenes(args) => {
            print_json(&run_scenes(args)?)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
