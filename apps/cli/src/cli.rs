//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(
    name = "vigil",
    version,
    about = "Check keyed request data against a rule schema",
    long_about = "Check keyed request data against a declarative rule schema.\n\n\
                  Schemas are JSON or TOML documents holding rules, messages, titles \
                  and scenes. Results are written to stdout as JSON."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file (default: ./vigil.toml when present).
    #[arg(long, value_name = "PATH", global = true, env = "VIGIL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, global = true)]
    pub log_format: Option<LogFormatArg>,

    /// Log level filter, e.g. `debug` or `vigil_validator=trace`.
    #[arg(long = "log-level", value_name = "FILTER", global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate a data document and print the verdict.
    Check(CheckArgs),

    /// List the scenes a schema defines.
    Scenes(SchemaArg),
}

#[derive(Args)]
pub struct SchemaArg {
    /// Rule schema (`.json` or `.toml`).
    #[arg(long, short, value_name = "PATH")]
    pub schema: PathBuf,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub schema: SchemaArg,

    /// Data document to check; `-` reads stdin.
    #[arg(long, short, value_name = "PATH", default_value = "-")]
    pub data: PathBuf,

    /// Scene to apply.
    #[arg(long, value_name = "NAME")]
    pub scene: Option<String>,

    /// Report every failing field instead of stopping at the first.
    #[arg(long)]
    pub batch: bool,

    /// Reject input keys that no rule covers.
    #[arg(long)]
    pub security: bool,

    /// Drop rule fields whose value is null from the cleaned output.
    #[arg(long = "filter-nulls")]
    pub filter_nulls: bool,
}

/// CLI log format choices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatArg {
    #[default]
    Compact,
    Pretty,
    Json,
}
