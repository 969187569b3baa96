//! # sdt CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Uses clap derive macros; handlers return a process exit code, and any
//! error that escapes a handler maps to exit code 3.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sdt_cli::prepare::{run_prepare, PrepareArgs};
use sdt_cli::validate::{run_validate, ValidateArgs};

/// SDT document validator.
///
/// Validates template/rule/agent/project/execution/event/billing JSON
/// documents against the spec schemas, and checks cross-references between
/// rules/agents and the template they target.
#[derive(Parser, Debug)]
#[command(name = "sdt", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a JSON document against its kind's schema.
    Validate(ValidateArgs),

    /// Interactive helper for the agent pre-preparation checklist.
    #[command(name = "prepare-agent")]
    Prepare(PrepareArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::Prepare(args) => run_prepare(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Unexpected error: {e:#}");
            ExitCode::from(3)
        }
    }
}
