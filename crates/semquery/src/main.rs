#![forbid(unsafe_code)]

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use clap::error::ErrorKind;
use semquery::cli::app::{Cli, Command, RuntimeArgs};
use semquery::cli::commands;
use semquery::cli::envelope::EnvelopeFailure;
use semquery::config::{DEFAULT_LOG_FILTER, LOG_FILTER_ENV, RuntimePaths};
use tracing_subscriber::EnvFilter;

const EXIT_SUCCESS: i32 = 0;
const EXIT_RUNTIME_FAILURE: i32 = 1;
const EXIT_USAGE_ERROR: i32 = 64;

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return exit_code_for_parse_error(error),
    };
    init_tracing();

    let command_name = cli.command.name();
    eprintln!("semquery: starting `{command_name}`");

    match execute(cli) {
        Ok(()) => {
            eprintln!("semquery: completed `{command_name}` (exit_code={EXIT_SUCCESS})");
            EXIT_SUCCESS
        }
        Err(error) => {
            report_failure(&error);
            eprintln!("semquery: failed `{command_name}` (exit_code={EXIT_RUNTIME_FAILURE})");
            EXIT_RUNTIME_FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Fields(args) => {
            let runtime_paths = resolve_runtime_paths(&cli.runtime)?;
            commands::fields::run(&args, &runtime_paths)
        }
        Command::Build(args) => {
            let runtime_paths = resolve_runtime_paths(&cli.runtime)?;
            commands::build::run(&args, &runtime_paths)
        }
        Command::Replay(args) => {
            let runtime_paths = resolve_runtime_paths(&cli.runtime)?;
            commands::replay::run(&args, &runtime_paths)
        }
        Command::Schema(args) => commands::schema::run(&args),
    }
}

/// Envelope failures go to stdout like any other envelope; the error chain
/// always goes to stderr.
fn report_failure(error: &anyhow::Error) {
    if let Some(EnvelopeFailure(envelope)) = error.downcast_ref::<EnvelopeFailure>() {
        if let Err(print_error) = envelope.print() {
            eprintln!("{print_error:#}");
        }
    }
    eprintln!("{error:#}");
}

fn exit_code_for_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = error.print();
            EXIT_SUCCESS
        }
        _ => {
            let _ = error.print();
            EXIT_USAGE_ERROR
        }
    }
}

fn resolve_runtime_paths(args: &RuntimeArgs) -> Result<RuntimePaths> {
    let home_dir = match &args.home_dir {
        Some(path) => path.clone(),
        None => std::env::var_os("HOME")
            .map(PathBuf::from)
            .ok_or_else(|| anyhow!("HOME is not set; pass --home-dir"))?,
    };

    let cwd = match &args.cwd {
        Some(path) => path.clone(),
        None => std::env::current_dir()?,
    };

    semquery::config::resolve_runtime_paths(&home_dir, &cwd)
}
