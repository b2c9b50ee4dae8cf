//! Eyestab CLI - Eye region stabilization for video frame sequences.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::stabilize::{self, StabilizeArgs};
use commands::{Cli, Commands, ExitCode};
use config::AppConfig;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = match cli.command {
        Some(Commands::Stabilize(args)) => run_stabilize(args),
        Some(Commands::Presets(ref args)) => match commands::presets::run(args) {
            Ok(()) => ExitCode::Success,
            Err(e) => {
                eprintln!("error: {e:#}");
                ExitCode::Error
            }
        },
        None => {
            // Default behavior: stabilize with flattened args
            if cli.stabilize.paths.is_empty() {
                eprintln!("error: No paths specified. Use --help for usage information.");
                return ExitCode::Error.into();
            }
            run_stabilize(cli.stabilize)
        }
    };

    exit_code.into()
}

fn run_stabilize(args: StabilizeArgs) -> ExitCode {
    let result = StabilizeArgs::with_config(args, &AppConfig::load())
        .and_then(|args| stabilize::run(&args));
    match result {
        Ok(result) => result.exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    }
}
