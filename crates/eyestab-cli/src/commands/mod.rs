//! CLI command definitions and handlers.

pub mod presets;
pub mod stabilize;

use clap::{Parser, Subcommand};

/// Eyestab - Eye region stabilization for video frame sequences
#[derive(Parser)]
#[command(name = "eyestab")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared stabilize arguments (paths, preset, flags).
    #[command(flatten)]
    pub stabilize: stabilize::StabilizeArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Stabilize eyes across a frame sequence
    Stabilize(stabilize::StabilizeArgs),
    /// List population presets and suppression modes
    Presets(presets::PresetsArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Frames processed.
    Success = 0,
    /// Landmarks were supplied but no frame contained a face.
    NoFace = 1,
    /// Invalid input or configuration.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
