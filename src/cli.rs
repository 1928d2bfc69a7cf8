// Command line interface
use crate::domain::device::FloorIndex;
use clap::{Parser, Subcommand};

/// Building telemetry dashboard: API server and headless explorer
#[derive(Debug, Parser)]
#[command(name = "floor-telemetry", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the telemetry API (default)
    Serve,

    /// Select a floor and device against the API and print each render
    Explore {
        /// Floor to select
        floor: FloorIndex,

        /// Device to select on that floor
        device: String,

        /// Field to pin to the history graph
        field: Option<String>,
    },
}

impl Cli {
    /// The requested subcommand, `serve` when none was given
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}
