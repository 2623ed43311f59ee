//! CLI module for Kinegraph.
//!
//! Subcommands:
//! - `layout`: settle a graph headless and print the resulting positions

mod layout;

use clap::{Parser, Subcommand};

pub use layout::{LayoutCommand, ModeArg};

/// Kinegraph - force-directed graph layout with gesture navigation
#[derive(Parser)]
#[command(name = "kinegraph")]
#[command(about = "Force-directed graph layout core with gesture navigation")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the layout engine headless over a graph JSON file
    Layout(LayoutCommand),
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Layout(cmd) => cmd.run().await,
        }
    }
}
