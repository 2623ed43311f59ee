//! Layout subcommand - settle a graph from a JSON file without a renderer.
//!
//! Exercises the physics worker end to end: load a snapshot, step until the
//! energy floor or the iteration cap, print positions and final energy as
//! JSON on stdout.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::config::Config;
use crate::model::{GraphSnapshot, LayoutMode, NodePosition, Viewport};
use crate::worker::PhysicsWorker;

/// CLI-facing layout mode selector.
#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Force,
    Grid,
    Radial,
}

impl From<ModeArg> for LayoutMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Force => LayoutMode::Force,
            ModeArg::Grid => LayoutMode::Grid,
            ModeArg::Radial => LayoutMode::Radial,
        }
    }
}

/// Settle a graph and print node positions.
#[derive(Parser)]
pub struct LayoutCommand {
    /// Path to a JSON file with {"nodes": [...], "edges": [...]}
    pub input: PathBuf,

    /// Layout algorithm
    #[arg(long, value_enum, default_value = "force")]
    pub mode: ModeArg,

    /// Maximum integration steps
    #[arg(long, default_value = "1000")]
    pub steps: usize,

    /// Viewport width in layout units
    #[arg(long, default_value = "1280")]
    pub width: f32,

    /// Viewport height in layout units
    #[arg(long, default_value = "720")]
    pub height: f32,

    /// Cluster ordering for radial mode, innermost first
    #[arg(long, value_delimiter = ',')]
    pub clusters: Vec<String>,
}

#[derive(Serialize)]
struct LayoutResult {
    nodes: Vec<NodePosition>,
    total_energy: f32,
    steps_run: usize,
}

impl LayoutCommand {
    /// Run the layout command.
    pub async fn run(self) -> color_eyre::Result<()> {
        let config = Config::load()?;

        let content = std::fs::read_to_string(&self.input)?;
        let snapshot: GraphSnapshot = serde_json::from_str(&content)?;
        tracing::info!(
            nodes = snapshot.nodes.len(),
            edges = snapshot.edges.len(),
            "loaded graph snapshot"
        );

        let viewport = Viewport {
            width: self.width,
            height: self.height,
        };
        let worker = PhysicsWorker::spawn(config.physics.clone());
        worker
            .replace(snapshot, viewport, self.mode.into(), self.clusters)
            .await?;

        let mut reply = worker.step().await?;
        let mut steps_run = 1;
        while steps_run < self.steps && reply.total_energy > config.physics.energy_floor {
            reply = worker.step().await?;
            steps_run += 1;
        }
        tracing::info!(steps_run, energy = reply.total_energy, "layout settled");

        let result = LayoutResult {
            nodes: reply.positions,
            total_energy: reply.total_energy,
            steps_run,
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
        Ok(())
    }
}
