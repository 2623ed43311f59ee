//! Graph data model shared across the worker boundary.
//!
//! These types are structurally copied between the interactive side and the
//! physics worker, so all of them are plain serde values with no interior
//! references.

use serde::{Deserialize, Serialize};

/// Relationship tag carried by an edge.
///
/// Affects rendering only; spring attraction treats every kind the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    #[default]
    Forward,
    Backlink,
    Accelerates,
    Inhibits,
}

/// A simulated node. Position and velocity are owned by the simulation;
/// everything else is identity and rendering metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub vx: f32,
    #[serde(default)]
    pub vy: f32,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub year: Option<i32>,
}

fn default_radius() -> f32 {
    8.0
}

impl Node {
    /// New node at the origin; the simulation scatters unplaced nodes
    /// on first load.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            radius: default_radius(),
            cluster: String::new(),
            year: None,
        }
    }
}

/// A directed edge between two node ids.
///
/// An edge is only simulated while both endpoints exist in the current node
/// set; dangling edges are dropped silently at snapshot load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind: EdgeKind::default(),
        }
    }
}

/// Full node/edge snapshot posted to the physics worker on structural change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Viewport dimensions in layout units (pixels on the host side).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

/// Layout algorithm selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    Force,
    Grid,
    Radial,
}

/// Node position reported back across the worker boundary after a step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodePosition {
    pub id: String,
    pub x: f32,
    pub y: f32,
}
