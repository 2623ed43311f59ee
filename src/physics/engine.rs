//! Force-directed simulation engine.
//!
//! One `step` per invocation: accumulate forces into velocities, damp,
//! clamp, integrate, and report total kinetic energy. The engine owns its
//! node/edge working copy exclusively between worker messages, so no
//! locking is involved.

use std::collections::{HashMap, HashSet};

use glam::Vec2;

use crate::config::PhysicsConfig;
use crate::model::{GraphSnapshot, LayoutMode, Node, NodePosition, Viewport};

use super::layout::{cluster_ranks, grid_target, radial_target, scatter_position};

/// Graph simulation state, indexed by node identity.
pub struct Simulation {
    nodes: Vec<Node>,
    /// Edges resolved to node indices; dangling edges never enter.
    edges: Vec<(usize, usize)>,
    index: HashMap<String, usize>,
    /// Nodes under direct drag: simulation is overridden until release.
    held: HashSet<String>,
    mode: LayoutMode,
    viewport: Viewport,
    cluster_ranks: HashMap<String, usize>,
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            index: HashMap::new(),
            held: HashSet::new(),
            mode: LayoutMode::Force,
            viewport: Viewport::default(),
            cluster_ranks: HashMap::new(),
        }
    }

    /// Replace the full node/edge snapshot. Called on load, filter, and
    /// data reload. Nodes at the origin are treated as unplaced and
    /// scattered deterministically; dangling edges are dropped silently.
    pub fn replace(
        &mut self,
        snapshot: GraphSnapshot,
        viewport: Viewport,
        mode: LayoutMode,
        cluster_order: &[String],
    ) {
        self.viewport = viewport;
        self.mode = mode;
        self.cluster_ranks = cluster_ranks(cluster_order);
        self.held.clear();

        self.nodes = snapshot.nodes;
        let n = self.nodes.len();
        for (i, node) in self.nodes.iter_mut().enumerate() {
            if node.x == 0.0 && node.y == 0.0 {
                let pos = scatter_position(i, n, &viewport);
                node.x = pos.x;
                node.y = pos.y;
            }
        }

        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), i))
            .collect();

        let total = snapshot.edges.len();
        self.edges = snapshot
            .edges
            .iter()
            .filter_map(|e| Some((*self.index.get(&e.source)?, *self.index.get(&e.target)?)))
            .collect();
        if self.edges.len() < total {
            tracing::debug!(
                dropped = total - self.edges.len(),
                "dropped dangling edges"
            );
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Direct manipulation: place the node and zero its velocity. The node
    /// ignores forces until `release`.
    pub fn drag_to(&mut self, id: &str, x: f32, y: f32) {
        if let Some(&i) = self.index.get(id) {
            let node = &mut self.nodes[i];
            node.x = x;
            node.y = y;
            node.vx = 0.0;
            node.vy = 0.0;
            self.held.insert(id.to_string());
        }
    }

    pub fn release(&mut self, id: &str) {
        self.held.remove(id);
    }

    /// Advance one integration step. Returns total kinetic energy (Σ v²),
    /// the consumer's idle/convergence signal. Stepping an empty graph is
    /// a no-op returning zero.
    pub fn step(&mut self, config: &PhysicsConfig) -> f32 {
        let n = self.nodes.len();
        if n == 0 {
            return 0.0;
        }

        match self.mode {
            LayoutMode::Force => self.apply_forces(config),
            LayoutMode::Grid => self.apply_targets(config.grid_strength, |sim, i| {
                grid_target(i, sim.nodes.len(), &sim.viewport)
            }),
            LayoutMode::Radial => self.apply_targets(config.radial_strength, |sim, i| {
                let node = &sim.nodes[i];
                let rank = sim
                    .cluster_ranks
                    .get(&node.cluster)
                    .copied()
                    .unwrap_or(sim.cluster_ranks.len());
                radial_target(&node.id, rank, config, &sim.viewport)
            }),
        }

        // Centering, damping, clamping, and integration apply uniformly
        let center = self.viewport.center();
        let mut energy = 0.0;
        for node in &mut self.nodes {
            if self.held.contains(&node.id) {
                node.vx = 0.0;
                node.vy = 0.0;
                continue;
            }

            let mut velocity = Vec2::new(node.vx, node.vy);
            velocity -= (Vec2::new(node.x, node.y) - center) * config.centering;
            velocity *= config.damping;

            let speed = velocity.length();
            if speed > config.max_speed {
                velocity = velocity / speed * config.max_speed;
            } else if speed < config.min_speed {
                velocity = Vec2::ZERO;
            }

            node.vx = velocity.x;
            node.vy = velocity.y;
            node.x += velocity.x;
            node.y += velocity.y;
            energy += velocity.length_squared();
        }
        energy
    }

    /// Force-directed pass: pairwise inverse-square repulsion plus Hooke
    /// spring attraction along edges.
    fn apply_forces(&mut self, config: &PhysicsConfig) {
        let n = self.nodes.len();

        for i in 0..n {
            for j in (i + 1)..n {
                let delta = Vec2::new(
                    self.nodes[i].x - self.nodes[j].x,
                    self.nodes[i].y - self.nodes[j].y,
                );
                // Epsilon guards the singularity for coincident nodes
                let dist = delta.length() + config.epsilon;
                let force = config.repulsion / (dist * dist);
                let dir = delta.normalize_or_zero();

                self.nodes[i].vx += dir.x * force;
                self.nodes[i].vy += dir.y * force;
                self.nodes[j].vx -= dir.x * force;
                self.nodes[j].vy -= dir.y * force;
            }
        }

        for &(a, b) in &self.edges {
            let delta = Vec2::new(
                self.nodes[b].x - self.nodes[a].x,
                self.nodes[b].y - self.nodes[a].y,
            );
            let dist = delta.length() + config.epsilon;
            // Hooke's law toward the rest length
            let force = (dist - config.rest_length) * config.spring;
            let dir = delta.normalize_or_zero();

            self.nodes[a].vx += dir.x * force;
            self.nodes[a].vy += dir.y * force;
            self.nodes[b].vx -= dir.x * force;
            self.nodes[b].vy -= dir.y * force;
        }
    }

    /// Target-seeking pass for grid and radial modes: a spring to a fixed
    /// slot, no inter-node forces.
    fn apply_targets(&mut self, strength: f32, target: impl Fn(&Self, usize) -> Vec2) {
        for i in 0..self.nodes.len() {
            let goal = target(self, i);
            let node = &mut self.nodes[i];
            node.vx += (goal.x - node.x) * strength;
            node.vy += (goal.y - node.y) * strength;
        }
    }

    /// Run repeated steps until the energy floor or the iteration cap is
    /// reached. Returns the final energy.
    pub fn stabilize(&mut self, config: &PhysicsConfig, iterations: usize) -> f32 {
        let mut energy = f32::INFINITY;
        for _ in 0..iterations {
            energy = self.step(config);
            if energy < config.energy_floor {
                break;
            }
        }
        energy
    }

    /// Current positions for the reply across the worker boundary.
    pub fn positions(&self) -> Vec<NodePosition> {
        self.nodes
            .iter()
            .map(|node| NodePosition {
                id: node.id.clone(),
                x: node.x,
                y: node.y,
            })
            .collect()
    }

    /// Centroid and half-extent of the current layout, for camera fitting.
    pub fn bounding_box(&self) -> (Vec2, Vec2) {
        if self.nodes.is_empty() {
            return (self.viewport.center(), Vec2::ONE);
        }
        let centroid = self
            .nodes
            .iter()
            .fold(Vec2::ZERO, |acc, n| acc + Vec2::new(n.x, n.y))
            / self.nodes.len() as f32;
        let extent = self.nodes.iter().fold(Vec2::ZERO, |acc, n| {
            acc.max((Vec2::new(n.x, n.y) - centroid).abs())
        });
        (centroid, extent)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Edge;

    fn node_at(id: &str, x: f32, y: f32) -> Node {
        Node {
            x,
            y,
            ..Node::new(id)
        }
    }

    fn sim_with(nodes: Vec<Node>, edges: Vec<Edge>, mode: LayoutMode) -> Simulation {
        let mut sim = Simulation::new();
        sim.replace(
            GraphSnapshot { nodes, edges },
            Viewport::default(),
            mode,
            &[],
        );
        sim
    }

    fn distance(sim: &Simulation, a: &str, b: &str) -> f32 {
        let a = sim.node(a).unwrap();
        let b = sim.node(b).unwrap();
        Vec2::new(a.x - b.x, a.y - b.y).length()
    }

    #[test]
    fn test_repulsion_separates_until_settled() {
        let config = PhysicsConfig {
            centering: 0.0, // isolate repulsion
            ..PhysicsConfig::default()
        };
        let mut sim = sim_with(
            vec![node_at("a", 600.0, 360.0), node_at("b", 620.0, 360.0)],
            vec![],
            LayoutMode::Force,
        );

        let mut prev = distance(&sim, "a", "b");
        let mut energy = f32::INFINITY;
        let mut steps = 0;
        while energy > config.energy_floor && steps < 2000 {
            energy = sim.step(&config);
            let current = distance(&sim, "a", "b");
            assert!(
                current >= prev - 1e-3,
                "distance shrank while energy above threshold"
            );
            prev = current;
            steps += 1;
        }
        assert!(energy <= config.energy_floor, "never settled");
    }

    #[test]
    fn test_edge_attraction_converges_to_rest_length() {
        let config = PhysicsConfig {
            repulsion: 0.0, // isolate the spring
            ..PhysicsConfig::default()
        };
        let mut sim = sim_with(
            vec![node_at("a", 400.0, 360.0), node_at("b", 800.0, 360.0)],
            vec![Edge::new("a", "b")],
            LayoutMode::Force,
        );

        sim.stabilize(&config, 2000);
        let settled = distance(&sim, "a", "b");
        assert!(
            (settled - config.rest_length).abs() < 15.0,
            "settled at {settled}, expected near {}",
            config.rest_length
        );
    }

    #[test]
    fn test_dangling_edges_dropped() {
        let sim = sim_with(
            vec![node_at("a", 100.0, 100.0)],
            vec![Edge::new("a", "ghost"), Edge::new("ghost", "a")],
            LayoutMode::Force,
        );
        assert_eq!(sim.edges.len(), 0);
        assert_eq!(sim.len(), 1);
    }

    #[test]
    fn test_empty_step_is_noop() {
        let mut sim = Simulation::new();
        assert_eq!(sim.step(&PhysicsConfig::default()), 0.0);
    }

    #[test]
    fn test_drag_zeroes_velocity_and_pins() {
        let config = PhysicsConfig::default();
        let mut sim = sim_with(
            vec![node_at("a", 600.0, 360.0), node_at("b", 610.0, 360.0)],
            vec![],
            LayoutMode::Force,
        );
        sim.drag_to("a", 50.0, 50.0);
        let a = sim.node("a").unwrap();
        assert_eq!((a.x, a.y), (50.0, 50.0));
        assert_eq!((a.vx, a.vy), (0.0, 0.0));

        // Held node ignores forces; the free node is repelled
        sim.step(&config);
        let a = sim.node("a").unwrap();
        assert_eq!((a.x, a.y), (50.0, 50.0));

        sim.release("a");
        sim.step(&config);
        let a = sim.node("a").unwrap();
        assert!((a.x, a.y) != (50.0, 50.0));
    }

    #[test]
    fn test_grid_mode_reaches_slots() {
        let config = PhysicsConfig::default();
        let viewport = Viewport::default();
        let mut sim = sim_with(
            vec![
                node_at("a", 100.0, 100.0),
                node_at("b", 900.0, 500.0),
                node_at("c", 400.0, 600.0),
                node_at("d", 700.0, 100.0),
            ],
            vec![],
            LayoutMode::Grid,
        );
        sim.stabilize(&config, 4000);
        for (i, id) in ["a", "b", "c", "d"].iter().enumerate() {
            let goal = grid_target(i, 4, &viewport);
            let node = sim.node(id).unwrap();
            let off = Vec2::new(node.x - goal.x, node.y - goal.y).length();
            assert!(off < 30.0, "{id} ended {off} from its slot");
        }
    }

    #[test]
    fn test_radial_mode_respects_cluster_rings() {
        let config = PhysicsConfig::default();
        let viewport = Viewport::default();
        let mut nodes = Vec::new();
        for i in 0..6 {
            let mut node = node_at(&format!("n{i}"), 0.0, 0.0);
            node.cluster = if i < 3 { "inner".into() } else { "outer".into() };
            nodes.push(node);
        }
        let mut sim = Simulation::new();
        sim.replace(
            GraphSnapshot { nodes, edges: vec![] },
            viewport,
            LayoutMode::Radial,
            &["inner".to_string(), "outer".to_string()],
        );
        sim.stabilize(&config, 4000);

        let center = viewport.center();
        for i in 0..6 {
            let node = sim.node(&format!("n{i}")).unwrap();
            let radius = Vec2::new(node.x - center.x, node.y - center.y).distance(Vec2::ZERO);
            let rank = if i < 3 { 0.0 } else { 1.0 };
            let expected = config.radial_base + rank * config.radial_step;
            assert!(
                (radius - expected).abs() < 30.0,
                "n{i} at radius {radius}, expected near {expected}"
            );
        }
    }

    #[test]
    fn test_reload_preserves_supplied_positions() {
        let sim = sim_with(
            vec![node_at("a", 123.0, 456.0)],
            vec![],
            LayoutMode::Force,
        );
        let a = sim.node("a").unwrap();
        assert_eq!((a.x, a.y), (123.0, 456.0));
    }
}
