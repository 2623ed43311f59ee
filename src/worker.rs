//! Off-main-thread workers for physics and gesture processing.
//!
//! Both workers are strict request/response actors over tokio channels:
//! snapshots are copied across the boundary, the worker owns its working
//! state exclusively, and the interactive side is never blocked by the
//! computation. A malformed message degrades the reply; it never kills
//! the actor.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tokio::sync::{mpsc, oneshot};

use crate::config::{Config, PhysicsConfig};
use crate::error::CoreError;
use crate::gesture::{GesturePipeline, HandFrame, PipelineOutput};
use crate::model::{GraphSnapshot, LayoutMode, NodePosition, Viewport};
use crate::physics::Simulation;

/// Mailbox depth. Requests arrive at animation-frame cadence, so a small
/// buffer is enough to absorb scheduling jitter.
const MAILBOX: usize = 32;

// =============================================================================
// Physics Worker
// =============================================================================

/// One integration step's result.
#[derive(Debug, Clone)]
pub struct StepReply {
    pub positions: Vec<NodePosition>,
    /// Σ v² across nodes; the consumer may suspend stepping under its
    /// energy floor and resume when data changes.
    pub total_energy: f32,
}

enum PhysicsRequest {
    Replace {
        snapshot: GraphSnapshot,
        viewport: Viewport,
        mode: LayoutMode,
        cluster_order: Vec<String>,
        reply: oneshot::Sender<usize>,
    },
    Step {
        reply: oneshot::Sender<StepReply>,
    },
    Drag {
        id: String,
        x: f32,
        y: f32,
    },
    Release {
        id: String,
    },
}

/// Handle to the physics actor. Cloneable; the actor exits when every
/// handle is dropped.
#[derive(Clone)]
pub struct PhysicsWorker {
    tx: mpsc::Sender<PhysicsRequest>,
}

impl PhysicsWorker {
    /// Spawn the actor onto the current tokio runtime.
    pub fn spawn(config: PhysicsConfig) -> Self {
        let (tx, rx) = mpsc::channel(MAILBOX);
        tokio::spawn(physics_loop(config, rx));
        Self { tx }
    }

    /// Post a full node/edge snapshot. Returns the simulated node count.
    pub async fn replace(
        &self,
        snapshot: GraphSnapshot,
        viewport: Viewport,
        mode: LayoutMode,
        cluster_order: Vec<String>,
    ) -> Result<usize, CoreError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(PhysicsRequest::Replace {
                snapshot,
                viewport,
                mode,
                cluster_order,
                reply,
            })
            .await
            .map_err(|_| CoreError::WorkerGone("physics"))?;
        rx.await.map_err(|_| CoreError::WorkerGone("physics"))
    }

    /// Trigger one integration pass.
    pub async fn step(&self) -> Result<StepReply, CoreError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(PhysicsRequest::Step { reply })
            .await
            .map_err(|_| CoreError::WorkerGone("physics"))?;
        rx.await.map_err(|_| CoreError::WorkerGone("physics"))
    }

    /// Direct-drag override; fire-and-forget.
    pub async fn drag(&self, id: impl Into<String>, x: f32, y: f32) -> Result<(), CoreError> {
        self.tx
            .send(PhysicsRequest::Drag { id: id.into(), x, y })
            .await
            .map_err(|_| CoreError::WorkerGone("physics"))
    }

    pub async fn release(&self, id: impl Into<String>) -> Result<(), CoreError> {
        self.tx
            .send(PhysicsRequest::Release { id: id.into() })
            .await
            .map_err(|_| CoreError::WorkerGone("physics"))
    }
}

async fn physics_loop(config: PhysicsConfig, mut rx: mpsc::Receiver<PhysicsRequest>) {
    let mut simulation = Simulation::new();
    tracing::debug!("physics worker started");

    while let Some(request) = rx.recv().await {
        match request {
            PhysicsRequest::Replace {
                snapshot,
                viewport,
                mode,
                cluster_order,
                reply,
            } => {
                simulation.replace(snapshot, viewport, mode, &cluster_order);
                let _ = reply.send(simulation.len());
            }
            PhysicsRequest::Step { reply } => {
                let total_energy = simulation.step(&config);
                let _ = reply.send(StepReply {
                    positions: simulation.positions(),
                    total_energy,
                });
            }
            PhysicsRequest::Drag { id, x, y } => simulation.drag_to(&id, x, y),
            PhysicsRequest::Release { id } => simulation.release(&id),
        }
    }
    tracing::debug!("physics worker stopped");
}

// =============================================================================
// Gesture Worker
// =============================================================================

enum GestureRequest {
    Configure {
        config: Box<Config>,
    },
    Process {
        frame: HandFrame,
        now_ms: u64,
        reply: oneshot::Sender<PipelineOutput>,
    },
}

/// Handle to the gesture actor.
#[derive(Clone)]
pub struct GestureWorker {
    tx: mpsc::Sender<GestureRequest>,
}

impl GestureWorker {
    pub fn spawn(config: Config) -> Self {
        let (tx, rx) = mpsc::channel(MAILBOX);
        tokio::spawn(gesture_loop(config, rx));
        Self { tx }
    }

    /// Swap the pipeline configuration mid-session.
    pub async fn configure(&self, config: Config) -> Result<(), CoreError> {
        self.tx
            .send(GestureRequest::Configure {
                config: Box::new(config),
            })
            .await
            .map_err(|_| CoreError::WorkerGone("gesture"))
    }

    /// Process one frame of hand landmarks.
    pub async fn process(
        &self,
        frame: HandFrame,
        now_ms: u64,
    ) -> Result<PipelineOutput, CoreError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(GestureRequest::Process {
                frame,
                now_ms,
                reply,
            })
            .await
            .map_err(|_| CoreError::WorkerGone("gesture"))?;
        rx.await.map_err(|_| CoreError::WorkerGone("gesture"))
    }
}

async fn gesture_loop(config: Config, mut rx: mpsc::Receiver<GestureRequest>) {
    let mut pipeline = GesturePipeline::new(config);
    tracing::debug!("gesture worker started");

    while let Some(request) = rx.recv().await {
        match request {
            GestureRequest::Configure { config } => pipeline.reconfigure(*config),
            GestureRequest::Process {
                frame,
                now_ms,
                reply,
            } => {
                let hand_count = frame.hand_count();
                // A classification failure degrades this frame to "no
                // gesture detected" instead of crashing the worker
                let output = catch_unwind(AssertUnwindSafe(|| pipeline.process(&frame, now_ms)))
                    .unwrap_or_else(|_| {
                        tracing::error!(hand_count, "frame classification panicked");
                        PipelineOutput::empty(hand_count)
                    });
                let _ = reply.send(output);
            }
        }
    }
    tracing::debug!("gesture worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Edge, Node};

    fn snapshot() -> GraphSnapshot {
        GraphSnapshot {
            nodes: vec![Node::new("a"), Node::new("b")],
            edges: vec![Edge::new("a", "b")],
        }
    }

    #[tokio::test]
    async fn test_physics_worker_round_trip() {
        let worker = PhysicsWorker::spawn(PhysicsConfig::default());
        let count = worker
            .replace(
                snapshot(),
                Viewport::default(),
                LayoutMode::Force,
                vec![],
            )
            .await
            .unwrap();
        assert_eq!(count, 2);

        let reply = worker.step().await.unwrap();
        assert_eq!(reply.positions.len(), 2);
        assert!(reply.total_energy > 0.0);
    }

    #[tokio::test]
    async fn test_physics_step_with_no_nodes_is_noop() {
        let worker = PhysicsWorker::spawn(PhysicsConfig::default());
        let reply = worker.step().await.unwrap();
        assert!(reply.positions.is_empty());
        assert_eq!(reply.total_energy, 0.0);
    }

    #[tokio::test]
    async fn test_physics_drag_pins_node() {
        let worker = PhysicsWorker::spawn(PhysicsConfig::default());
        worker
            .replace(snapshot(), Viewport::default(), LayoutMode::Force, vec![])
            .await
            .unwrap();
        worker.drag("a", 10.0, 20.0).await.unwrap();

        let reply = worker.step().await.unwrap();
        let a = reply.positions.iter().find(|p| p.id == "a").unwrap();
        assert_eq!((a.x, a.y), (10.0, 20.0));
    }

    #[tokio::test]
    async fn test_gesture_worker_empty_frame_is_explicit_idle_result() {
        let worker = GestureWorker::spawn(Config::default());
        let output = worker.process(HandFrame::empty(), 0).await.unwrap();
        assert!(output.active.is_empty());
        assert_eq!(output.hand_count, 0);
        assert!(output.pos.is_none());
    }

    #[tokio::test]
    async fn test_gesture_worker_reconfigure() {
        let worker = GestureWorker::spawn(Config::default());
        let mut config = Config::default();
        config.stabilizer.hold_ms = 1;
        worker.configure(config).await.unwrap();
        // Still serving requests after the swap
        let output = worker.process(HandFrame::empty(), 5).await.unwrap();
        assert_eq!(output.hand_count, 0);
    }
}
