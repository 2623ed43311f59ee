//! Webcam input controller.
//!
//! Owns the camera/model acquisition lifecycle, feeds raw landmark frames
//! through the gesture worker, and translates confirmed gesture states into
//! intent events with computed deltas.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use glam::Vec2;

use crate::bus::{IntentBus, IntentEvent, IntentKind};
use crate::config::Config;
use crate::error::CoreError;
use crate::gesture::{Expansion, GestureName, HandFrame, PipelineOutput};
use crate::worker::GestureWorker;

use super::{ControllerStatus, InputController};

/// Event source identifier stamped on everything this controller emits.
const SOURCE: &str = "webcam";

/// Seam to the host platform's camera stream and hand-tracking model.
///
/// Camera acquisition and model inference stay on the host side (a browser
/// constraint on the original platform); the controller only drives the
/// lifecycle and consumes the resulting landmark frames.
#[async_trait]
pub trait TrackingPlatform: Send + Sync {
    /// Acquire the camera stream and load the tracking model.
    async fn acquire(&self, camera: &crate::config::CameraConfig) -> Result<(), CoreError>;

    /// Release the stream and model. Must tolerate repeated calls.
    async fn release(&self);
}

struct StatusState {
    status: ControllerStatus,
    error_code: Option<String>,
}

/// Delta bookkeeping between consecutive tracking results.
#[derive(Default)]
struct EmitState {
    prev_pointer: Option<Vec2>,
    prev_active: HashSet<GestureName>,
    idle_signaled: bool,
}

/// Webcam-driven gesture input source.
pub struct WebcamController {
    platform: Arc<dyn TrackingPlatform>,
    worker: GestureWorker,
    bus: Arc<IntentBus>,
    config: Config,
    status: Mutex<StatusState>,
    running: AtomicBool,
    destroyed: AtomicBool,
    zoom_level: Mutex<f32>,
    emit_state: Mutex<EmitState>,
}

impl WebcamController {
    pub fn new(
        platform: Arc<dyn TrackingPlatform>,
        worker: GestureWorker,
        bus: Arc<IntentBus>,
        config: Config,
    ) -> Self {
        Self {
            platform,
            worker,
            bus,
            config,
            status: Mutex::new(StatusState {
                status: ControllerStatus::Idle,
                error_code: None,
            }),
            running: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
            zoom_level: Mutex::new(1.0),
            emit_state: Mutex::new(EmitState::default()),
        }
    }

    /// Feed one raw tracking result from the platform's model callback.
    ///
    /// `now_ms` comes from the host frame clock. While stopped, frames are
    /// dropped without touching pipeline state.
    pub async fn on_tracking_result(
        &self,
        frame: HandFrame,
        now_ms: u64,
    ) -> Result<(), CoreError> {
        if !self.running.load(Ordering::SeqCst) || self.destroyed.load(Ordering::SeqCst) {
            return Ok(());
        }
        let output = self.worker.process(frame, now_ms).await?;
        self.emit_intents(&output);
        Ok(())
    }

    /// Diff the pipeline output against the previous frame and broadcast
    /// the resulting intents. Deltas, not absolutes: the navigation side
    /// accumulates them as velocity.
    fn emit_intents(&self, output: &PipelineOutput) {
        let toggles = &self.config.gestures;
        let gates = &self.config.controller;
        let zoom_level: f32 = *self.zoom_level.lock().unwrap();
        let mut state = self.emit_state.lock().unwrap();

        if output.idle {
            if !state.idle_signaled {
                state.idle_signaled = true;
                self.bus.emit(IntentEvent::new(IntentKind::Idle, SOURCE));
            }
            state.prev_pointer = None;
            state.prev_active.clear();
            return;
        }
        state.idle_signaled = false;

        if let Some(pos) = output.pos {
            if let Some(prev) = state.prev_pointer {
                let delta = pos - prev;

                // PAN: scaled by inverse zoom so screen-space speed stays
                // constant regardless of world zoom; deadzone-gated to
                // suppress micro-jitter spam
                if output.active.contains(&GestureName::NavPan)
                    && delta.length() > gates.pan_deadzone
                {
                    let factor = toggles.pan.sensitivity / zoom_level.max(0.01);
                    self.bus.emit(
                        IntentEvent::new(IntentKind::Pan, SOURCE)
                            .with_delta(delta.x * factor, delta.y * factor),
                    );
                }

                // ROTATE: horizontal delta only
                if output.active.contains(&GestureName::PrecisionRotate)
                    && delta.x.abs() > gates.rotate_deadzone
                {
                    self.bus.emit(
                        IntentEvent::new(IntentKind::Rotate, SOURCE)
                            .with_rotation(delta.x * toggles.rotate.sensitivity),
                    );
                }
            }
            state.prev_pointer = Some(pos);
        }

        // LOCK: keyed to the stabilized state, not motion; the rising edge
        // is the toggle signal
        if output.active.contains(&GestureName::LockMode)
            && !state.prev_active.contains(&GestureName::LockMode)
        {
            self.bus.emit(IntentEvent::new(IntentKind::Lock, SOURCE));
        }

        if output.active.contains(&GestureName::InspectMode) {
            if let Some(target) = output.inspect_pos {
                self.bus.emit(
                    IntentEvent::new(IntentKind::InspectPrecise, SOURCE)
                        .with_delta(target.x, target.y),
                );
            }
        }

        if toggles.zoom.enabled && (output.zoom_scale - 1.0).abs() > gates.zoom_deadzone {
            let scale = 1.0 + (output.zoom_scale - 1.0) * toggles.zoom.sensitivity;
            self.bus
                .emit(IntentEvent::new(IntentKind::Zoom, SOURCE).with_scale(scale));
        }

        if toggles.cluster.enabled {
            match output.expansion {
                Expansion::Expand => self
                    .bus
                    .emit(IntentEvent::new(IntentKind::ClusterExpand, SOURCE)),
                Expansion::Collapse => self
                    .bus
                    .emit(IntentEvent::new(IntentKind::ClusterCollapse, SOURCE)),
                Expansion::None => {}
            }
        }

        state.prev_active = output.active.clone();
    }

    fn set_status(&self, status: ControllerStatus, error_code: Option<String>) {
        let mut guard = self.status.lock().unwrap();
        guard.status = status;
        guard.error_code = error_code;
    }
}

#[async_trait]
impl InputController for WebcamController {
    async fn initialize(&self) -> Result<(), CoreError> {
        self.set_status(ControllerStatus::Initializing, None);

        match self.platform.acquire(&self.config.camera).await {
            Ok(()) => {
                self.set_status(ControllerStatus::Active, None);
                Ok(())
            }
            Err(err) => {
                let status = if err.is_permission() {
                    ControllerStatus::PermissionDenied
                } else {
                    ControllerStatus::Error
                };
                tracing::warn!(code = err.code(), "webcam initialization failed");
                self.set_status(status, Some(err.code().to_string()));
                Err(err)
            }
        }
    }

    fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    async fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.running.store(false, Ordering::SeqCst);
        self.platform.release().await;
        self.set_status(ControllerStatus::Idle, None);
    }

    fn status(&self) -> ControllerStatus {
        self.status.lock().unwrap().status
    }

    fn error_code(&self) -> Option<String> {
        self.status.lock().unwrap().error_code.clone()
    }

    fn set_zoom_level(&self, level: f32) {
        *self.zoom_level.lock().unwrap() = level;
    }
}
