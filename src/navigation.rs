//! Navigation adapter: intent events in, camera motion out.
//!
//! Subscribes to the intent bus, keeps a gesture velocity that the latest
//! sample overwrites, and applies it to the externally-owned camera once
//! per rendered frame with frictional decay. Direct mouse input takes
//! priority: gesture navigation is suppressed for a cooldown window after
//! every real mouse movement.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::bus::{IntentBus, IntentEvent, IntentKind};
use crate::config::NavigationConfig;

/// Reference frame time (ms) that friction is normalized against.
const FRAME_NORM_MS: f32 = 16.67;

/// Externally-owned view state the adapter writes into each frame.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
    pub rotation: f32,
}

impl Camera {
    pub const MIN_ZOOM: f32 = 0.05;
    pub const MAX_ZOOM: f32 = 20.0;
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
            rotation: 0.0,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct NavState {
    vx: f32,
    vy: f32,
    vzoom: f32,
    /// Rotation accumulated since the last tick; applied directly, no inertia.
    pending_rotation: f32,
    /// Navigation lock toggled by LOCK intents.
    locked: bool,
    last_mouse: Option<DateTime<Utc>>,
}

/// Bridges the intent bus to camera state with physical inertia.
pub struct NavigationAdapter {
    config: NavigationConfig,
    state: Mutex<NavState>,
}

impl NavigationAdapter {
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            config,
            state: Mutex::new(NavState::default()),
        }
    }

    /// Subscribe the adapter to a bus. Call once; the returned adapter
    /// handle is shared with the render loop for `tick`.
    pub fn attach(self: &Arc<Self>, bus: &IntentBus) {
        let adapter = Arc::clone(self);
        bus.subscribe(None, move |event| adapter.handle(event));
    }

    /// Consume one intent event.
    pub fn handle(&self, event: &IntentEvent) {
        let mut state = self.state.lock().unwrap();

        // Mouse-priority arbitration: real pointer input re-arms the
        // suppression window; gesture events inside it are ignored
        if event.source == "mouse" {
            state.last_mouse = Some(event.timestamp);
        } else if let Some(last_mouse) = state.last_mouse {
            let cooldown = Duration::milliseconds(self.config.mouse_cooldown_ms);
            if event.timestamp - last_mouse < cooldown {
                tracing::trace!(kind = ?event.kind, "gesture suppressed by mouse priority");
                return;
            }
        }

        match event.kind {
            IntentKind::Pan if self.config.apply_pan => {
                // Latest sample wins: assignment, not accumulation
                state.vx = event.delta_x;
                state.vy = event.delta_y;
            }
            IntentKind::Zoom | IntentKind::ZoomFine if self.config.apply_zoom => {
                state.vzoom = event.scale - 1.0;
            }
            IntentKind::Rotate | IntentKind::RotateAxis if self.config.apply_rotate => {
                state.pending_rotation += event.rotation;
            }
            IntentKind::Lock if self.config.apply_lock => {
                state.locked = !state.locked;
                tracing::debug!(locked = state.locked, "navigation lock toggled");
            }
            _ => {}
        }
    }

    /// Apply one frame of motion to the camera, then decay velocity by
    /// `friction^(dt / frame)`. Returns whether anything was applied, so
    /// the caller can skip redundant platform work while at rest.
    pub fn tick(&self, camera: &mut Camera, dt_ms: f32) -> bool {
        let mut state = self.state.lock().unwrap();

        let resting = state.vx.abs() < self.config.rest_threshold
            && state.vy.abs() < self.config.rest_threshold
            && state.vzoom.abs() < self.config.rest_threshold
            && state.pending_rotation == 0.0;

        let moved = if resting || state.locked {
            false
        } else {
            camera.x += state.vx;
            camera.y += state.vy;
            camera.zoom =
                (camera.zoom * (1.0 + state.vzoom)).clamp(Camera::MIN_ZOOM, Camera::MAX_ZOOM);
            camera.rotation += state.pending_rotation;
            true
        };
        state.pending_rotation = 0.0;

        let decay = self.config.friction.powf(dt_ms / FRAME_NORM_MS);
        state.vx *= decay;
        state.vy *= decay;
        state.vzoom *= decay;

        moved
    }

    /// Whether the navigation lock is currently engaged.
    pub fn locked(&self) -> bool {
        self.state.lock().unwrap().locked
    }

    #[cfg(test)]
    fn velocity(&self) -> (f32, f32, f32) {
        let state = self.state.lock().unwrap();
        (state.vx, state.vy, state.vzoom)
    }
}
