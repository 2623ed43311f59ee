//! Navigation intent events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Semantic navigation commands derived from gestures or direct input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentKind {
    Pan,
    Zoom,
    Rotate,
    Lock,
    Select,
    HoverFocus,
    Idle,
    // Extended vocabulary
    RotateAxis,
    ZoomFine,
    ScaleWorld,
    RollCamera,
    ModeEnter,
    Pause,
    ExpandDetails,
    ClusterExpand,
    ClusterCollapse,
    InspectPrecise,
}

/// One navigation command. Immutable once constructed; the bus keeps only
/// the most recent event for introspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentEvent {
    pub kind: IntentKind,
    pub delta_x: f32,
    pub delta_y: f32,
    /// Multiplicative zoom factor; 1.0 is neutral.
    pub scale: f32,
    pub rotation: f32,
    pub timestamp: DateTime<Utc>,
    /// Producer identifier, e.g. "webcam" or "mouse".
    pub source: String,
}

impl IntentEvent {
    /// Event with neutral payload values.
    pub fn new(kind: IntentKind, source: impl Into<String>) -> Self {
        Self {
            kind,
            delta_x: 0.0,
            delta_y: 0.0,
            scale: 1.0,
            rotation: 0.0,
            timestamp: Utc::now(),
            source: source.into(),
        }
    }

    pub fn with_delta(mut self, dx: f32, dy: f32) -> Self {
        self.delta_x = dx;
        self.delta_y = dy;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
