//! Per-frame gesture pipeline orchestration.
//!
//! Composes the vocabulary predicates, the temporal stabilizer, and the
//! motion smoothers: raw multi-hand landmark frames go in, a confirmed
//! active-gesture set plus smoothed pointer position and zoom ratio come
//! out. Runs inside the gesture worker, off the interactive thread.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::Config;

use super::landmarks::{palm_centroid, HandFrame, HandLandmarks};
use super::smoother::{Holt, Holt2};
use super::stabilizer::GestureStabilizer;
use super::vocabulary::{
    detect_expansion, is_fist, is_open_palm, is_pointing, is_two_finger_point, Expansion,
    GestureName,
};

/// Neutral zoom ratio: hands neither expanding nor contracting.
const ZOOM_NEUTRAL: f32 = 1.0;

/// One frame's pipeline result, shipped back across the worker boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutput {
    /// Confirmed gesture states (post-stabilization).
    pub active: HashSet<GestureName>,
    /// Smoothed pointer position, mirrored and clamped to [0, 1].
    pub pos: Option<Vec2>,
    /// Smoothed two-hand zoom ratio; 1.0 when neutral or under one hand.
    pub zoom_scale: f32,
    /// Inspection target while the hold-and-point compound gesture holds.
    pub inspect_pos: Option<Vec2>,
    /// Two-hand expansion relation for cluster intents.
    pub expansion: Expansion,
    pub hand_count: usize,
    /// Set once no hand has been seen for the idle timeout.
    pub idle: bool,
}

impl PipelineOutput {
    /// Degraded "nothing detected" result, also used when a frame's
    /// classification fails.
    pub fn empty(hand_count: usize) -> Self {
        Self {
            active: HashSet::new(),
            pos: None,
            zoom_scale: ZOOM_NEUTRAL,
            inspect_pos: None,
            expansion: Expansion::None,
            hand_count,
            idle: false,
        }
    }
}

/// Session-scoped gesture pipeline.
pub struct GesturePipeline {
    config: Config,
    stabilizer: GestureStabilizer,
    pointer: Holt2,
    zoom: Holt,
    /// Inter-palm distance from the previous two-hand frame. Cleared
    /// whenever the hand count is not exactly two.
    prev_hand_distance: Option<f32>,
    /// Timestamp of the last frame with at least one hand.
    last_activity_ms: Option<u64>,
}

impl GesturePipeline {
    pub fn new(config: Config) -> Self {
        let stabilizer = GestureStabilizer::new(config.stabilizer.clone());
        let pointer = Holt2::from_config(&config.smoothing);
        let zoom = Holt::new(config.smoothing.zoom_alpha, config.smoothing.zoom_beta);
        Self {
            config,
            stabilizer,
            pointer,
            zoom,
            prev_hand_distance: None,
            last_activity_ms: None,
        }
    }

    /// Swap configuration mid-session. Resets smoothing and debounce state.
    pub fn reconfigure(&mut self, config: Config) {
        *self = Self::new(config);
    }

    /// Process one frame of landmarks.
    pub fn process(&mut self, frame: &HandFrame, now_ms: u64) -> PipelineOutput {
        let hand_count = frame.hand_count();

        if hand_count == 0 {
            return self.process_idle(now_ms);
        }
        self.last_activity_ms = Some(now_ms);

        let detection = &self.config.detection;
        let toggles = &self.config.gestures;

        // 1-2. Per-hand shape flags, unioned into the raw detected set
        let mut detected = HashSet::new();
        for hand in &frame.hands {
            if toggles.rotate.enabled && is_pointing(hand, detection) {
                detected.insert(GestureName::PrecisionRotate);
            }
            if toggles.lock.enabled && is_fist(hand, detection) {
                detected.insert(GestureName::LockMode);
            }
            if toggles.pan.enabled && is_open_palm(hand, detection) {
                detected.insert(GestureName::NavPan);
            }
        }

        // 3. Two-hand coordination: one hand holds (open or fist) while the
        //    other two-finger-points at the inspection target
        let mut inspect_pos = None;
        if toggles.inspect.enabled && hand_count == 2 {
            let (a, b) = (&frame.hands[0], &frame.hands[1]);
            if let Some(pointing) = inspect_pointing_hand(a, b, detection) {
                detected.insert(GestureName::InspectMode);
                inspect_pos = Some(mirror_clamp(palm_centroid(pointing)));
            }
        }

        // 4-5. Reference position: palm centroid, or two-hand midpoint,
        //      mirrored to the camera-facing convention and smoothed
        let reference = match hand_count {
            1 => palm_centroid(&frame.hands[0]),
            _ => (palm_centroid(&frame.hands[0]) + palm_centroid(&frame.hands[1])) / 2.0,
        };
        let pos = clamp_unit(self.pointer.update(mirror(reference)));

        // 6. Two-hand zoom ratio against the previous frame's distance
        let mut expansion = Expansion::None;
        let zoom_scale = if hand_count == 2 {
            let (relation, distance) = detect_expansion(
                &frame.hands[0],
                &frame.hands[1],
                self.prev_hand_distance,
                detection,
            );
            expansion = relation;
            let ratio = match self.prev_hand_distance {
                Some(prev) if prev > f32::EPSILON => distance / prev,
                _ => ZOOM_NEUTRAL,
            };
            self.prev_hand_distance = Some(distance);
            self.zoom.update(ratio)
        } else {
            // Baseline is only meaningful between consecutive two-hand frames
            self.prev_hand_distance = None;
            self.zoom.reset();
            ZOOM_NEUTRAL
        };

        // 7. Temporal stabilization
        let active = self.stabilizer.observe(&detected, now_ms);

        PipelineOutput {
            active,
            pos: Some(pos),
            zoom_scale,
            inspect_pos,
            expansion,
            hand_count,
            idle: false,
        }
    }

    fn process_idle(&mut self, now_ms: u64) -> PipelineOutput {
        self.prev_hand_distance = None;
        self.zoom.reset();

        // The stabilizer still sees the absence so exit windows advance
        let active = self.stabilizer.observe(&HashSet::new(), now_ms);

        // Idle only after the timeout, not immediately, so momentary
        // tracking loss does not flicker the idle signal
        let idle_timeout = self.config.controller.idle_timeout_ms;
        let idle = self
            .last_activity_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= idle_timeout);
        if idle {
            self.pointer.reset();
        }

        PipelineOutput {
            active,
            idle,
            ..PipelineOutput::empty(0)
        }
    }
}

/// Which of the two hands is the inspection pointer, if the compound
/// hold-and-point condition holds.
fn inspect_pointing_hand<'f>(
    a: &'f HandLandmarks,
    b: &'f HandLandmarks,
    detection: &crate::config::DetectionConfig,
) -> Option<&'f HandLandmarks> {
    let holds = |h: &HandLandmarks| is_open_palm(h, detection) || is_fist(h, detection);
    if holds(a) && is_two_finger_point(b, detection) {
        Some(b)
    } else if holds(b) && is_two_finger_point(a, detection) {
        Some(a)
    } else {
        None
    }
}

/// Mirror the x-axis: the user faces the camera, so screen-left is hand-right.
fn mirror(pos: Vec2) -> Vec2 {
    Vec2::new(1.0 - pos.x, pos.y)
}

fn clamp_unit(pos: Vec2) -> Vec2 {
    pos.clamp(Vec2::ZERO, Vec2::ONE)
}

fn mirror_clamp(pos: Vec2) -> Vec2 {
    clamp_unit(mirror(pos))
}
