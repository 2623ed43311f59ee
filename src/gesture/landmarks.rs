//! Hand landmark indexing and geometry helpers.
//!
//! A tracked hand is exactly 21 points in a fixed anatomical order:
//! wrist first, then per-finger CMC/MCP, PIP, DIP, TIP chains. Coordinates
//! are normalized to [0, 1] in x/y with z as relative depth.

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// (tip, pip, mcp) index triples for the four non-thumb fingers,
/// in index/middle/ring/pinky order.
pub const FINGER_JOINTS: [(usize, usize, usize); 4] = [
    (INDEX_TIP, INDEX_PIP, INDEX_MCP),
    (MIDDLE_TIP, MIDDLE_PIP, MIDDLE_MCP),
    (RING_TIP, RING_PIP, RING_MCP),
    (PINKY_TIP, PINKY_PIP, PINKY_MCP),
];

/// All five fingertip indices.
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// One tracked 3D point on a hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Image-plane projection. Classification works in the normalized
    /// x/y plane; z is carried for depth-aware consumers.
    pub fn xy(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Planar distance to another landmark.
    pub fn distance(&self, other: &Landmark) -> f32 {
        self.xy().distance(other.xy())
    }
}

/// One detected hand: 21 landmarks in anatomical order.
pub type HandLandmarks = [Landmark; 21];

/// One frame of tracking output: zero, one, or two hands.
///
/// Ephemeral - overwritten every frame, never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandFrame {
    pub hands: Vec<HandLandmarks>,
}

impl HandFrame {
    pub fn empty() -> Self {
        Self { hands: Vec::new() }
    }

    pub fn hand_count(&self) -> usize {
        self.hands.len()
    }
}

/// Palm reference point: centroid of wrist, index MCP, and middle MCP.
pub fn palm_centroid(hand: &HandLandmarks) -> Vec2 {
    (hand[WRIST].xy() + hand[INDEX_MCP].xy() + hand[MIDDLE_MCP].xy()) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palm_centroid_is_mean_of_three() {
        let mut hand: HandLandmarks = [Landmark::default(); 21];
        hand[WRIST] = Landmark::new(0.3, 0.9, 0.0);
        hand[INDEX_MCP] = Landmark::new(0.2, 0.6, 0.0);
        hand[MIDDLE_MCP] = Landmark::new(0.4, 0.6, 0.0);

        let c = palm_centroid(&hand);
        assert!((c.x - 0.3).abs() < 1e-6);
        assert!((c.y - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_frame_serde_shape() {
        let frame = HandFrame {
            hands: vec![[Landmark::new(0.5, 0.5, 0.0); 21]],
        };
        let json = serde_json::to_string(&frame).unwrap();
        let back: HandFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.hand_count(), 1);
        assert_eq!(back.hands[0][WRIST], Landmark::new(0.5, 0.5, 0.0));
    }
}
