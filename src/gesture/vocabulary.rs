//! Stateless hand-shape predicates.
//!
//! Pure classification of a single hand's 21 landmarks into boolean shapes,
//! plus the two-hand expansion relation. No state is kept here; temporal
//! stability is the stabilizer's job.

use serde::{Deserialize, Serialize};

use super::landmarks::{palm_centroid, HandLandmarks, FINGERTIPS, FINGER_JOINTS};
use crate::config::DetectionConfig;

/// Names of the recognized gesture states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureName {
    /// Open palm drives panning.
    NavPan,
    /// Index-only point drives rotation.
    PrecisionRotate,
    /// Fist toggles the navigation lock.
    LockMode,
    /// Hold-and-point compound gesture across two hands.
    InspectMode,
}

/// Two-hand spatial relation between consecutive frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Expansion {
    Expand,
    Collapse,
    #[default]
    None,
}

/// A finger is extended when its tip sits proportionally far from the pip
/// joint: distance(tip, pip) > ratio * distance(pip, mcp). A curled finger's
/// tip stays close to its pip relative to the pip-mcp segment.
pub fn is_extended(hand: &HandLandmarks, tip: usize, pip: usize, mcp: usize, ratio: f32) -> bool {
    hand[tip].distance(&hand[pip]) > ratio * hand[pip].distance(&hand[mcp])
}

fn finger_extended(hand: &HandLandmarks, finger: usize, config: &DetectionConfig) -> bool {
    let (tip, pip, mcp) = FINGER_JOINTS[finger];
    is_extended(hand, tip, pip, mcp, config.extension_ratio)
}

/// Exactly the index extended; middle, ring, and pinky curled.
pub fn is_pointing(hand: &HandLandmarks, config: &DetectionConfig) -> bool {
    finger_extended(hand, 0, config)
        && !finger_extended(hand, 1, config)
        && !finger_extended(hand, 2, config)
        && !finger_extended(hand, 3, config)
}

/// Index and middle extended; ring and pinky curled.
pub fn is_two_finger_point(hand: &HandLandmarks, config: &DetectionConfig) -> bool {
    finger_extended(hand, 0, config)
        && finger_extended(hand, 1, config)
        && !finger_extended(hand, 2, config)
        && !finger_extended(hand, 3, config)
}

/// At least `open_palm_min_extended` of the four non-thumb fingers extended.
pub fn is_open_palm(hand: &HandLandmarks, config: &DetectionConfig) -> bool {
    let extended = (0..4).filter(|&f| finger_extended(hand, f, config)).count();
    extended >= config.open_palm_min_extended as usize
}

/// Mean fingertip distance to the palm centroid below the fist radius.
pub fn is_fist(hand: &HandLandmarks, config: &DetectionConfig) -> bool {
    let palm = palm_centroid(hand);
    let mean: f32 = FINGERTIPS
        .iter()
        .map(|&tip| hand[tip].xy().distance(palm))
        .sum::<f32>()
        / FINGERTIPS.len() as f32;
    mean < config.fist_radius
}

/// Compare the current inter-hand centroid distance against the previous
/// frame's. Returns the relation and the current distance for the caller to
/// carry forward. With no previous observation the relation is `None`.
pub fn detect_expansion(
    hand1: &HandLandmarks,
    hand2: &HandLandmarks,
    prev_distance: Option<f32>,
    config: &DetectionConfig,
) -> (Expansion, f32) {
    let current = palm_centroid(hand1).distance(palm_centroid(hand2));
    let relation = match prev_distance {
        Some(prev) if current - prev > config.expansion_delta => Expansion::Expand,
        Some(prev) if prev - current > config.expansion_delta => Expansion::Collapse,
        _ => Expansion::None,
    };
    (relation, current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::landmarks::*;

    /// Hand with chosen fingers extended. Finger geometry is synthetic:
    /// pip sits 0.1 below mcp, an extended tip 0.15 beyond pip, a curled
    /// tip only 0.03 beyond pip.
    fn hand_with_extended(extended: [bool; 4]) -> HandLandmarks {
        let mut hand: HandLandmarks = [Landmark::default(); 21];
        hand[WRIST] = Landmark::new(0.5, 0.85, 0.0);
        for (finger, &ext) in extended.iter().enumerate() {
            let (tip, pip, mcp) = FINGER_JOINTS[finger];
            let x = 0.38 + finger as f32 * 0.08;
            hand[mcp] = Landmark::new(x, 0.6, 0.0);
            hand[pip] = Landmark::new(x, 0.5, 0.0);
            hand[tip] = if ext {
                Landmark::new(x, 0.35, 0.0)
            } else {
                Landmark::new(x, 0.47, 0.0)
            };
        }
        // Thumb parked away from the palm
        hand[THUMB_TIP] = Landmark::new(0.3, 0.7, 0.0);
        hand
    }

    fn fist_hand() -> HandLandmarks {
        let mut hand: HandLandmarks = [Landmark::default(); 21];
        hand[WRIST] = Landmark::new(0.5, 0.74, 0.0);
        hand[INDEX_MCP] = Landmark::new(0.46, 0.64, 0.0);
        hand[MIDDLE_MCP] = Landmark::new(0.54, 0.64, 0.0);
        // Curled fingers: tips gathered around the palm centroid,
        // pips close under the tips so nothing reads as extended.
        let palm = palm_centroid(&hand);
        for (i, &tip) in FINGERTIPS.iter().enumerate() {
            let dx = (i as f32 - 2.0) * 0.015;
            hand[tip] = Landmark::new(palm.x + dx, palm.y + 0.02, 0.0);
        }
        for &(tip, pip, _) in FINGER_JOINTS.iter() {
            hand[pip] = Landmark::new(hand[tip].x, hand[tip].y + 0.01, 0.0);
        }
        hand
    }

    #[test]
    fn test_extension_threshold_symmetry() {
        // tip-pip = 0.81 * pip-mcp passes at ratio 0.8; 0.79 fails.
        let mut hand: HandLandmarks = [Landmark::default(); 21];
        hand[INDEX_MCP] = Landmark::new(0.5, 0.6, 0.0);
        hand[INDEX_PIP] = Landmark::new(0.5, 0.5, 0.0);

        hand[INDEX_TIP] = Landmark::new(0.5, 0.5 - 0.081, 0.0);
        assert!(is_extended(&hand, INDEX_TIP, INDEX_PIP, INDEX_MCP, 0.8));

        hand[INDEX_TIP] = Landmark::new(0.5, 0.5 - 0.079, 0.0);
        assert!(!is_extended(&hand, INDEX_TIP, INDEX_PIP, INDEX_MCP, 0.8));
    }

    #[test]
    fn test_pointing_requires_lone_index() {
        let config = DetectionConfig::default();
        assert!(is_pointing(&hand_with_extended([true, false, false, false]), &config));
        assert!(!is_pointing(&hand_with_extended([true, true, false, false]), &config));
        assert!(!is_pointing(&hand_with_extended([false, false, false, false]), &config));
    }

    #[test]
    fn test_two_finger_point() {
        let config = DetectionConfig::default();
        assert!(is_two_finger_point(&hand_with_extended([true, true, false, false]), &config));
        assert!(!is_two_finger_point(&hand_with_extended([true, false, false, false]), &config));
        assert!(!is_two_finger_point(&hand_with_extended([true, true, true, false]), &config));
    }

    #[test]
    fn test_open_palm_tolerates_one_occluded_finger() {
        let config = DetectionConfig::default();
        assert!(is_open_palm(&hand_with_extended([true, true, true, true]), &config));
        assert!(is_open_palm(&hand_with_extended([true, true, true, false]), &config));
        assert!(!is_open_palm(&hand_with_extended([true, true, false, false]), &config));
    }

    #[test]
    fn test_fist_detected() {
        let config = DetectionConfig::default();
        assert!(is_fist(&fist_hand(), &config));
        assert!(!is_fist(&hand_with_extended([true, true, true, true]), &config));
    }

    #[test]
    fn test_fist_and_open_palm_mutually_exclusive() {
        let config = DetectionConfig::default();
        for hand in [
            fist_hand(),
            hand_with_extended([true, true, true, true]),
            hand_with_extended([true, false, true, false]),
        ] {
            assert!(
                !(is_fist(&hand, &config) && is_open_palm(&hand, &config)),
                "fist and open palm both true for the same hand"
            );
        }
    }

    #[test]
    fn test_expansion_requires_previous_frame() {
        let config = DetectionConfig::default();
        let left = hand_with_extended([true, true, true, true]);
        let mut right = left;
        for lm in right.iter_mut() {
            lm.x += 0.3;
        }

        let (relation, dist) = detect_expansion(&left, &right, None, &config);
        assert_eq!(relation, Expansion::None);
        assert!(dist > 0.0);

        // Hands moved apart by more than the delta
        let (relation, _) = detect_expansion(&left, &right, Some(dist - 0.05), &config);
        assert_eq!(relation, Expansion::Expand);

        // Hands moved together
        let (relation, _) = detect_expansion(&left, &right, Some(dist + 0.05), &config);
        assert_eq!(relation, Expansion::Collapse);

        // Within the delta: no relation
        let (relation, _) = detect_expansion(&left, &right, Some(dist + 0.01), &config);
        assert_eq!(relation, Expansion::None);
    }
}
