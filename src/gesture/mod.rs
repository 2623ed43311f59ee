//! Gesture Recognition Pipeline
//!
//! Converts noisy per-frame hand-landmark streams into stabilized,
//! debounced gesture states plus smoothed pointer and zoom signals.
//!
//! ## Module Structure
//!
//! - `landmarks` - 21-point hand indexing and centroid helpers
//! - `vocabulary` - stateless hand-shape predicates
//! - `stabilizer` - temporal debounce state machine
//! - `smoother` - double-exponential motion smoothing
//! - `pipeline` - per-frame orchestration of the above

mod landmarks;
mod pipeline;
mod smoother;
mod stabilizer;
mod vocabulary;

pub use landmarks::{
    palm_centroid, HandFrame, HandLandmarks, Landmark, FINGERTIPS, FINGER_JOINTS, INDEX_MCP,
    INDEX_PIP, INDEX_TIP, MIDDLE_MCP, MIDDLE_PIP, MIDDLE_TIP, PINKY_MCP, PINKY_PIP, PINKY_TIP,
    RING_MCP, RING_PIP, RING_TIP, THUMB_TIP, WRIST,
};
pub use pipeline::{GesturePipeline, PipelineOutput};
pub use smoother::{Holt, Holt2};
pub use stabilizer::GestureStabilizer;
pub use vocabulary::{
    detect_expansion, is_fist, is_open_palm, is_pointing, is_two_finger_point, Expansion,
    GestureName,
};
