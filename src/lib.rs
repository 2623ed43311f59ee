//! Kinegraph - Force-Directed Graph Layout with Gesture Navigation
//!
//! The core of an interactive graph visualizer: an off-main-thread physics
//! simulation and a gesture-recognition pipeline, decoupled from the host
//! renderer through a publish/subscribe intent bus.

pub mod bus;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod gesture;
pub mod model;
pub mod navigation;
pub mod physics;
pub mod worker;

pub use bus::{IntentBus, IntentEvent, IntentKind};
pub use config::Config;
pub use error::CoreError;
pub use model::{Edge, GraphSnapshot, LayoutMode, Node, Viewport};
