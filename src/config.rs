//! Configuration with layered resolution using figment.
//!
//! Resolution order (highest priority last):
//! 1. User config: `~/.config/kinegraph/config.toml` (XDG) or platform config dir
//! 2. Project config: `.kinegraph.toml`
//! 3. Environment variables: `KINEGRAPH_*`
//!
//! Every tunable in the gesture and physics subsystems lives here. The
//! defaults carry the empirically tuned values; hosts override only what
//! they need:
//!
//! ```toml
//! [stabilizer]
//! hold_ms = 200
//!
//! [physics]
//! damping = 0.9
//! ```

use std::ops::Deref;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

/// Boxed wrapper for figment::Error to reduce Result size on the stack.
#[derive(Debug)]
pub struct ConfigError(Box<figment::Error>);

impl Deref for ConfigError {
    type Target = figment::Error;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self(Box::new(err))
    }
}

/// Root configuration structure. Every section has working defaults, so an
/// absent config file yields a fully usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub smoothing: SmoothingConfig,
    #[serde(default)]
    pub stabilizer: StabilizerConfig,
    #[serde(default)]
    pub gestures: GestureToggles,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub physics: PhysicsConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub camera: CameraConfig,
}

/// Hand-shape classification thresholds (normalized landmark coordinates).
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Extension severity: a finger counts as extended when the tip-to-pip
    /// distance exceeds this fraction of the pip-to-mcp segment.
    #[serde(default = "default_extension_ratio")]
    pub extension_ratio: f32,
    /// Mean fingertip-to-palm-centroid distance below which a hand is a fist.
    #[serde(default = "default_fist_radius")]
    pub fist_radius: f32,
    /// Minimum count of extended fingers (index..pinky) for an open palm.
    /// Relaxed from 4 to tolerate partial occlusion.
    #[serde(default = "default_open_palm_min")]
    pub open_palm_min_extended: u8,
    /// Inter-hand centroid distance change that registers as expansion
    /// or collapse between consecutive frames.
    #[serde(default = "default_expansion_delta")]
    pub expansion_delta: f32,
}

fn default_extension_ratio() -> f32 {
    0.75
}
fn default_fist_radius() -> f32 {
    0.09
}
fn default_open_palm_min() -> u8 {
    3
}
fn default_expansion_delta() -> f32 {
    0.03
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            extension_ratio: default_extension_ratio(),
            fist_radius: default_fist_radius(),
            open_palm_min_extended: default_open_palm_min(),
            expansion_delta: default_expansion_delta(),
        }
    }
}

/// Double-exponential smoothing coefficients for pointer and zoom signals.
#[derive(Debug, Clone, Deserialize)]
pub struct SmoothingConfig {
    /// Level coefficient for the pointer smoother.
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    /// Trend coefficient for the pointer smoother.
    #[serde(default = "default_beta")]
    pub beta: f32,
    /// Recompute alpha per sample from the raw-vs-smoothed jump distance.
    #[serde(default = "default_adaptive")]
    pub adaptive: bool,
    /// Alpha floor in adaptive mode.
    #[serde(default = "default_alpha_min")]
    pub alpha_min: f32,
    /// Alpha ceiling in adaptive mode.
    #[serde(default = "default_alpha_max")]
    pub alpha_max: f32,
    /// Jump-distance multiplier feeding the adaptive alpha.
    #[serde(default = "default_adaptive_gain")]
    pub adaptive_gain: f32,
    /// Level coefficient for the zoom-ratio smoother.
    #[serde(default = "default_zoom_alpha")]
    pub zoom_alpha: f32,
    /// Trend coefficient for the zoom-ratio smoother.
    #[serde(default = "default_zoom_beta")]
    pub zoom_beta: f32,
}

fn default_alpha() -> f32 {
    0.5
}
fn default_beta() -> f32 {
    0.3
}
fn default_adaptive() -> bool {
    true
}
fn default_alpha_min() -> f32 {
    0.15
}
fn default_alpha_max() -> f32 {
    0.85
}
fn default_adaptive_gain() -> f32 {
    12.0
}
fn default_zoom_alpha() -> f32 {
    0.35
}
fn default_zoom_beta() -> f32 {
    0.1
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            beta: default_beta(),
            adaptive: default_adaptive(),
            alpha_min: default_alpha_min(),
            alpha_max: default_alpha_max(),
            adaptive_gain: default_adaptive_gain(),
            zoom_alpha: default_zoom_alpha(),
            zoom_beta: default_zoom_beta(),
        }
    }
}

/// Debounce durations for the gesture state machine.
#[derive(Debug, Clone, Deserialize)]
pub struct StabilizerConfig {
    /// Sustained detection required before a gesture activates.
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,
    /// Sustained absence required before an active gesture deactivates.
    #[serde(default = "default_exit_ms")]
    pub exit_ms: u64,
    /// Re-arm delay after a confirmed exit.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// Strict hold: a single missed frame during hold reverts to idle.
    /// When false, gaps shorter than `grace_ms` are tolerated.
    #[serde(default)]
    pub strict_hold: bool,
    /// Detection gap tolerated during hold when `strict_hold` is false.
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,
}

fn default_hold_ms() -> u64 {
    150
}
fn default_exit_ms() -> u64 {
    300
}
fn default_cooldown_ms() -> u64 {
    500
}
fn default_grace_ms() -> u64 {
    80
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            hold_ms: default_hold_ms(),
            exit_ms: default_exit_ms(),
            cooldown_ms: default_cooldown_ms(),
            strict_hold: false,
            grace_ms: default_grace_ms(),
        }
    }
}

/// Per-gesture enable flag and sensitivity multiplier.
#[derive(Debug, Clone, Deserialize)]
pub struct GestureToggle {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
}

fn default_enabled() -> bool {
    true
}
fn default_sensitivity() -> f32 {
    1.0
}

impl Default for GestureToggle {
    fn default() -> Self {
        Self {
            enabled: true,
            sensitivity: 1.0,
        }
    }
}

/// Enable flags and sensitivities for each recognized gesture.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GestureToggles {
    #[serde(default)]
    pub pan: GestureToggle,
    #[serde(default)]
    pub rotate: GestureToggle,
    #[serde(default)]
    pub lock: GestureToggle,
    #[serde(default)]
    pub inspect: GestureToggle,
    #[serde(default)]
    pub zoom: GestureToggle,
    #[serde(default)]
    pub cluster: GestureToggle,
}

/// Intent-emission gating for the controller.
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerConfig {
    /// Minimum pointer delta (normalized) before a PAN is emitted.
    #[serde(default = "default_pan_deadzone")]
    pub pan_deadzone: f32,
    /// Minimum horizontal delta before a ROTATE is emitted.
    #[serde(default = "default_rotate_deadzone")]
    pub rotate_deadzone: f32,
    /// Distance from the neutral 1.0 ratio before a ZOOM is emitted.
    #[serde(default = "default_zoom_deadzone")]
    pub zoom_deadzone: f32,
    /// Quiet interval after the last non-idle frame before IDLE is signaled.
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
}

fn default_pan_deadzone() -> f32 {
    0.004
}
fn default_rotate_deadzone() -> f32 {
    0.003
}
fn default_zoom_deadzone() -> f32 {
    0.05
}
fn default_idle_timeout_ms() -> u64 {
    1200
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            pan_deadzone: default_pan_deadzone(),
            rotate_deadzone: default_rotate_deadzone(),
            zoom_deadzone: default_zoom_deadzone(),
            idle_timeout_ms: default_idle_timeout_ms(),
        }
    }
}

/// Layout simulation constants.
#[derive(Debug, Clone, Deserialize)]
pub struct PhysicsConfig {
    /// Pairwise repulsion constant (force = repulsion / d^2).
    #[serde(default = "default_repulsion")]
    pub repulsion: f32,
    /// Hooke spring constant for edge attraction.
    #[serde(default = "default_spring")]
    pub spring: f32,
    /// Edge rest length in layout units.
    #[serde(default = "default_rest_length")]
    pub rest_length: f32,
    /// Weak pull toward the viewport center.
    #[serde(default = "default_centering")]
    pub centering: f32,
    /// Per-step velocity multiplier, < 1.
    #[serde(default = "default_damping")]
    pub damping: f32,
    /// Velocity magnitude cap.
    #[serde(default = "default_max_speed")]
    pub max_speed: f32,
    /// Velocities below this are zeroed to kill micro-jitter.
    #[serde(default = "default_min_speed")]
    pub min_speed: f32,
    /// Total kinetic energy under which the layout counts as settled.
    #[serde(default = "default_energy_floor")]
    pub energy_floor: f32,
    /// Distance epsilon guarding the repulsion singularity at d = 0.
    #[serde(default = "default_epsilon")]
    pub epsilon: f32,
    /// Spring strength pulling nodes to their grid slot.
    #[serde(default = "default_grid_strength")]
    pub grid_strength: f32,
    /// Spring strength pulling nodes to their ring position.
    #[serde(default = "default_radial_strength")]
    pub radial_strength: f32,
    /// Radius of the innermost cluster ring.
    #[serde(default = "default_radial_base")]
    pub radial_base: f32,
    /// Radius increase per cluster rank.
    #[serde(default = "default_radial_step")]
    pub radial_step: f32,
}

fn default_repulsion() -> f32 {
    6000.0
}
fn default_spring() -> f32 {
    0.05
}
fn default_rest_length() -> f32 {
    120.0
}
fn default_centering() -> f32 {
    0.005
}
fn default_damping() -> f32 {
    0.85
}
fn default_max_speed() -> f32 {
    40.0
}
fn default_min_speed() -> f32 {
    0.01
}
fn default_energy_floor() -> f32 {
    0.05
}
fn default_epsilon() -> f32 {
    0.01
}
fn default_grid_strength() -> f32 {
    0.12
}
fn default_radial_strength() -> f32 {
    0.12
}
fn default_radial_base() -> f32 {
    140.0
}
fn default_radial_step() -> f32 {
    90.0
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            repulsion: default_repulsion(),
            spring: default_spring(),
            rest_length: default_rest_length(),
            centering: default_centering(),
            damping: default_damping(),
            max_speed: default_max_speed(),
            min_speed: default_min_speed(),
            energy_floor: default_energy_floor(),
            epsilon: default_epsilon(),
            grid_strength: default_grid_strength(),
            radial_strength: default_radial_strength(),
            radial_base: default_radial_base(),
            radial_step: default_radial_step(),
        }
    }
}

/// Inertia and mouse-arbitration settings for the navigation adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct NavigationConfig {
    /// Velocity decay per normalized frame, < 1.
    #[serde(default = "default_friction")]
    pub friction: f32,
    /// Velocity components under this stop being applied to the camera.
    #[serde(default = "default_rest_threshold")]
    pub rest_threshold: f32,
    /// Gesture navigation is suppressed for this long after mouse movement.
    #[serde(default = "default_mouse_cooldown_ms")]
    pub mouse_cooldown_ms: i64,
    /// Event groups the adapter applies to the camera.
    #[serde(default = "default_enabled")]
    pub apply_pan: bool,
    #[serde(default = "default_enabled")]
    pub apply_zoom: bool,
    #[serde(default = "default_enabled")]
    pub apply_rotate: bool,
    #[serde(default = "default_enabled")]
    pub apply_lock: bool,
}

fn default_friction() -> f32 {
    0.92
}
fn default_rest_threshold() -> f32 {
    0.0005
}
fn default_mouse_cooldown_ms() -> i64 {
    2000
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            friction: default_friction(),
            rest_threshold: default_rest_threshold(),
            mouse_cooldown_ms: default_mouse_cooldown_ms(),
            apply_pan: true,
            apply_zoom: true,
            apply_rotate: true,
            apply_lock: true,
        }
    }
}

/// Camera acquisition parameters handed to the tracking platform.
#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_width")]
    pub width: u32,
    #[serde(default = "default_camera_height")]
    pub height: u32,
    /// "user" (front-facing) or "environment".
    #[serde(default = "default_camera_facing")]
    pub facing: String,
}

fn default_camera_width() -> u32 {
    640
}
fn default_camera_height() -> u32 {
    480
}
fn default_camera_facing() -> String {
    "user".to_string()
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: default_camera_width(),
            height: default_camera_height(),
            facing: default_camera_facing(),
        }
    }
}

impl Config {
    /// Load config with layered resolution (user → project → env).
    pub fn load() -> Result<Self, ConfigError> {
        let user_config = Self::user_config_path();

        Figment::new()
            // Layer 1: User config (lowest priority)
            .merge(Toml::file(user_config))
            // Layer 2: Project config
            .merge(Toml::file(".kinegraph.toml"))
            // Layer 3: Environment variables (highest priority)
            .merge(Env::prefixed("KINEGRAPH_").split("_"))
            .extract()
            .map_err(ConfigError::from)
    }

    /// User config path: ~/.config/kinegraph/config.toml (XDG) or platform config dir.
    fn user_config_path() -> std::path::PathBuf {
        // Prefer XDG config location (~/.config) on all platforms
        if let Some(home) = dirs::home_dir() {
            let xdg_path = home.join(".config").join("kinegraph").join("config.toml");
            if xdg_path.exists() {
                return xdg_path;
            }
        }
        // Fall back to platform-specific config dir
        dirs::config_dir()
            .map(|p| p.join("kinegraph").join("config.toml"))
            .unwrap_or_default()
    }
}
