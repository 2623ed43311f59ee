//! Double-exponential (Holt) motion smoothing.
//!
//! Simple exponential smoothing lags during fast motion; the trend term
//! compensates, giving responsive tracking without sacrificing idle-state
//! stability. The 2D variant optionally adapts its level coefficient to the
//! jump distance, so large motions cut lag while small ones stay smooth.

use glam::Vec2;

use crate::config::SmoothingConfig;

/// Scalar Holt smoother.
#[derive(Debug, Clone)]
pub struct Holt {
    alpha: f32,
    beta: f32,
    /// (level, trend); empty until the first sample.
    state: Option<(f32, f32)>,
}

impl Holt {
    pub fn new(alpha: f32, beta: f32) -> Self {
        Self {
            alpha,
            beta,
            state: None,
        }
    }

    /// Feed one raw sample, get the smoothed value. The first sample
    /// initializes the level and is returned unsmoothed (no trend yet).
    pub fn update(&mut self, raw: f32) -> f32 {
        match self.state {
            None => {
                self.state = Some((raw, 0.0));
                raw
            }
            Some((level, trend)) => {
                let next_level = self.alpha * raw + (1.0 - self.alpha) * (level + trend);
                let next_trend =
                    self.beta * (next_level - level) + (1.0 - self.beta) * trend;
                self.state = Some((next_level, next_trend));
                next_level
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = None;
    }

    #[cfg(test)]
    fn trend(&self) -> f32 {
        self.state.map(|(_, b)| b).unwrap_or(0.0)
    }
}

/// 2D Holt smoother with optional adaptive level coefficient.
#[derive(Debug, Clone)]
pub struct Holt2 {
    alpha: f32,
    beta: f32,
    adaptive: bool,
    alpha_min: f32,
    alpha_max: f32,
    adaptive_gain: f32,
    state: Option<(Vec2, Vec2)>,
}

impl Holt2 {
    pub fn from_config(config: &SmoothingConfig) -> Self {
        Self {
            alpha: config.alpha,
            beta: config.beta,
            adaptive: config.adaptive,
            alpha_min: config.alpha_min,
            alpha_max: config.alpha_max,
            adaptive_gain: config.adaptive_gain,
            state: None,
        }
    }

    pub fn update(&mut self, raw: Vec2) -> Vec2 {
        match self.state {
            None => {
                self.state = Some((raw, Vec2::ZERO));
                raw
            }
            Some((level, trend)) => {
                let alpha = if self.adaptive {
                    // Larger jumps raise alpha (less lag); small jumps lower
                    // it (more stability).
                    (self.adaptive_gain * raw.distance(level))
                        .clamp(self.alpha_min, self.alpha_max)
                } else {
                    self.alpha
                };
                let next_level = raw * alpha + (level + trend) * (1.0 - alpha);
                let next_trend = (next_level - level) * self.beta + trend * (1.0 - self.beta);
                self.state = Some((next_level, next_trend));
                next_level
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_passes_through() {
        let mut smoother = Holt::new(0.5, 0.3);
        assert_eq!(smoother.update(3.7), 3.7);
    }

    #[test]
    fn test_constant_input_converges() {
        let mut smoother = Holt::new(0.5, 0.3);
        let mut last = 0.0;
        for _ in 0..200 {
            last = smoother.update(10.0);
        }
        assert!((last - 10.0).abs() < 1e-3);
        assert!(smoother.trend().abs() < 1e-3);
    }

    #[test]
    fn test_step_input_overshoot_is_bounded() {
        let mut smoother = Holt::new(0.5, 0.3);
        for _ in 0..50 {
            smoother.update(0.0);
        }
        let mut peak = f32::MIN;
        for _ in 0..100 {
            peak = peak.max(smoother.update(1.0));
        }
        // The trend term overshoots a step, but boundedly so
        assert!(peak >= 1.0);
        assert!(peak < 1.5);
    }

    #[test]
    fn test_adaptive_alpha_tracks_jumps_faster() {
        let config = SmoothingConfig::default();
        let mut adaptive = Holt2::from_config(&config);
        let mut fixed = Holt2::from_config(&SmoothingConfig {
            adaptive: false,
            alpha: 0.15,
            ..config.clone()
        });

        for s in [adaptive.update(Vec2::ZERO), fixed.update(Vec2::ZERO)] {
            assert_eq!(s, Vec2::ZERO);
        }
        // A large jump: the adaptive smoother closes more of the gap
        let target = Vec2::new(0.5, 0.0);
        let a = adaptive.update(target);
        let f = fixed.update(target);
        assert!(a.x > f.x, "adaptive {a:?} should outrun fixed {f:?}");
    }

    #[test]
    fn test_reset_forgets_state() {
        let mut smoother = Holt::new(0.5, 0.3);
        smoother.update(100.0);
        smoother.update(100.0);
        smoother.reset();
        assert_eq!(smoother.update(2.0), 2.0);
    }
}
