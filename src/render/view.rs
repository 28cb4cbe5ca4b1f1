//! Screen placement of the rocket, recomputed every frame from the view
//! settings, the window and the time.

use std::f64::consts::TAU;

use anyhow::Result;
use nalgebra::{Point2, Vector2};

use super::transform::{FrameTransform, compute_scale};
use crate::parameters::ParameterMap;

/// Current drawable area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    pub fn new(width: u32, height: u32) -> Self {
        WindowSize { width, height }
    }
}

/// Fixed parameters of one view of the rocket. Angles in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    /// Anchor of the rocket's midpoint, as fractions of the window size.
    pub position: Vector2<f64>,
    /// Fraction of the window height covered by the rocket's total length.
    pub drawing_size: f64,
    pub roll_rate_deg_s: f64,
    pub pitch_deg: f64,
    pub yaw_deg: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            position: Vector2::new(0.5, 0.5),
            drawing_size: 0.8,
            roll_rate_deg_s: 360.0 * 3.0,
            pitch_deg: 0.0,
            yaw_deg: 0.0,
        }
    }
}

impl ViewConfig {
    /// Reads the `view` section. Missing entries keep their defaults.
    pub fn from_params(params: &ParameterMap) -> Result<Self> {
        let mut config = ViewConfig::default();

        if params.has("position") {
            config.position = params.get_param("position")?.value_point()?.coords;
        }
        if params.has("drawing_size") {
            config.drawing_size = params.get_f64("drawing_size")?;
        }
        if params.has("roll_rate_deg_s") {
            config.roll_rate_deg_s = params.get_f64("roll_rate_deg_s")?;
        }
        if params.has("pitch_deg") {
            config.pitch_deg = params.get_f64("pitch_deg")?;
        }
        if params.has("yaw_deg") {
            config.yaw_deg = params.get_f64("yaw_deg")?;
        }

        Ok(config)
    }
}

/// Per-frame orientation and placement. Recomputed every frame, never stored
/// across frames.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// In `[0, 2π)`.
    pub roll_rad: f64,
    pub pitch_rad: f64,
    pub yaw_rad: f64,
    pub center_px: Point2<f64>,
    pub scale_px_m: f64,
}

impl ViewState {
    pub fn compute(
        config: &ViewConfig,
        elapsed_s: f64,
        window: WindowSize,
        total_length_m: f64,
    ) -> Self {
        let yaw_rad = config.yaw_deg.to_radians();
        let window_px = Vector2::new(window.width as f64, window.height as f64);

        ViewState {
            roll_rad: roll_angle(elapsed_s, config.roll_rate_deg_s),
            pitch_rad: config.pitch_deg.to_radians(),
            yaw_rad,
            center_px: Point2::from(window_px.component_mul(&config.position)),
            scale_px_m: compute_scale(
                window.height as f64,
                total_length_m,
                config.drawing_size,
                yaw_rad,
            ),
        }
    }

    pub fn transform(&self) -> FrameTransform {
        FrameTransform::new(self.pitch_rad, self.scale_px_m, self.center_px)
    }
}

/// Roll after `elapsed_s` seconds at a constant rate, wrapped to `[0, 2π)`.
pub fn roll_angle(elapsed_s: f64, rate_deg_s: f64) -> f64 {
    // Wrap in degrees first to keep precision over long runs
    let deg = (elapsed_s * rate_deg_s).rem_euclid(360.0);
    deg.to_radians().rem_euclid(TAU)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::*;
    use crate::parameters::parse_string;

    #[test]
    fn test_roll_wraps() {
        assert_relative_eq!(roll_angle(0.0, 1080.0), 0.0);
        // Half a second at three turns per second is one and a half turns
        assert_relative_eq!(roll_angle(0.5, 1080.0), PI, epsilon = 1e-12);
        assert_relative_eq!(roll_angle(1.0 / 12.0, 1080.0), PI / 2.0, epsilon = 1e-12);

        let late = roll_angle(3600.0 * 24.0 + 0.5, 1080.0);
        assert!((0.0..TAU).contains(&late));
        assert_relative_eq!(late, PI, epsilon = 1e-6);

        let backwards = roll_angle(0.25, -360.0);
        assert_relative_eq!(backwards, 1.5 * PI, epsilon = 1e-12);
    }

    #[test]
    fn test_view_state() {
        let config = ViewConfig {
            position: Vector2::new(0.2, 0.5),
            drawing_size: 0.75,
            roll_rate_deg_s: 1080.0,
            pitch_deg: 15.0,
            yaw_deg: 60.0,
        };
        let state = ViewState::compute(&config, 0.0, WindowSize::new(1280, 720), 1.5);

        assert_relative_eq!(state.center_px, Point2::new(256.0, 360.0));
        assert_relative_eq!(state.pitch_rad, 15f64.to_radians());
        assert_relative_eq!(state.scale_px_m, 720.0 * 0.75 / 1.5 * 0.5, epsilon = 1e-9);
        assert_relative_eq!(state.roll_rad, 0.0);
    }

    #[test]
    fn test_from_params() {
        let toml = "
        [view]
        position = { val = [0.2, 0.5], type = \"point\" }
        pitch_deg = { val = 15, type = \"int\" }
        drawing_size = { val = 0.75, type = \"float\" }
        ";
        let params = parse_string(toml).unwrap();
        let config = ViewConfig::from_params(params.get_map("view").unwrap()).unwrap();

        assert_eq!(
            config,
            ViewConfig {
                position: Vector2::new(0.2, 0.5),
                drawing_size: 0.75,
                pitch_deg: 15.0,
                ..ViewConfig::default()
            }
        );
    }
}
