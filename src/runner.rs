use std::{fs, path::Path, sync::Arc, thread};

pub use anyhow::Result;
use anyhow::Context;
use chrono::TimeDelta;
use log::{info, warn};

use crate::{
    briefing::{FlightSummary, RocketSummary},
    core::time::{Clock, SimulatedClock, SystemClock, frame_period},
    geometry::{RocketSpec, ShapeModel},
    parameters::{ParameterMap, parse_string},
    render::{
        RocketRenderer,
        compositor::{DrawCommand, Palette},
        view::{ViewConfig, WindowSize},
    },
};

pub const DEFAULT_FPS: f64 = 60.0;

/// Everything read from a rocket description file.
pub struct LoadedRocket {
    pub shape: Arc<ShapeModel>,
    pub summary: RocketSummary,
    pub flight: Option<FlightSummary>,
}

pub fn read_params(path: &Path) -> Result<ParameterMap> {
    info!("Reading parameters from '{}'", path.display());

    let toml = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    Ok(parse_string(&toml)?)
}

pub fn load_rocket(params: &ParameterMap) -> Result<LoadedRocket> {
    let spec = RocketSpec::from_params(params.get_map("rocket")?)?;
    let shape = ShapeModel::new(&spec)?;

    let flight = if params.has("flight") {
        Some(FlightSummary::from_params(params.get_map("flight")?)?)
    } else {
        None
    };

    Ok(LoadedRocket {
        summary: RocketSummary::from_shape(&shape),
        shape: Arc::new(shape),
        flight,
    })
}

/// Renders frames back to back on a simulated clock at the configured rate.
pub struct FrameRunner {
    renderer: RocketRenderer,
    clock: SimulatedClock,
    fps: f64,
}

impl FrameRunner {
    /// `view` may be empty: every view setting has a default.
    pub fn new(shape: Arc<ShapeModel>, view: &ParameterMap) -> Result<Self> {
        let config = if view.has("view") {
            ViewConfig::from_params(view.get_map("view")?)?
        } else {
            ViewConfig::default()
        };
        let palette = if view.has("palette") {
            Palette::from_params(view.get_map("palette")?)?
        } else {
            Palette::default()
        };
        let fps = if view.has("render.fps") {
            view.get_f64("render.fps")?
        } else {
            DEFAULT_FPS
        };
        anyhow::ensure!(fps > 0.0, "Frame rate must be positive (got {fps})");

        Ok(FrameRunner {
            renderer: RocketRenderer::new(shape, config, palette),
            clock: SimulatedClock::default(),
            fps,
        })
    }

    pub fn renderer(&self) -> &RocketRenderer {
        &self.renderer
    }

    /// Renders `frames` frames and returns the draw list of the last one.
    pub fn run(&mut self, frames: u32, window: WindowSize) -> &[DrawCommand] {
        let dt = frame_period(self.fps);
        info!(
            "Rendering {frames} frames at {:.1} fps in a {}x{} window",
            self.fps, window.width, window.height
        );

        for _ in 0..frames {
            self.renderer.update(self.clock.monotonic(), window);
            self.clock.step(dt);
        }

        self.renderer.commands()
    }

    /// Same as `run`, but paced against the wall clock: each frame is drawn
    /// at the time it is due, or immediately if rendering fell behind.
    pub fn run_realtime(&mut self, frames: u32, window: WindowSize) -> Result<&[DrawCommand]> {
        let dt = frame_period(self.fps);
        let clock = SystemClock::default();
        info!(
            "Rendering {frames} frames in real time at {:.1} fps in a {}x{} window",
            self.fps, window.width, window.height
        );

        let mut due = TimeDelta::zero();
        let mut late = 0u32;
        for _ in 0..frames {
            let ahead = due - clock.monotonic().elapsed();
            if ahead > TimeDelta::zero() {
                thread::sleep(ahead.to_std()?);
            } else if ahead < -dt {
                late += 1;
            }

            self.renderer.update(clock.monotonic(), window);
            due += dt;
        }

        if late > 0 {
            warn!("{late} of {frames} frames started more than one period late");
        }

        Ok(self.renderer.commands())
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::*;

    const ROCKET: &str = "
    [rocket]
    length = { val = 1.0, type = \"float\" }
    dry_mass = { val = 0.25, type = \"float\" }

    [rocket.nose]
    length = { val = 0.3, type = \"float\" }
    radii = { val = [0.0, 0.02, 0.035, 0.045, 0.05], type = \"float[]\" }

    [rocket.bodies.tube]
    start = { val = 0.3, type = \"float\" }
    length = { val = 0.7, type = \"float\" }
    radius = { val = 0.05, type = \"float\" }

    [rocket.bodies.tube.fins.trapezoidal]
    root = { val = [0.8, 0.05], type = \"point\" }
    outline = { val = [[0.0, 0.0], [0.1, 0.08], [0.2, 0.0]], type = \"point[]\" }
    count = { val = 3, type = \"int\" }

    [flight]
    flight_time = { val = 9.5, type = \"float\" }
    max_altitude = { val = 120.0, type = \"float\" }
    max_velocity = { val = 45.0, type = \"float\" }
    ";

    #[test]
    fn test_load_rocket() {
        let loaded = load_rocket(&parse_string(ROCKET).unwrap()).unwrap();

        assert_eq!(loaded.shape.bodies().len(), 1);
        assert_eq!(loaded.shape.nose().polygon().len(), 9);
        assert_relative_eq!(loaded.summary.dry_mass_g, 250.0);
        assert_relative_eq!(loaded.flight.unwrap().max_altitude_m, 120.0);
    }

    #[test]
    fn test_load_rejects_invalid_geometry() {
        let bad = ROCKET.replace(
            "count = { val = 3, type = \"int\" }",
            "count = { val = 0, type = \"int\" }",
        );
        let err = load_rocket(&parse_string(&bad).unwrap()).err().unwrap();
        assert!(err.to_string().contains("fin count of 0"));
    }

    #[test]
    fn test_run_defaults() {
        let loaded = load_rocket(&parse_string(ROCKET).unwrap()).unwrap();
        let mut runner = FrameRunner::new(loaded.shape, &ParameterMap::default()).unwrap();

        // Nose, three fins, body
        let commands = runner.run(1, WindowSize::new(1280, 720));
        assert_eq!(commands.len(), 5);
    }

    #[test]
    fn test_run_advances_roll() {
        let view = "
        [view]
        roll_rate_deg_s = { val = 90.0, type = \"float\" }

        [render]
        fps = { val = 10.0, type = \"float\" }
        ";
        let loaded = load_rocket(&parse_string(ROCKET).unwrap()).unwrap();
        let mut runner = FrameRunner::new(loaded.shape, &parse_string(view).unwrap()).unwrap();

        // The 21st frame is drawn at t = 2 s
        runner.run(21, WindowSize::new(640, 480));
        let roll = runner.renderer().frame().unwrap().view.roll_rad;
        assert_relative_eq!(roll, PI, epsilon = 1e-9);
    }

    #[test]
    fn test_bad_fps() {
        let loaded = load_rocket(&parse_string(ROCKET).unwrap()).unwrap();
        let view = "[render]\nfps = { val = 0.0, type = \"float\" }";
        assert!(FrameRunner::new(loaded.shape, &parse_string(view).unwrap()).is_err());
    }

    #[test]
    fn test_run_realtime_follows_wall_clock() {
        let loaded = load_rocket(&parse_string(ROCKET).unwrap()).unwrap();
        let view = "[render]\nfps = { val = 200.0, type = \"float\" }";
        let mut runner = FrameRunner::new(loaded.shape, &parse_string(view).unwrap()).unwrap();

        let start = std::time::Instant::now();
        let commands = runner.run_realtime(5, WindowSize::new(640, 480)).unwrap();
        assert_eq!(commands.len(), 5);

        // The last frame is due 4 periods (20 ms) after the first
        assert!(start.elapsed() >= std::time::Duration::from_millis(20));
        let roll = runner.renderer().frame().unwrap().view.roll_rad;
        assert!(roll > 0.0);
    }
}
