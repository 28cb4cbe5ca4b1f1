pub mod cache;
pub mod compositor;
pub mod projector;
pub mod transform;
pub mod view;

use std::sync::Arc;

use log::trace;

use crate::core::time::Instant;
use crate::geometry::ShapeModel;
use cache::StaticLayerCache;
use compositor::{BodyFrame, DrawCommand, LayerCompositor, Palette, RocketFrame, Surface};
use projector::PartProjector;
use view::{ViewConfig, ViewState, WindowSize};

/// Drives one rocket view: `update` once per frame, then `draw`.
///
/// Holds the shared shape, the fixed view, the static-layer cache and the
/// last frame's polygons. Nothing else survives from one frame to the next.
pub struct RocketRenderer {
    shape: Arc<ShapeModel>,
    config: ViewConfig,
    compositor: LayerCompositor,
    cache: StaticLayerCache,

    frame: Option<RocketFrame>,
    commands: Vec<DrawCommand>,
}

impl RocketRenderer {
    pub fn new(shape: Arc<ShapeModel>, config: ViewConfig, palette: Palette) -> Self {
        RocketRenderer {
            shape,
            config,
            compositor: LayerCompositor::new(palette),
            cache: StaticLayerCache::default(),
            frame: None,
            commands: vec![],
        }
    }

    pub fn shape(&self) -> &ShapeModel {
        &self.shape
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ViewConfig) {
        self.config = config;
        self.cache.clear();
    }

    /// Re-projects every part for the time `now` and the current window.
    pub fn update(&mut self, now: Instant, window: WindowSize) {
        let view = ViewState::compute(
            &self.config,
            now.elapsed_seconds_f64(),
            window,
            self.shape.length_m(),
        );
        let transform = view.transform();

        let layers = self.cache.get_or_project(window, &self.shape, &transform);

        let bodies = self
            .shape
            .bodies()
            .iter()
            .zip(&layers.tubes)
            .map(|(body, tube)| BodyFrame {
                tube: tube.clone(),
                fins: body
                    .fins()
                    .iter()
                    .map(|fins| fins.project(&transform, view.roll_rad))
                    .collect(),
            })
            .collect();

        let frame = RocketFrame {
            nose: layers.nose.clone(),
            bodies,
            view,
        };

        self.compositor.compose_into(&frame, &mut self.commands);
        trace!(
            "Frame at roll {:.3} rad: {} draw commands",
            frame.view.roll_rad,
            self.commands.len()
        );

        self.frame = Some(frame);
    }

    pub fn frame(&self) -> Option<&RocketFrame> {
        self.frame.as_ref()
    }

    /// Draw list of the last update, back to front.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn draw(&self, surface: &mut impl Surface) {
        for command in &self.commands {
            surface.draw_polygon(command);
        }
    }
}
