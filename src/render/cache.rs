//! Nose and tube polygons, which do not change while the window and shape stay the same.

use log::debug;

use super::projector::{PartProjector, Polygon};
use super::transform::FrameTransform;
use super::view::WindowSize;
use crate::geometry::{ShapeId, ShapeModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub window: WindowSize,
    pub shape: ShapeId,
}

/// Pixel polygons of the parts that do not depend on roll.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticLayers {
    pub nose: Polygon,
    /// Tube polygon of each body, front-to-back.
    pub tubes: Vec<Polygon>,
}

/// Nose and tube polygons only change with the window size, the shape, or the
/// view configuration. The owner must call [`StaticLayerCache::clear`] when
/// the view configuration changes.
#[derive(Debug, Clone, Default)]
pub struct StaticLayerCache {
    entry: Option<(CacheKey, StaticLayers)>,
}

impl StaticLayerCache {
    pub fn get_or_project(
        &mut self,
        window: WindowSize,
        shape: &ShapeModel,
        transform: &FrameTransform,
    ) -> &StaticLayers {
        let key = CacheKey {
            window,
            shape: shape.id(),
        };

        if self.entry.as_ref().is_some_and(|(cached, _)| *cached != key) {
            self.entry = None;
        }

        let (_, layers) = self.entry.get_or_insert_with(|| {
            debug!("Projecting static layers for {key:?}");
            (key, project_static(shape, transform))
        });
        layers
    }

    pub fn clear(&mut self) {
        if self.entry.take().is_some() {
            debug!("Static layer cache cleared");
        }
    }

    pub fn key(&self) -> Option<CacheKey> {
        self.entry.as_ref().map(|(k, _)| *k)
    }
}

fn project_static(shape: &ShapeModel, transform: &FrameTransform) -> StaticLayers {
    StaticLayers {
        nose: shape.nose().project(transform, 0.0),
        tubes: shape
            .bodies()
            .iter()
            .map(|b| b.project(transform, 0.0))
            .collect(),
    }
}
