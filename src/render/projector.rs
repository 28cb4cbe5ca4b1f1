//! Per-part projection of the unit-scale shape into pixel polygons.

use std::f64::consts::{PI, TAU};

use nalgebra::Point2;

use super::transform::FrameTransform;
use crate::geometry::{BodyShape, FinShape, NoseShape};

pub type Polygon = Vec<Point2<f64>>;

/// Re-projects a part of the rocket for the current frame.
pub trait PartProjector {
    type Output;

    fn project(&self, transform: &FrameTransform, roll_rad: f64) -> Self::Output;
}

impl PartProjector for NoseShape {
    type Output = Polygon;

    fn project(&self, transform: &FrameTransform, _roll_rad: f64) -> Polygon {
        transform.project_all(self.polygon())
    }
}

/// The tube itself is rotationally symmetric: roll only matters to its fins.
impl PartProjector for BodyShape {
    type Output = Polygon;

    fn project(&self, transform: &FrameTransform, _roll_rad: f64) -> Polygon {
        transform.project_all(self.corners())
    }
}

/// One fin of a fin set, at its current azimuth.
#[derive(Debug, Clone, PartialEq)]
pub struct FinInstance {
    pub azimuth_rad: f64,
    pub forward: bool,
    pub polygon: Polygon,
}

impl PartProjector for FinShape {
    type Output = Vec<FinInstance>;

    /// Fins are spread evenly around the tube. Each one is flattened by the
    /// cosine of its azimuth on the radial axis only, which stands in for the
    /// fin turning out of the view plane.
    fn project(&self, transform: &FrameTransform, roll_rad: f64) -> Vec<FinInstance> {
        let spacing = TAU / self.count() as f64;

        (0..self.count())
            .map(|i| {
                let azimuth_rad = spacing * i as f64 + roll_rad;
                let radial = azimuth_rad.cos();

                FinInstance {
                    azimuth_rad,
                    forward: is_forward(azimuth_rad),
                    polygon: self
                        .outline()
                        .iter()
                        .map(|p| transform.project(&Point2::new(p.x * radial, p.y)))
                        .collect(),
                }
            })
            .collect()
    }
}

/// Single-bit depth from azimuth: fins in the near half-turn `[0, π]` are
/// drawn over the tube, the rest under it. `π` itself counts as forward.
/// This is not a z-sort and is not meant to become one.
pub fn is_forward(azimuth_rad: f64) -> bool {
    azimuth_rad.rem_euclid(TAU) <= PI
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use super::*;
    use crate::geometry::{ShapeModel, shape::tests::simple_rocket};

    #[test]
    fn test_forward_boundaries() {
        assert!(is_forward(0.0));
        assert!(is_forward(PI));
        assert!(!is_forward(PI + 1e-6));
        assert!(!is_forward(1.5 * PI));
        assert!(is_forward(TAU));
        assert!(is_forward(-1.5 * PI));
        assert!(!is_forward(-FRAC_PI_2));
    }

    #[test]
    fn test_forward_periodic() {
        for theta in [0.1, 1.0, 2.5, 3.0, 3.3, 4.0, 5.5, 6.2] {
            for k in -3..=3 {
                assert_eq!(
                    is_forward(theta),
                    is_forward(theta + TAU * k as f64),
                    "theta={theta}, k={k}"
                );
            }
        }
    }

    #[test]
    fn test_four_fins_at_rest() {
        let shape = ShapeModel::new(&simple_rocket()).unwrap();
        let fins = &shape.bodies()[0].fins()[0];
        let instances = fins.project(&FrameTransform::identity(), 0.0);

        assert_eq!(instances.len(), 4);

        // i=0 faces the viewer and keeps its full outline
        assert!(instances[0].forward);
        assert_eq!(instances[0].polygon, fins.outline().to_vec());

        // i=1 and i=3 are edge-on
        for i in [1, 3] {
            for p in &instances[i].polygon {
                assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-12);
            }
        }
        assert!(!instances[3].forward);

        // i=2 sits exactly on the boundary and is mirrored
        assert_relative_eq!(instances[2].azimuth_rad, PI);
        assert!(instances[2].forward);
        for (p, q) in instances[2].polygon.iter().zip(fins.outline()) {
            assert_relative_eq!(p.x, -q.x, epsilon = 1e-12);
            assert_relative_eq!(p.y, q.y);
        }
    }

    #[test]
    fn test_roll_moves_fins_between_layers() {
        let shape = ShapeModel::new(&simple_rocket()).unwrap();
        let fins = &shape.bodies()[0].fins()[0];

        let instances = fins.project(&FrameTransform::identity(), 0.25 * PI);
        let forward: Vec<bool> = instances.iter().map(|f| f.forward).collect();
        assert_eq!(forward, vec![true, true, false, false]);
    }

    #[test]
    fn test_longitudinal_axis_untouched() {
        let shape = ShapeModel::new(&simple_rocket()).unwrap();
        let fins = &shape.bodies()[0].fins()[0];

        for roll in [0.3, 1.2, 2.9, 4.4] {
            for instance in fins.project(&FrameTransform::identity(), roll) {
                for (p, q) in instance.polygon.iter().zip(fins.outline()) {
                    assert_relative_eq!(p.y, q.y);
                }
            }
        }
    }

    #[test]
    fn test_empty_outline() {
        let mut spec = simple_rocket();
        spec.bodies[0].fins[0].outline_m.clear();
        let shape = ShapeModel::new(&spec).unwrap();

        let instances = shape.bodies()[0].fins()[0].project(&FrameTransform::identity(), 1.0);
        assert_eq!(instances.len(), 4);
        assert!(instances.iter().all(|f| f.polygon.is_empty()));
    }

    #[test]
    fn test_nose_and_body_ignore_roll() {
        let shape = ShapeModel::new(&simple_rocket()).unwrap();
        let t = FrameTransform::new(0.26, 480.0, Point2::new(256.0, 360.0));

        assert_eq!(
            shape.nose().project(&t, 0.0),
            shape.nose().project(&t, 2.0)
        );
        assert_eq!(
            shape.bodies()[0].project(&t, 0.0),
            shape.bodies()[0].project(&t, 2.0)
        );
        assert_eq!(shape.nose().project(&t, 0.0).len(), 21);
        assert_eq!(shape.bodies()[0].project(&t, 0.0).len(), 4);
    }
}
