//! View-plane to pixel mapping shared by every part of the rocket.
//!
//! Pitch tilts the silhouette through a 2D rotation. Yaw never rotates
//! points: it only shrinks the scale by `cos(yaw)`.

use nalgebra::{Matrix2, Point2, matrix};

/// Pixels per meter so that the rocket spans `drawing_size` of the window
/// height, foreshortened by yaw.
pub fn compute_scale(
    window_height_px: f64,
    total_length_m: f64,
    drawing_size: f64,
    yaw_rad: f64,
) -> f64 {
    window_height_px * drawing_size / total_length_m * yaw_rad.cos()
}

/// Counter-clockwise rotation by `pitch_rad`.
pub fn rotation_matrix(pitch_rad: f64) -> Matrix2<f64> {
    let (s, c) = pitch_rad.sin_cos();
    matrix![c, -s;
            s,  c]
}

pub fn project(
    point: &Point2<f64>,
    rotation: &Matrix2<f64>,
    scale: f64,
    center_px: &Point2<f64>,
) -> Point2<f64> {
    center_px + rotation * point.coords * scale
}

/// Rotation, scale and screen anchor computed once per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameTransform {
    pub rotation: Matrix2<f64>,
    pub scale: f64,
    pub center_px: Point2<f64>,
}

impl FrameTransform {
    pub fn new(pitch_rad: f64, scale: f64, center_px: Point2<f64>) -> Self {
        FrameTransform {
            rotation: rotation_matrix(pitch_rad),
            scale,
            center_px,
        }
    }

    pub fn identity() -> Self {
        FrameTransform::new(0.0, 1.0, Point2::origin())
    }

    pub fn project(&self, point: &Point2<f64>) -> Point2<f64> {
        project(point, &self.rotation, self.scale, &self.center_px)
    }

    pub fn project_all(&self, points: &[Point2<f64>]) -> Vec<Point2<f64>> {
        points.iter().map(|p| self.project(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_3};

    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_scale() {
        assert_relative_eq!(compute_scale(720.0, 1.2, 0.8, 0.0), 480.0);
        assert_relative_eq!(compute_scale(720.0, 1.2, 0.8, FRAC_PI_3), 240.0, epsilon = 1e-9);
        assert_relative_eq!(compute_scale(720.0, 1.2, 0.8, FRAC_PI_2), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rotation_ccw() {
        let r = rotation_matrix(FRAC_PI_2);
        let p = project(&Point2::new(1.0, 0.0), &r, 1.0, &Point2::origin());
        assert_relative_eq!(p, Point2::new(0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_empty_list() {
        let t = FrameTransform::new(0.3, 100.0, Point2::new(10.0, 20.0));
        assert!(t.project_all(&[]).is_empty());
    }

    #[test]
    fn test_identity_round_trip() {
        let outline = vec![
            Point2::new(0.05, 0.3),
            Point2::new(0.13, 0.4),
            Point2::new(0.05, 0.5),
        ];
        let projected = FrameTransform::identity().project_all(&outline);
        assert_eq!(projected, outline);
    }

    #[test]
    fn test_affine() {
        let t = FrameTransform::new(0.4, 250.0, Point2::new(640.0, 360.0));
        let a = Point2::new(0.05, -0.2);
        let b = Point2::new(-0.01, 0.35);
        let sum = Point2::from(a.coords + b.coords);

        // Center applied exactly once per projected point
        let lhs = t.project(&sum) - t.center_px;
        let rhs = (t.project(&a) - t.center_px) + (t.project(&b) - t.center_px);
        assert_relative_eq!(lhs, rhs, epsilon = 1e-9);
    }

    #[test]
    fn test_scale_doubles_offsets() {
        let center = Point2::new(320.0, 240.0);
        let p = Point2::new(0.07, -0.45);
        let single = FrameTransform::new(0.2, compute_scale(480.0, 1.0, 0.4, 0.1), center);
        let double = FrameTransform::new(0.2, compute_scale(480.0, 1.0, 0.8, 0.1), center);

        assert_relative_eq!(
            double.project(&p) - center,
            (single.project(&p) - center) * 2.0,
            epsilon = 1e-9
        );
    }
}
