//! Conversion between the simulation frame and the view frame.
//!
//! The flight simulation describes geometry as `(axial, radial)` with the
//! axial origin at the nose tip. The renderer works in `(radial,
//! longitudinal)` with the longitudinal origin at the rocket's midpoint, so
//! the silhouette is symmetric about the screen anchor.

use nalgebra::{Point2, Vector2};

/// Swaps a simulation-frame `(axial, radial)` vector into view-frame
/// `(radial, longitudinal)` order. Does not recenter.
pub fn sim_to_view(v: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(v.y, v.x)
}

/// Moves a longitudinal coordinate measured from the nose tip to one
/// measured from the rocket's midpoint.
pub fn centered_axial(axial_m: f64, total_length_m: f64) -> f64 {
    axial_m - total_length_m / 2.0
}

/// Full conversion of an absolute simulation-frame point.
pub fn sim_point_to_view(p: &Point2<f64>, total_length_m: f64) -> Point2<f64> {
    let v = sim_to_view(&p.coords);
    Point2::new(v.x, centered_axial(v.y, total_length_m))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_swap_only() {
        assert_relative_eq!(
            sim_to_view(&Vector2::new(0.3, 0.02)),
            Vector2::new(0.02, 0.3)
        );
    }

    #[test]
    fn test_point_recentered() {
        let p = sim_point_to_view(&Point2::new(0.9, 0.05), 1.0);
        assert_relative_eq!(p, Point2::new(0.05, 0.4));

        let tip = sim_point_to_view(&Point2::origin(), 2.0);
        assert_relative_eq!(tip, Point2::new(0.0, -1.0));
    }
}
