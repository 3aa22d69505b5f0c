//! Geometric utilities over 2D keypoint positions.
//!
//! All points are in image pixel space: `x` grows to the right and `y` grows
//! downwards, so "higher" in the body means a smaller `y`.

use nalgebra::{Point2, Vector2};

/// Angle at vertex `b` between the rays `b→a` and `b→c`, in degrees [0, 180].
///
/// Returns `None` when either ray has zero length, since no angle exists there.
pub fn angle_at_vertex(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> Option<f64> {
    let ba: Vector2<f64> = a - b;
    let bc: Vector2<f64> = c - b;
    angle_between(&ba, &bc).map(f64::to_degrees)
}

/// Angle between two vectors in radians, `None` for degenerate inputs
pub fn angle_between(v1: &Vector2<f64>, v2: &Vector2<f64>) -> Option<f64> {
    let norms = v1.norm() * v2.norm();
    if norms < 1e-10 {
        return None;
    }
    Some((v1.dot(v2) / norms).clamp(-1.0, 1.0).acos())
}

/// Perpendicular distance from `point` to the infinite line through
/// `line_start` and `line_end`.
///
/// Uses `|Ax + By + C| / sqrt(A² + B²)`. A zero-length line degrades to the
/// distance between `point` and `line_start`.
pub fn point_to_line_deviation(
    point: &Point2<f64>,
    line_start: &Point2<f64>,
    line_end: &Point2<f64>,
) -> f64 {
    let a = line_end.y - line_start.y;
    let b = line_start.x - line_end.x;
    let c = line_end.x * line_start.y - line_start.x * line_end.y;

    let denom = (a * a + b * b).sqrt();
    if denom < 1e-10 {
        return nalgebra::distance(point, line_start);
    }

    (a * point.x + b * point.y + c).abs() / denom
}

/// Mean deviation of the interior points from the `line_start`–`line_end`
/// line. Used to score how straight a body segment chain is.
pub fn alignment_deviation(
    line_start: &Point2<f64>,
    interior: &[Point2<f64>],
    line_end: &Point2<f64>,
) -> f64 {
    if interior.is_empty() {
        return 0.0;
    }
    let total: f64 = interior
        .iter()
        .map(|p| point_to_line_deviation(p, line_start, line_end))
        .sum();
    total / interior.len() as f64
}

/// Absolute lean of the `hip→head` segment away from vertical, in degrees.
///
/// Zero means perfectly upright; 90 means horizontal.
pub fn body_lean_angle(head: &Point2<f64>, hip: &Point2<f64>) -> f64 {
    (head.x - hip.x).atan2(hip.y - head.y).to_degrees().abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_angle() {
        let angle = angle_at_vertex(
            &Point2::new(0.0, 1.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
        )
        .unwrap();
        assert!((angle - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_collinear_vertex_is_straight() {
        let angle = angle_at_vertex(
            &Point2::new(0.0, 0.0),
            &Point2::new(5.0, 5.0),
            &Point2::new(12.0, 12.0),
        )
        .unwrap();
        assert!((angle - 180.0).abs() < 1e-6);
    }

    #[test]
    fn test_folded_vertex_is_zero() {
        let angle = angle_at_vertex(
            &Point2::new(10.0, 0.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(20.0, 0.0),
        )
        .unwrap();
        assert!(angle.abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_angle_is_unavailable() {
        let p = Point2::new(3.0, 4.0);
        assert!(angle_at_vertex(&p, &p, &Point2::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_point_to_line_deviation() {
        let d = point_to_line_deviation(
            &Point2::new(5.0, 3.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(10.0, 0.0),
        );
        assert!((d - 3.0).abs() < 1e-10);

        // Vertical line, point on the left
        let d = point_to_line_deviation(
            &Point2::new(-4.0, 7.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(0.0, 10.0),
        );
        assert!((d - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_length_line() {
        let d = point_to_line_deviation(
            &Point2::new(3.0, 4.0),
            &Point2::new(0.0, 0.0),
            &Point2::new(0.0, 0.0),
        );
        assert!((d - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_alignment_deviation_mean() {
        let d = alignment_deviation(
            &Point2::new(0.0, 0.0),
            &[Point2::new(2.0, 2.0), Point2::new(4.0, -4.0)],
            &Point2::new(10.0, 0.0),
        );
        assert!((d - 3.0).abs() < 1e-10);
        assert_eq!(alignment_deviation(&Point2::origin(), &[], &Point2::new(1.0, 0.0)), 0.0);
    }

    #[test]
    fn test_body_lean_angle() {
        let hip = Point2::new(100.0, 200.0);
        assert!(body_lean_angle(&Point2::new(100.0, 100.0), &hip).abs() < 1e-10);
        assert!((body_lean_angle(&Point2::new(200.0, 100.0), &hip) - 45.0).abs() < 1e-10);
        // Leaning backwards reports the same magnitude
        assert!((body_lean_angle(&Point2::new(0.0, 100.0), &hip) - 45.0).abs() < 1e-10);
    }
}
