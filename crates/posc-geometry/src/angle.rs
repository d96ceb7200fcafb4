//! Joint angle calculation using dot product
//!
//! cos(θ) = (v1 · v2) / (|v1| × |v2|), with v1 = p1 - p2 and v2 = p3 - p2.

use posc_core::Point;

/// Returned when either ray has zero length
pub const DEGENERATE_ANGLE: f32 = 0.0;

/// Angle at `vertex` between the rays to `first` and `last`, in degrees.
///
/// Always in `[0, 180]`. Coincident points (or non-finite input) give
/// [`DEGENERATE_ANGLE`] instead of NaN.
pub fn angle(first: Point, vertex: Point, last: Point) -> f32 {
    let (ax, ay) = vertex.to(&first);
    let (bx, by) = vertex.to(&last);
    let (ax, ay, bx, by) = (ax as f64, ay as f64, bx as f64, by as f64);

    let mag1 = (ax * ax + ay * ay).sqrt();
    let mag2 = (bx * bx + by * by).sqrt();
    if !(mag1 > 0.0 && mag2 > 0.0 && mag1.is_finite() && mag2.is_finite()) {
        return DEGENERATE_ANGLE;
    }

    // Rounding can push the ratio slightly past ±1
    let cos = ((ax * bx + ay * by) / (mag1 * mag2)).clamp(-1.0, 1.0);
    let degrees = cos.acos().to_degrees() as f32;

    if degrees.is_finite() {
        degrees.clamp(0.0, 180.0)
    } else {
        DEGENERATE_ANGLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_straight_angle() {
        let a = angle(p(0.0, 0.0), p(0.5, 0.0), p(1.0, 0.0));
        assert!((a - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_right_angle() {
        let a = angle(p(0.0, 0.0), p(0.5, 0.0), p(0.5, 0.5));
        assert!((a - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_folded_angle() {
        // Both rays point the same way
        let a = angle(p(2.0, 2.0), p(1.0, 1.0), p(3.0, 3.0));
        assert!(a.abs() < 1e-3);
    }

    #[test]
    fn test_coincident_points_give_sentinel() {
        assert_eq!(angle(p(1.0, 1.0), p(1.0, 1.0), p(5.0, 2.0)), DEGENERATE_ANGLE);
        assert_eq!(angle(p(5.0, 2.0), p(1.0, 1.0), p(1.0, 1.0)), DEGENERATE_ANGLE);
        assert_eq!(angle(p(1.0, 1.0), p(1.0, 1.0), p(1.0, 1.0)), DEGENERATE_ANGLE);
    }

    #[test]
    fn test_non_finite_input() {
        assert_eq!(angle(p(f32::NAN, 1.0), p(0.0, 0.0), p(1.0, 0.0)), DEGENERATE_ANGLE);
        assert_eq!(angle(p(f32::INFINITY, 1.0), p(0.0, 0.0), p(1.0, 0.0)), DEGENERATE_ANGLE);
    }

    proptest! {
        #[test]
        fn prop_collinear_is_straight(
            x1 in -100.0f32..100.0,
            y1 in -100.0f32..100.0,
            dx in -100.0f32..100.0,
            dy in -100.0f32..100.0,
            t in 0.05f32..0.95,
        ) {
            prop_assume!(dx.abs() > 5.0 || dy.abs() > 5.0);
            let first = p(x1, y1);
            let last = p(x1 + dx, y1 + dy);
            let vertex = p(x1 + dx * t, y1 + dy * t);
            let a = angle(first, vertex, last);
            prop_assert!((a - 180.0).abs() < 0.1, "angle {}", a);
        }

        #[test]
        fn prop_coincident_never_nan(x in -1e4f32..1e4, y in -1e4f32..1e4, ox in -1e4f32..1e4, oy in -1e4f32..1e4) {
            let a = angle(p(x, y), p(x, y), p(ox, oy));
            prop_assert_eq!(a, DEGENERATE_ANGLE);
            let b = angle(p(ox, oy), p(x, y), p(x, y));
            prop_assert_eq!(b, DEGENERATE_ANGLE);
        }

        #[test]
        fn prop_angle_in_range(
            coords in proptest::array::uniform6(-1e4f32..1e4),
        ) {
            let a = angle(p(coords[0], coords[1]), p(coords[2], coords[3]), p(coords[4], coords[5]));
            prop_assert!(a.is_finite());
            prop_assert!((0.0..=180.0).contains(&a));
        }
    }
}
