//! Body area estimate
//!
//! Widths are measured in tenths of the frame width and the torso height in
//! tenths of the frame height, so the result does not depend on resolution.

use posc_core::{FrameShape, Point};

/// Euclidean distance between two points
pub fn distance(a: Point, b: Point) -> f32 {
    let (dx, dy) = a.to(&b);
    (dx * dx + dy * dy).sqrt()
}

/// Coarse body silhouette area:
/// `0.5 * (shoulder_width + hip_width) * torso_height`, each term in
/// tenths of the matching frame dimension, truncated to an integer.
///
/// Torso height is the vertical distance between the right shoulder and
/// the right hip.
pub fn body_area(
    shoulder_left: Point,
    shoulder_right: Point,
    hip_left: Point,
    hip_right: Point,
    shape: FrameShape,
) -> u32 {
    let unit_x = 0.1 * shape.width() as f64;
    let unit_y = 0.1 * shape.height() as f64;

    let shoulders = (shoulder_left.x as f64 - shoulder_right.x as f64).abs() / unit_x;
    let hips = (hip_left.x as f64 - hip_right.x as f64).abs() / unit_x;
    let torso = (shoulder_right.y as f64 - hip_right.y as f64).abs() / unit_y;

    let area = 0.5 * (shoulders + hips) * torso;
    if area.is_finite() {
        // `as` saturates: negative is impossible, overflow clamps to u32::MAX
        area as u32
    } else {
        0
    }
}
