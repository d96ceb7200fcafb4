//! Keypoints and frame geometry
//!
//! Keypoints are recreated every frame and carry the detector's own
//! coordinate convention: a zero (or negative) coordinate means the
//! landmark was not detected.

use serde::{Deserialize, Serialize};

use crate::{PoscError, PoscResult};

/// 2D position in pixel or normalized frame coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Vector from `self` to `other`
    pub fn to(&self, other: &Point) -> (f32, f32) {
        (other.x - self.x, other.y - self.y)
    }

    /// Uniformly scale both coordinates
    pub fn scaled(&self, factor: f32) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }
}

/// One tracked landmark, indexed by the upstream model's schema
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Landmark index (0..33 for body, 0..21 for hand)
    pub id: usize,
    pub x: f32,
    pub y: f32,
    /// Visibility / confidence score, when the detector reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f32>,
}

impl Keypoint {
    pub fn new(id: usize, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            visibility: None,
        }
    }

    pub fn with_visibility(mut self, visibility: f32) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Detector convention: both coordinates strictly positive
    pub fn is_detected(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x > 0.0 && self.y > 0.0
    }

    /// Visibility gate. Keypoints without a score always pass.
    pub fn meets_visibility(&self, min_visibility: Option<f32>) -> bool {
        match (min_visibility, self.visibility) {
            (Some(min), Some(v)) => v >= min,
            _ => true,
        }
    }
}

/// Dimensions of the current video frame in pixels.
/// INVARIANT: both dimensions are > 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameShape {
    width: u32,
    height: u32,
}

impl FrameShape {
    pub fn new(width: u32, height: u32) -> PoscResult<Self> {
        if width == 0 || height == 0 {
            return Err(PoscError::InvalidFrameShape { width, height });
        }
        Ok(FrameShape { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Scale both dimensions (used by scale-invariance checks)
    pub fn scaled(&self, factor: u32) -> PoscResult<FrameShape> {
        FrameShape::new(self.width * factor, self.height * factor)
    }
}
