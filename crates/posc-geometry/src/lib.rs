//! POSC Geometry - Derived metrics from keypoint coordinates
//!
//! Pure functions, no state, no knowledge of detectors:
//! - Joint angles (dot product / arc-cosine)
//! - Coarse body area in frame-relative units

pub mod angle;
pub mod area;

pub use angle::*;
pub use area::*;
