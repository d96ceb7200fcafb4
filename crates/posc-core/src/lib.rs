//! POSC Core - Fundamental types shared by the pose-to-OSC pipeline
//!
//! This crate defines:
//! - Keypoints and frame geometry (Keypoint, Point, FrameShape)
//! - Per-frame detector output (LandmarkFrame)
//! - The landmark schemas (33-point body, 21-point hand) and the
//!   named body parts and channels derived from them
//! - Channel identifiers
//! - Error types

pub mod error;
pub mod frame;
pub mod id;
pub mod keypoint;
pub mod schema;

pub use error::*;
pub use frame::*;
pub use id::*;
pub use keypoint::*;
pub use schema::*;
