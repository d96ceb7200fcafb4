//! POSC Smoothing - Temporal filtering of parameter channels
//!
//! One exponential moving average per channel:
//! `smoothed = alpha * raw + (1 - alpha) * previous`.
//! This is the only cross-frame numeric state in the pipeline.

pub mod smoother;

pub use smoother::*;
