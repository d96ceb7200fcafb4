//! Error types for the POSC pipeline

use thiserror::Error;

/// Core POSC errors
#[derive(Error, Debug)]
pub enum PoscError {
    // Configuration errors
    #[error("Invalid smoothing factor: {0} (expected 0 < alpha <= 1)")]
    InvalidAlpha(f32),

    #[error("Throttle interval must be at least 1")]
    ZeroThrottleInterval,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Frame errors
    #[error("Invalid frame shape: {width}x{height}")]
    InvalidFrameShape { width: u32, height: u32 },

    // Wire errors
    #[error("Encode failed: {0}")]
    Encode(String),

    #[error("Decode failed: {0}")]
    Decode(String),

    // Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    // Source errors
    #[error("Landmark source closed")]
    SourceClosed,

    #[error("Landmark source error: {0}")]
    Source(String),
}

/// Result type for POSC operations
pub type PoscResult<T> = Result<T, PoscError>;
