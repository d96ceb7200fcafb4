//! POSC Runtime - The per-frame pipeline
//!
//! Each call to `Pipeline::process_frame` runs the stages in order:
//! 1. Sample: gate landmarks per body part / hand
//! 2. Measure: angles and body area from valid keypoints
//! 3. Smooth: per-channel EMA on valid observations only
//! 4. Map: assemble the outbound parameter set
//! 5. Emit: throttle and dispatch to the message sink
//!
//! Everything is synchronous and single-threaded. Hosts that capture on
//! another thread hand frames over through a `ChannelSource`.

pub mod config;
pub mod emitter;
pub mod mapper;
pub mod pipeline;
pub mod sampler;
pub mod source;
pub mod stats;
pub mod telemetry;

pub use config::*;
pub use emitter::*;
pub use mapper::*;
pub use pipeline::*;
pub use sampler::*;
pub use source::*;
pub use stats::*;
pub use telemetry::*;
