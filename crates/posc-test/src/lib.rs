//! POSC Test Harness - Synthetic input and end-to-end validation
//!
//! This crate provides:
//! - Seeded synthetic body and hand landmark streams
//! - Scenario suite driving the full pipeline into a recording sink
//! - Loopback runs over a real UDP socket

pub mod figure;
pub mod loopback;
pub mod scenarios;

pub use figure::*;
pub use loopback::*;
pub use scenarios::*;
