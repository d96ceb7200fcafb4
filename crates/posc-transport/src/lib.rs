//! POSC Transport Layer - Where outbound packets go
//!
//! This crate provides:
//! - The `MessageSink` capability the emitter dispatches to
//! - Non-blocking UDP delivery of OSC packets
//! - An in-memory sink for tests and dry runs

pub mod sink;
pub mod udp;

pub use sink::*;
pub use udp::*;
