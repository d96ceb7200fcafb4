//! POSC Wire - Outbound message model
//!
//! Messages are an address plus one or more numeric arguments. A frame is
//! delivered either as independent messages or as one bundle sharing a
//! timetag. Byte encoding is delegated to `rosc`.

pub mod codec;
pub mod message;

pub use codec::*;
pub use message::*;
