//! Emitter - throttled dispatch to the message sink

use posc_core::{PoscError, PoscResult};
use posc_transport::MessageSink;
use posc_wire::{Bundle, Message, Packet, TimeTag, ValueFormat};

use crate::{DeliveryMode, ParameterSet};

/// Result of one dispatch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dispatch {
    /// Messages handed to the sink
    pub attempted: usize,
    /// Messages the sink accepted
    pub delivered: usize,
    /// Messages lost to sink errors
    pub failed: usize,
}

/// What the emitter did with a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// Not a dispatch frame
    Throttled,
    /// Dispatch frame, but nothing to send
    Empty,
    Dispatched(Dispatch),
}

impl EmitOutcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, EmitOutcome::Dispatched(_))
    }

    pub fn dispatch(&self) -> Option<Dispatch> {
        match *self {
            EmitOutcome::Dispatched(d) => Some(d),
            _ => None,
        }
    }
}

/// Rate-limited sender. The frame counter is its only state.
#[derive(Debug, Clone)]
pub struct Emitter {
    throttle_interval: u64,
    delivery: DeliveryMode,
    format: ValueFormat,
    frame_counter: u64,
}

impl Emitter {
    pub fn new(throttle_interval: u32, delivery: DeliveryMode, format: ValueFormat) -> PoscResult<Self> {
        if throttle_interval == 0 {
            return Err(PoscError::ZeroThrottleInterval);
        }
        Ok(Emitter {
            throttle_interval: throttle_interval as u64,
            delivery,
            format,
            frame_counter: 0,
        })
    }

    /// Frames seen so far
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    /// Whether the frame with this 0-based index is a dispatch frame
    pub fn is_dispatch_frame(&self, frame: u64) -> bool {
        frame % self.throttle_interval == 0
    }

    /// Advance the counter and, on dispatch frames, send the set.
    ///
    /// Sink errors never propagate: they are logged and counted in the
    /// returned `Dispatch`.
    pub fn emit<S: MessageSink + ?Sized>(&mut self, set: &ParameterSet, sink: &mut S) -> EmitOutcome {
        let frame = self.frame_counter;
        self.frame_counter += 1;

        if !self.is_dispatch_frame(frame) {
            return EmitOutcome::Throttled;
        }
        if set.is_empty() {
            return EmitOutcome::Empty;
        }

        let messages: Vec<Message> = set
            .parameters
            .iter()
            .map(|p| Message::with_values(p.address.as_str(), &p.values, self.format))
            .collect();

        let dispatch = match self.delivery {
            DeliveryMode::Independent => send_each(messages, sink, frame),
            DeliveryMode::Bundled => send_bundle(messages, sink, frame),
        };
        EmitOutcome::Dispatched(dispatch)
    }
}

fn send_each<S: MessageSink + ?Sized>(messages: Vec<Message>, sink: &mut S, frame: u64) -> Dispatch {
    let mut dispatch = Dispatch {
        attempted: messages.len(),
        ..Dispatch::default()
    };
    for message in messages {
        let address = message.address.clone();
        match sink.send(&Packet::Message(message)) {
            Ok(()) => dispatch.delivered += 1,
            Err(e) => {
                dispatch.failed += 1;
                tracing::warn!(frame, %address, error = %e, "send failed");
            }
        }
    }
    dispatch
}

fn send_bundle<S: MessageSink + ?Sized>(messages: Vec<Message>, sink: &mut S, frame: u64) -> Dispatch {
    let count = messages.len();
    let bundle = Bundle::new(TimeTag::now(), messages);
    match sink.send(&Packet::Bundle(bundle)) {
        Ok(()) => Dispatch {
            attempted: count,
            delivered: count,
            failed: 0,
        },
        Err(e) => {
            tracing::warn!(frame, messages = count, error = %e, "bundle send failed");
            Dispatch {
                attempted: count,
                delivered: 0,
                failed: count,
            }
        }
    }
}
