//! Message sink capability

use posc_core::{PoscError, PoscResult};
use posc_wire::{Message, Packet};

/// Destination for outbound packets.
///
/// Sends are fire-and-forget and must not block the frame loop. An error
/// means this packet was not delivered; the caller carries on.
pub trait MessageSink {
    fn send(&mut self, packet: &Packet) -> PoscResult<()>;
}

impl<S: MessageSink + ?Sized> MessageSink for &mut S {
    fn send(&mut self, packet: &Packet) -> PoscResult<()> {
        (**self).send(packet)
    }
}

impl<S: MessageSink + ?Sized> MessageSink for Box<S> {
    fn send(&mut self, packet: &Packet) -> PoscResult<()> {
        (**self).send(packet)
    }
}

/// Sink that records every packet in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    packets: Vec<Packet>,
    /// Number of upcoming sends that fail
    fail_remaining: usize,
    failed: u64,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    /// Make the next `count` sends fail with a transport error
    pub fn fail_next(&mut self, count: usize) {
        self.fail_remaining = count;
    }

    /// Packets delivered so far
    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    /// All delivered messages, bundles flattened
    pub fn messages(&self) -> Vec<&Message> {
        self.packets.iter().flat_map(|p| p.messages()).collect()
    }

    /// Messages sent to `address`
    pub fn messages_to(&self, address: &str) -> Vec<&Message> {
        self.messages()
            .into_iter()
            .filter(|m| m.address == address)
            .collect()
    }

    /// Number of sends that were rejected
    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Drain recorded packets
    pub fn take(&mut self) -> Vec<Packet> {
        std::mem::take(&mut self.packets)
    }

    pub fn clear(&mut self) {
        self.packets.clear();
    }
}

impl MessageSink for MemorySink {
    fn send(&mut self, packet: &Packet) -> PoscResult<()> {
        if self.fail_remaining > 0 {
            self.fail_remaining -= 1;
            self.failed += 1;
            return Err(PoscError::Transport("simulated send failure".into()));
        }
        self.packets.push(packet.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use posc_wire::{Arg, Bundle, TimeTag};

    fn msg(address: &str) -> Message {
        Message::new(address, vec![Arg::Float(1.0)])
    }

    #[test]
    fn test_memory_sink_records() {
        let mut sink = MemorySink::new();
        sink.send(&Packet::from(msg("/0"))).unwrap();
        sink.send(&Packet::from(Bundle::new(
            TimeTag::IMMEDIATE,
            vec![msg("/1"), msg("/0")],
        )))
        .unwrap();

        assert_eq!(sink.packets().len(), 2);
        assert_eq!(sink.messages().len(), 3);
        assert_eq!(sink.messages_to("/0").len(), 2);
    }

    #[test]
    fn test_memory_sink_failures() {
        let mut sink = MemorySink::new();
        sink.fail_next(2);
        assert!(sink.send(&Packet::from(msg("/0"))).is_err());
        assert!(sink.send(&Packet::from(msg("/0"))).is_err());
        assert!(sink.send(&Packet::from(msg("/0"))).is_ok());
        assert_eq!(sink.failed(), 2);
        assert_eq!(sink.packets().len(), 1);
    }

    #[test]
    fn test_sink_through_box() {
        let mut sink: Box<dyn MessageSink> = Box::new(MemorySink::new());
        assert!(sink.send(&Packet::from(msg("/nose"))).is_ok());
    }
}
