//! OSC conversion for packets
//!
//! Bytes on the wire are plain OSC 1.0; `rosc` does the encoding.

use posc_core::{PoscError, PoscResult};
use rosc::{OscBundle, OscMessage, OscPacket, OscTime, OscType};

use crate::{Arg, Bundle, Message, Packet, TimeTag};

/// Largest payload a single UDP datagram can carry
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

fn to_osc_message(message: &Message) -> OscMessage {
    OscMessage {
        addr: message.address.clone(),
        args: message
            .args
            .iter()
            .map(|arg| match *arg {
                Arg::Float(v) => OscType::Float(v),
                Arg::Int(v) => OscType::Int(v),
            })
            .collect(),
    }
}

/// Convert a packet into its `rosc` representation
pub fn to_osc(packet: &Packet) -> OscPacket {
    match packet {
        Packet::Message(m) => OscPacket::Message(to_osc_message(m)),
        Packet::Bundle(b) => OscPacket::Bundle(OscBundle {
            timetag: OscTime {
                seconds: b.timetag.seconds,
                fractional: b.timetag.fraction,
            },
            content: b
                .messages
                .iter()
                .map(|m| OscPacket::Message(to_osc_message(m)))
                .collect(),
        }),
    }
}

/// Encode a packet into one datagram
pub fn encode(packet: &Packet) -> PoscResult<Vec<u8>> {
    let bytes = rosc::encoder::encode(&to_osc(packet))
        .map_err(|e| PoscError::Encode(e.to_string()))?;

    if bytes.len() > MAX_DATAGRAM_SIZE {
        return Err(PoscError::Encode(format!(
            "Packet too large: {} > {}",
            bytes.len(),
            MAX_DATAGRAM_SIZE
        )));
    }
    Ok(bytes)
}

fn from_osc_message(message: OscMessage) -> PoscResult<Message> {
    let args = message
        .args
        .into_iter()
        .map(|arg| match arg {
            OscType::Float(v) => Ok(Arg::Float(v)),
            OscType::Int(v) => Ok(Arg::Int(v)),
            other => Err(PoscError::Decode(format!(
                "Unsupported argument type: {:?}",
                other
            ))),
        })
        .collect::<PoscResult<Vec<_>>>()?;

    Ok(Message::new(message.addr, args))
}

/// Decode one datagram. Nested bundles are flattened.
pub fn decode(bytes: &[u8]) -> PoscResult<Packet> {
    let (_, packet) =
        rosc::decoder::decode_udp(bytes).map_err(|e| PoscError::Decode(e.to_string()))?;

    match packet {
        OscPacket::Message(m) => Ok(Packet::Message(from_osc_message(m)?)),
        OscPacket::Bundle(b) => {
            let timetag = TimeTag {
                seconds: b.timetag.seconds,
                fraction: b.timetag.fractional,
            };
            let mut messages = Vec::new();
            flatten_bundle(b.content, &mut messages)?;
            Ok(Packet::Bundle(Bundle::new(timetag, messages)))
        }
    }
}

fn flatten_bundle(content: Vec<OscPacket>, out: &mut Vec<Message>) -> PoscResult<()> {
    for packet in content {
        match packet {
            OscPacket::Message(m) => out.push(from_osc_message(m)?),
            OscPacket::Bundle(inner) => flatten_bundle(inner.content, out)?,
        }
    }
    Ok(())
}
