//! Messages, bundles and packets

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970)
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

/// Numeric argument type used on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueFormat {
    /// 32-bit float arguments
    #[default]
    Float,
    /// 32-bit integer arguments, truncated toward zero
    Int,
}

/// One message argument
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg {
    Float(f32),
    Int(i32),
}

impl Arg {
    /// Convert a channel value into an argument of the given format
    pub fn from_value(value: f32, format: ValueFormat) -> Arg {
        match format {
            ValueFormat::Float => Arg::Float(value),
            // `as` truncates toward zero and saturates, NaN becomes 0
            ValueFormat::Int => Arg::Int(value as i32),
        }
    }

    pub fn as_f32(&self) -> f32 {
        match *self {
            Arg::Float(v) => v,
            Arg::Int(v) => v as f32,
        }
    }
}

/// Addressed message
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub address: String,
    pub args: Vec<Arg>,
}

impl Message {
    pub fn new(address: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            address: address.into(),
            args,
        }
    }

    /// Message carrying `values` in the given format
    pub fn with_values(address: impl Into<String>, values: &[f32], format: ValueFormat) -> Self {
        Self::new(
            address,
            values.iter().map(|&v| Arg::from_value(v, format)).collect(),
        )
    }

    /// Argument values as floats
    pub fn values(&self) -> Vec<f32> {
        self.args.iter().map(Arg::as_f32).collect()
    }
}

/// NTP-style timestamp carried by a bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeTag {
    pub seconds: u32,
    pub fraction: u32,
}

impl TimeTag {
    /// The OSC "immediately" timetag
    pub const IMMEDIATE: TimeTag = TimeTag {
        seconds: 0,
        fraction: 1,
    };

    pub fn from_system_time(time: SystemTime) -> TimeTag {
        let since_unix = time.duration_since(UNIX_EPOCH).unwrap_or_default();
        // NTP seconds wrap in 2036 (era rollover)
        let seconds = (since_unix.as_secs() + NTP_UNIX_OFFSET) as u32;
        let fraction = ((since_unix.subsec_nanos() as u64) << 32) / 1_000_000_000;
        TimeTag {
            seconds,
            fraction: fraction as u32,
        }
    }

    pub fn now() -> TimeTag {
        Self::from_system_time(SystemTime::now())
    }
}

/// Group of messages delivered atomically with one timetag
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    pub timetag: TimeTag,
    pub messages: Vec<Message>,
}

impl Bundle {
    pub fn new(timetag: TimeTag, messages: Vec<Message>) -> Self {
        Self { timetag, messages }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Unit of delivery to a message sink
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Message(Message),
    Bundle(Bundle),
}

impl Packet {
    /// Number of addressed messages carried
    pub fn message_count(&self) -> usize {
        match self {
            Packet::Message(_) => 1,
            Packet::Bundle(b) => b.len(),
        }
    }

    /// All messages carried, in order
    pub fn messages(&self) -> Vec<&Message> {
        match self {
            Packet::Message(m) => vec![m],
            Packet::Bundle(b) => b.messages.iter().collect(),
        }
    }
}

impl From<Message> for Packet {
    fn from(message: Message) -> Self {
        Packet::Message(message)
    }
}

impl From<Bundle> for Packet {
    fn from(bundle: Bundle) -> Self {
        Packet::Bundle(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_int_format_truncates() {
        assert_eq!(Arg::from_value(12.9, ValueFormat::Int), Arg::Int(12));
        assert_eq!(Arg::from_value(-3.7, ValueFormat::Int), Arg::Int(-3));
        assert_eq!(Arg::from_value(f32::NAN, ValueFormat::Int), Arg::Int(0));
        assert_eq!(Arg::from_value(12.9, ValueFormat::Float), Arg::Float(12.9));
    }

    #[test]
    fn test_message_values() {
        let msg = Message::with_values("/left_arm", &[90.5, 170.0], ValueFormat::Int);
        assert_eq!(msg.address, "/left_arm");
        assert_eq!(msg.values(), vec![90.0, 170.0]);
    }

    #[test]
    fn test_timetag_from_unix_epoch() {
        let tag = TimeTag::from_system_time(UNIX_EPOCH + Duration::from_millis(500));
        assert_eq!(tag.seconds, NTP_UNIX_OFFSET as u32);
        assert_eq!(tag.fraction, 1 << 31);
    }

    #[test]
    fn test_packet_message_count() {
        let m = Message::new("/0", vec![Arg::Float(1.0)]);
        assert_eq!(Packet::from(m.clone()).message_count(), 1);

        let b = Bundle::new(TimeTag::IMMEDIATE, vec![m.clone(), m]);
        let packet = Packet::from(b);
        assert_eq!(packet.message_count(), 2);
        assert_eq!(packet.messages().len(), 2);
    }

    #[test]
    fn test_value_format_serde() {
        let f: ValueFormat = serde_json::from_str("\"int\"").unwrap();
        assert_eq!(f, ValueFormat::Int);
        assert!(serde_json::from_str::<ValueFormat>("\"double\"").is_err());
    }
}
