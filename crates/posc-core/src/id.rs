//! Channel identifiers

use std::fmt;

/// Position of a parameter channel in the outbound vector.
///
/// Fixed-body pipelines use ids `0..11`; hand pipelines use
/// `landmark + 21 * hand`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct ChannelId(pub usize);

impl ChannelId {
    pub fn new(index: usize) -> Self {
        ChannelId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }

    /// Positional OSC address (`/0`, `/1`, ...)
    pub fn address(self) -> String {
        format!("/{}", self.0)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

impl From<usize> for ChannelId {
    fn from(index: usize) -> Self {
        ChannelId(index)
    }
}
