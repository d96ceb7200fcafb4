//! Smoother - per-channel EMA table

use posc_core::{ChannelId, PoscError, PoscResult};

/// Default smoothing factor
pub const DEFAULT_ALPHA: f32 = 0.5;

/// Check that `0 < alpha <= 1`
pub fn validate_alpha(alpha: f32) -> PoscResult<f32> {
    if alpha.is_finite() && alpha > 0.0 && alpha <= 1.0 {
        Ok(alpha)
    } else {
        Err(PoscError::InvalidAlpha(alpha))
    }
}

/// Smoother state: last smoothed value per channel.
///
/// A channel with no value yet is seeded with its first raw observation,
/// so the first output equals the input exactly. Channels are only touched
/// by `update`; a channel without a valid observation this frame keeps
/// its previous value.
#[derive(Debug, Clone)]
pub struct Smoother {
    alpha: f32,
    /// Smoothed values indexed by channel id (None = not yet seeded)
    values: Vec<Option<f32>>,
}

impl Smoother {
    /// Create an empty smoother
    pub fn new(alpha: f32) -> PoscResult<Self> {
        Ok(Smoother {
            alpha: validate_alpha(alpha)?,
            values: Vec::new(),
        })
    }

    /// Create a smoother with a fixed channel set
    pub fn with_channels(alpha: f32, count: usize) -> PoscResult<Self> {
        let mut smoother = Self::new(alpha)?;
        smoother.values = vec![None; count];
        Ok(smoother)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Number of channels in the table
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Feed one raw observation and return the new smoothed value.
    ///
    /// Non-finite raw values are not observations: the previous value
    /// is kept and returned (0.0 if the channel was never seeded).
    pub fn update(&mut self, channel: ChannelId, raw: f32) -> f32 {
        let idx = channel.index();
        if idx >= self.values.len() {
            self.values.resize(idx + 1, None);
        }

        if !raw.is_finite() {
            return self.values[idx].unwrap_or(0.0);
        }

        let smoothed = match self.values[idx] {
            Some(prev) => self.alpha * raw + (1.0 - self.alpha) * prev,
            None => raw,
        };
        self.values[idx] = Some(smoothed);
        smoothed
    }

    /// Current smoothed value, if the channel has been seeded
    pub fn get(&self, channel: ChannelId) -> Option<f32> {
        self.values.get(channel.index()).copied().flatten()
    }

    /// Current smoothed value, zero for unseeded channels
    pub fn value_or_zero(&self, channel: ChannelId) -> f32 {
        self.get(channel).unwrap_or(0.0)
    }

    /// Apply one frame of optional raw values (index = channel id).
    /// Returns the smoothed vector; `None` entries hold their previous value.
    pub fn apply(&mut self, raw: &[Option<f32>]) -> Vec<f32> {
        raw.iter()
            .enumerate()
            .map(|(i, value)| {
                let channel = ChannelId(i);
                match value {
                    Some(v) => self.update(channel, *v),
                    None => self.value_or_zero(channel),
                }
            })
            .collect()
    }

    /// Match the table to a channel count that may change between frames.
    ///
    /// When the count differs, every channel is dropped so the next
    /// observations re-seed from their raw values; old values belonged to
    /// a differently indexed channel set. Returns true if a reseed happened.
    pub fn reconcile(&mut self, len: usize) -> bool {
        if self.values.len() == len {
            return false;
        }
        tracing::debug!(from = self.values.len(), to = len, "channel count changed, reseeding");
        self.values = vec![None; len];
        true
    }

    /// Forget all smoothed values, keeping the channel count
    pub fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = None);
    }
}
