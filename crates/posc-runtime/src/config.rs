//! Pipeline configuration
//!
//! Loaded from JSON (all fields optional) and validated once, before the
//! pipeline starts. Nothing here is re-checked mid-stream.

use std::path::Path;

use serde::{Deserialize, Serialize};

use posc_core::{PoscError, PoscResult};
use posc_smoothing::{validate_alpha, DEFAULT_ALPHA};
use posc_wire::ValueFormat;

/// Which landmark schema drives the channel set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaMode {
    /// 33-point body model, 11 fixed channels
    #[default]
    FixedBody,
    /// 21-point hands, one X channel per landmark per detected hand
    VariableHand,
}

/// What goes out each dispatch frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmissionMode {
    /// Every channel at its positional address, zeros when nothing is detected
    #[default]
    AlwaysFixed,
    /// Only the groups detected this frame, at their named addresses
    GatedNamed,
}

/// How one frame's messages reach the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryMode {
    /// One packet per message
    #[default]
    Independent,
    /// All messages of the frame in one timetagged bundle
    Bundled,
}

/// Destination of the UDP sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub host: String,
    pub port: u16,
}

impl Default for SinkConfig {
    fn default() -> Self {
        SinkConfig {
            host: "127.0.0.1".to_string(),
            port: 3333,
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Smoothing factor, 0 < alpha <= 1 (1 disables smoothing)
    pub alpha: f32,
    /// Dispatch on frames where counter % interval == 0
    pub throttle_interval: u32,
    pub schema: SchemaMode,
    pub emission: EmissionMode,
    pub delivery: DeliveryMode,
    pub value_format: ValueFormat,
    /// Hands considered in hand mode
    pub max_hands: usize,
    /// Optional visibility gate for keypoints that carry a score
    pub min_visibility: Option<f32>,
    /// Frames between throughput log lines, 0 disables
    pub stats_interval: u64,
    pub sink: SinkConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            alpha: DEFAULT_ALPHA,
            throttle_interval: 2,
            schema: SchemaMode::FixedBody,
            emission: EmissionMode::AlwaysFixed,
            delivery: DeliveryMode::Independent,
            value_format: ValueFormat::Float,
            max_hands: 2,
            min_visibility: None,
            stats_interval: 60,
            sink: SinkConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse from a JSON document
    pub fn from_json_str(json: &str) -> PoscResult<Self> {
        serde_json::from_str(json).map_err(|e| PoscError::InvalidConfig(e.to_string()))
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> PoscResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PoscError::InvalidConfig(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_json_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> PoscResult<()> {
        validate_alpha(self.alpha)?;

        if self.throttle_interval == 0 {
            return Err(PoscError::ZeroThrottleInterval);
        }
        if self.max_hands == 0 {
            return Err(PoscError::InvalidConfig("max_hands must be at least 1".into()));
        }
        if let Some(v) = self.min_visibility {
            if !(0.0..=1.0).contains(&v) {
                return Err(PoscError::InvalidConfig(format!(
                    "min_visibility {} outside [0, 1]",
                    v
                )));
            }
        }
        if self.sink.host.trim().is_empty() {
            return Err(PoscError::InvalidConfig("sink host is empty".into()));
        }
        Ok(())
    }
}
