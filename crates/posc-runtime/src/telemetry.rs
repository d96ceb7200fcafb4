//! Logging setup for hosts

use std::str::FromStr;

use posc_core::{PoscError, PoscResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = PoscError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(PoscError::InvalidConfig(format!("unknown log format: {}", other))),
        }
    }
}

/// Install the global subscriber.
///
/// Filtering comes from `RUST_LOG`, falling back to `info`. Fails if a
/// subscriber is already installed.
pub fn init_tracing(format: LogFormat) -> PoscResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| PoscError::InvalidConfig(format!("tracing: {}", e)))
}
