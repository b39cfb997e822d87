//! Engine configuration.
//!
//! Provides [`EngineConfig`] with defaults matching the production payroll
//! deployment (10% default levy, duplicate streams rejected). Values can be
//! layered from an optional TOML/JSON file and `PAYSTREAM_*` environment
//! variables via [`EngineConfig::load`].

use std::path::Path;

use paystream_core::constants::{DEFAULT_EVENT_CAPACITY, DEFAULT_LEVY_BPS, MAX_LEVY_BPS};
use paystream_core::types::FullTermRule;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix for environment overrides, e.g. `PAYSTREAM_MAX_LEVY_BPS=2500`.
pub const ENV_PREFIX: &str = "PAYSTREAM";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config source: {0}")] Source(#[from] config::ConfigError),
    #[error("max_levy_bps {0} exceeds 10000")] MaxLevyTooHigh(u16),
    #[error("default_levy_bps {default} exceeds max_levy_bps {max}")] DefaultLevyAboveMax { default: u16, max: u16 },
    #[error("event_capacity must be positive")] ZeroEventCapacity,
}

/// Whether a payee whose stream was canceled may be given a new one.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecreatePolicy {
    /// Any existing record blocks creation, canceled or not.
    #[default]
    Reject,
    /// A canceled, fully settled record is archived and replaced.
    AfterCancel,
}

/// Configuration for a [`PayrollEngine`](crate::engine::PayrollEngine).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on a stream's levy, in basis points.
    pub max_levy_bps: u16,
    /// Levy applied when the administrator does not name one.
    pub default_levy_bps: u16,
    /// Re-creation rule for payees with a canceled stream.
    pub recreate_policy: RecreatePolicy,
    /// Remainder flush rule stamped onto every new stream.
    pub full_term_rule: FullTermRule,
    /// Capacity of the broadcast event channel.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_levy_bps: MAX_LEVY_BPS,
            default_levy_bps: DEFAULT_LEVY_BPS,
            recreate_policy: RecreatePolicy::Reject,
            full_term_rule: FullTermRule::Always,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Load from an optional file, then `PAYSTREAM_*` environment variables,
    /// over the defaults. The result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let cfg: EngineConfig = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_levy_bps > MAX_LEVY_BPS {
            return Err(ConfigError::MaxLevyTooHigh(self.max_levy_bps));
        }
        if self.default_levy_bps > self.max_levy_bps {
            return Err(ConfigError::DefaultLevyAboveMax {
                default: self.default_levy_bps,
                max: self.max_levy_bps,
            });
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::ZeroEventCapacity);
        }
        Ok(())
    }
}
