//! Recognizer configuration.
//!
//! Immutable per engine instance -- set once at construction. Serialized
//! to/from TOML by the CLI's `config` command.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Pull-to-refresh recognizer configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PullConfig {
    /// Pull distance at which releasing the gesture triggers a refresh.
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    /// Damping divisor applied to raw drag delta ("rubber band" feel).
    /// Must be greater than 1.
    #[serde(default = "default_resistance")]
    pub resistance: f32,
    /// Minimum time the "refreshing" state is shown, in milliseconds.
    #[serde(default = "default_refreshing_timeout_ms")]
    pub refreshing_timeout_ms: u64,
    /// Whether the recognizer is armed at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_threshold() -> f32 {
    80.0
}

fn default_resistance() -> f32 {
    2.5
}

fn default_refreshing_timeout_ms() -> u64 {
    2000
}

fn default_true() -> bool {
    true
}

impl Default for PullConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            resistance: default_resistance(),
            refreshing_timeout_ms: default_refreshing_timeout_ms(),
            enabled: default_true(),
        }
    }
}

impl PullConfig {
    /// Hard cap on the pull distance, as a multiple of the threshold.
    pub const MAX_PULL_FACTOR: f32 = 1.5;

    /// Raw drag delta below which the default scroll behavior is not
    /// suppressed, so taps and tiny wiggles still scroll the page.
    pub const SCROLL_DEAD_ZONE: f32 = 10.0;

    /// Maximum pull distance (`threshold * 1.5`).
    pub fn max_pull(&self) -> f32 {
        self.threshold * Self::MAX_PULL_FACTOR
    }

    /// Check the configuration for values the engine cannot operate on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "threshold".into(),
                message: format!("must be a finite value > 0, got {}", self.threshold),
            });
        }
        if !self.resistance.is_finite() || self.resistance <= 1.0 {
            return Err(ConfigError::InvalidValue {
                key: "resistance".into(),
                message: format!("must be a finite value > 1, got {}", self.resistance),
            });
        }
        Ok(())
    }
}
