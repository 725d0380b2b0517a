//! Facade configuration
//!
//! Controls whether the facade forwards anything at all. Delivery itself is
//! configured by each backend, not here.

use crate::types::Stat;
use serde::{Deserialize, Serialize};

/// Configuration for the tracking facade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Usage tracking opt-out: when false nothing is forwarded
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Stats that are never forwarded
    #[serde(default)]
    pub muted: Vec<Stat>,
}

fn default_true() -> bool {
    true
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            muted: Vec::new(),
        }
    }
}

impl StatsConfig {
    /// Create a new configuration with default settings (enabled, nothing muted)
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: enable or disable tracking
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Builder method: never forward `stat`
    pub fn mute(mut self, stat: Stat) -> Self {
        if !self.muted.contains(&stat) {
            self.muted.push(stat);
        }
        self
    }

    pub fn is_muted(&self, stat: Stat) -> bool {
        self.muted.contains(&stat)
    }
}
