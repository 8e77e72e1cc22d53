//! Matching configuration
//!
//! Configuration is part of the replicated state: every node of a market
//! must run with the same `MatchingConfig`, otherwise replays diverge.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a bucket of same-price, same-timestamp orders shares a fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Allocation {
    /// Proportional to remaining size, rounded up, clamped
    #[default]
    ProRata,
    /// Strict arrival order inside the bucket
    PriceTime,
}

/// Configuration of a single order book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub allocation: Allocation,
    /// Emit a debug record for every trade, not just per submission
    pub log_trades: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            allocation: Allocation::ProRata,
            log_trades: false,
        }
    }
}

impl MatchingConfig {
    /// Pure price-time priority, no pro-rata sharing
    pub fn price_time() -> Self {
        Self {
            allocation: Allocation::PriceTime,
            ..Self::default()
        }
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Configuration of the per-market async service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Bounded command queue in front of the book
    pub command_buffer: usize,
    /// Broadcast ring size; lagging subscribers lose the oldest events
    pub event_buffer: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            command_buffer: 1_024,
            event_buffer: 16_384,
        }
    }
}

impl ServiceConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
