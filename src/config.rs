//! Engine configuration
//!
//! Holds the user-selectable sampling/tick rate table and per-tile engine
//! settings. Each dataflow tile carries its own [`EngineConfig`] — there
//! is no process-global rate state, so multiple tiles stay independent.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default evaluation period in milliseconds.
pub const DEFAULT_DATA_RATE_MS: u64 = 1000;

/// The user-selectable data rates, mirroring the rate picker.
pub const PROGRAM_DATA_RATES_MS: &[u64] = &[50, 100, 500, 1000, 10_000, 60_000];

/// Human labels for the rate picker entries.
pub fn data_rate_label(ms: u64) -> String {
    match ms {
        ms if ms < 1000 => format!("{}ms", ms),
        ms if ms < 60_000 => format!("{} sec", ms / 1000),
        ms => format!("{} min", ms / 60_000),
    }
}

/// Per-tile engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Evaluator tick period in milliseconds (fixed-period, not frame-driven).
    pub data_rate_ms: u64,
    /// History buffer capacity per node (minigraph depth).
    pub history_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_rate_ms: DEFAULT_DATA_RATE_MS,
            history_capacity: crate::types::MAX_HISTORY_VALUES,
        }
    }
}

impl EngineConfig {
    /// Tick period as a [`Duration`].
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.data_rate_ms)
    }

    /// Whether `ms` is one of the supported data rates.
    pub fn is_supported_rate(ms: u64) -> bool {
        PROGRAM_DATA_RATES_MS.contains(&ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rate_is_supported() {
        assert!(EngineConfig::is_supported_rate(DEFAULT_DATA_RATE_MS));
        assert_eq!(EngineConfig::default().tick_period(), Duration::from_secs(1));
    }

    #[test]
    fn test_rate_labels() {
        assert_eq!(data_rate_label(50), "50ms");
        assert_eq!(data_rate_label(500), "500ms");
        assert_eq!(data_rate_label(1000), "1 sec");
        assert_eq!(data_rate_label(10_000), "10 sec");
        assert_eq!(data_rate_label(60_000), "1 min");
    }
}
