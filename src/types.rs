//! Core data types for the dataflow engine
//!
//! # Main Types
//!
//! - [`DataPoint`] - A single timestamped node value
//! - [`HistoryBuffer`] - Bounded ring buffer of recent values feeding the
//!   inline minigraph display
//!
//! # Value semantics
//!
//! Node values are plain `f64`. `NaN` is a legal, propagating value that
//! marks a numeric domain error (disconnected or non-numeric input) — the
//! "fail soft" policy. Display is rounded to 3 decimal places while the
//! stored value keeps full precision.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Maximum number of samples retained per node for the minigraph.
pub const MAX_HISTORY_VALUES: usize = 16;

/// A single timestamped value produced by one node on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Time offset from engine start
    pub timestamp: Duration,
    /// Node output value (may be NaN)
    pub value: f64,
}

/// Round a value for display: 3 decimal places, full precision retained
/// by the caller.
#[inline]
pub fn round_node_value(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Format a node value for display. NaN and infinities render as an
/// empty marker rather than "NaN".
pub fn display_value(v: f64) -> String {
    if v.is_finite() {
        format!("{}", round_node_value(v))
    } else {
        "⚠️".to_string()
    }
}

/// Per-node bounded ring buffer of recent `(time, value)` samples.
///
/// Written once per tick by the evaluator while the node's minigraph is
/// visible; oldest entries evicted on overflow. Read-only for display —
/// the evaluator itself never reads it back.
#[derive(Debug, Clone, Default)]
pub struct HistoryBuffer {
    points: VecDeque<DataPoint>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_VALUES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest when full.
    pub fn push(&mut self, timestamp: Duration, value: f64) {
        if self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(DataPoint { timestamp, value });
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent sample, if any.
    pub fn last(&self) -> Option<&DataPoint> {
        self.points.back()
    }

    /// Iterate samples oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &DataPoint> {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_node_value() {
        assert_eq!(round_node_value(1.8309), 1.831);
        assert_eq!(round_node_value(0.1234), 0.123);
        assert_eq!(round_node_value(-2.5005), -2.501);
        assert_eq!(round_node_value(3.0), 3.0);
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(1.8309), "1.831");
        assert_eq!(display_value(f64::NAN), "⚠️");
        assert_eq!(display_value(f64::INFINITY), "⚠️");
    }

    #[test]
    fn test_history_eviction() {
        let mut buf = HistoryBuffer::new();
        for i in 0..(MAX_HISTORY_VALUES + 4) {
            buf.push(Duration::from_millis(i as u64 * 100), i as f64);
        }
        assert_eq!(buf.len(), MAX_HISTORY_VALUES);
        // Oldest 4 were evicted
        assert_eq!(buf.iter().next().unwrap().value, 4.0);
        assert_eq!(buf.last().unwrap().value, (MAX_HISTORY_VALUES + 3) as f64);
    }

    #[test]
    fn test_history_preserves_full_precision() {
        let mut buf = HistoryBuffer::new();
        buf.push(Duration::ZERO, 1.8309);
        assert_eq!(buf.last().unwrap().value, 1.8309);
    }
}
