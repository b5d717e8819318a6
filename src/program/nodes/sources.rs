//! Source nodes: Number, Generator, Timer.
//!
//! Sources have no inputs. Generators and timers derive their value
//! purely from elapsed time and their parameters, so they are always
//! tick-ready regardless of graph shape.

use crate::program::node::EvalContext;
use crate::program::ops::{timer_value, Waveform};
use serde::{Deserialize, Serialize};

/// Holds a constant, user-editable value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberNode {
    pub value: f64,
    /// Optional display units (e.g. "°C")
    pub units: Option<String>,
}

impl NumberNode {
    pub fn new(value: f64) -> Self {
        Self { value, units: None }
    }

    /// Parse user text. Non-numeric entry becomes NaN rather than being
    /// rejected — the graph keeps ticking and downstream nodes fail soft.
    pub fn set_from_str(&mut self, text: &str) {
        self.value = text.trim().parse().unwrap_or(f64::NAN);
    }

    pub fn eval(&mut self, _ctx: &mut EvalContext) -> f64 {
        self.value
    }
}

/// Oscillator: sine/square/triangle with amplitude and period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorNode {
    pub waveform: Waveform,
    pub amplitude: f64,
    /// Period in seconds
    pub period: f64,
}

impl GeneratorNode {
    pub fn new(waveform: Waveform, amplitude: f64, period: f64) -> Self {
        Self {
            waveform,
            amplitude,
            period,
        }
    }

    pub fn eval(&mut self, ctx: &mut EvalContext) -> f64 {
        let t_ms = ctx.now.as_secs_f64() * 1000.0;
        self.waveform.value(t_ms, self.period * 1000.0, self.amplitude)
    }
}

/// Emits 1/0 alternating on configured on/off durations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerNode {
    /// On-phase duration in seconds
    pub time_on: f64,
    /// Off-phase duration in seconds
    pub time_off: f64,
}

impl TimerNode {
    pub fn new(time_on: f64, time_off: f64) -> Self {
        Self { time_on, time_off }
    }

    pub fn eval(&mut self, ctx: &mut EvalContext) -> f64 {
        let t_ms = ctx.now.as_secs_f64() * 1000.0;
        timer_value(t_ms, self.time_on * 1000.0, self.time_off * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::node::EvalContext;
    use crate::hub::NullHub;
    use std::time::Duration;

    fn ctx_at(ms: u64, hub: &mut NullHub) -> EvalContext {
        EvalContext {
            inputs: [f64::NAN; 2],
            connected: [false; 2],
            now: Duration::from_millis(ms),
            dt: Duration::from_millis(100),
            prev_value: f64::NAN,
            hub,
        }
    }

    #[test]
    fn test_number_parse_fail_soft() {
        let mut n = NumberNode::new(0.0);
        n.set_from_str("1.8309");
        assert_eq!(n.value, 1.8309);
        n.set_from_str("abc");
        assert!(n.value.is_nan());
    }

    #[test]
    fn test_generator_square() {
        let mut hub = NullHub;
        let mut g = GeneratorNode::new(Waveform::Square, 3.0, 1.0);
        assert_eq!(g.eval(&mut ctx_at(100, &mut hub)), 3.0);
        assert_eq!(g.eval(&mut ctx_at(600, &mut hub)), 0.0);
    }

    #[test]
    fn test_timer_phases() {
        let mut hub = NullHub;
        let mut t = TimerNode::new(0.3, 0.7);
        assert_eq!(t.eval(&mut ctx_at(0, &mut hub)), 1.0);
        assert_eq!(t.eval(&mut ctx_at(500, &mut hub)), 0.0);
        assert_eq!(t.eval(&mut ctx_at(1100, &mut hub)), 1.0);
    }
}
