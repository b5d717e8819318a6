//! Control (Hold) node.
//!
//! Two inputs: the signal on port 0, the gate on port 1. While the gate
//! is active the node freezes its output according to the selected hold
//! function; otherwise the signal passes through. The evaluator commits
//! a Control node's freshly computed value only at the end of the tick,
//! so consumers always see the previous tick's output — this is the
//! designed one-tick delay that decouples feedback loops.

use crate::program::node::EvalContext;
use crate::program::ops::HoldOperator;
use crate::types::display_value;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Input port carrying the signal value.
pub const SIGNAL_PORT: usize = 0;
/// Input port carrying the gate value.
pub const GATE_PORT: usize = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlNode {
    pub op: HoldOperator,
    /// Seconds the gate stays active after first opening (0 = no timer)
    pub wait_duration: f64,

    // Volatile gate/hold state, rebuilt as the program runs.
    #[serde(skip)]
    gate_active: bool,
    #[serde(skip)]
    timer_until: Option<Duration>,
    #[serde(skip)]
    held_value: Option<f64>,
}

impl ControlNode {
    pub fn new(op: HoldOperator) -> Self {
        Self {
            op,
            wait_duration: 0.0,
            gate_active: false,
            timer_until: None,
            held_value: None,
        }
    }

    pub fn gate_active(&self) -> bool {
        self.gate_active
    }

    fn timer_running(&self, now: Duration) -> bool {
        self.timer_until.is_some_and(|until| now < until)
    }

    pub fn eval(&mut self, ctx: &mut EvalContext) -> f64 {
        let signal = if ctx.connected[SIGNAL_PORT] {
            ctx.inputs[SIGNAL_PORT]
        } else {
            0.0
        };
        let gate_in = ctx.inputs[GATE_PORT];

        // A wait timer keeps the gate open for `wait_duration` seconds
        // after it first fires.
        let timer_running = self.timer_running(ctx.now);
        if self.wait_duration > 0.0 && gate_in == 1.0 && !timer_running {
            self.timer_until = Some(ctx.now + Duration::from_secs_f64(self.wait_duration));
        }
        self.gate_active = if self.timer_running(ctx.now) {
            true
        } else {
            gate_in == 1.0
        };

        match self.op {
            HoldOperator::OutputZero => {
                self.held_value = None;
                if self.gate_active {
                    0.0
                } else {
                    signal
                }
            }
            HoldOperator::HoldCurrent => {
                if self.gate_active {
                    *self.held_value.get_or_insert(signal)
                } else {
                    self.held_value = None;
                    signal
                }
            }
            HoldOperator::HoldPrior => {
                if self.gate_active {
                    let prev = ctx.prev_value;
                    *self
                        .held_value
                        .get_or_insert(if prev.is_nan() { 0.0 } else { prev })
                } else {
                    self.held_value = None;
                    signal
                }
            }
        }
    }

    /// Node face text, e.g. "on → 0" or "off → 1.5".
    pub fn sentence(&self, value: f64, now: Duration) -> String {
        let v = display_value(value);
        if self.gate_active {
            if self.timer_running(now) {
                format!("waiting → {v}")
            } else {
                format!("on → {v}")
            }
        } else {
            format!("off → {v}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::NullHub;

    fn ctx<'a>(
        signal: f64,
        gate: f64,
        now_ms: u64,
        prev: f64,
        hub: &'a mut NullHub,
    ) -> EvalContext<'a> {
        EvalContext {
            inputs: [signal, gate],
            connected: [true, true],
            now: Duration::from_millis(now_ms),
            dt: Duration::from_millis(100),
            prev_value: prev,
            hub,
        }
    }

    #[test]
    fn test_gate_closed_passes_through() {
        let mut hub = NullHub;
        let mut node = ControlNode::new(HoldOperator::HoldCurrent);
        assert_eq!(node.eval(&mut ctx(5.0, 0.0, 0, f64::NAN, &mut hub)), 5.0);
        assert!(!node.gate_active());
    }

    #[test]
    fn test_hold_current_freezes_first_gated_value() {
        let mut hub = NullHub;
        let mut node = ControlNode::new(HoldOperator::HoldCurrent);
        assert_eq!(node.eval(&mut ctx(5.0, 1.0, 0, f64::NAN, &mut hub)), 5.0);
        // Signal moves on, held value does not
        assert_eq!(node.eval(&mut ctx(9.0, 1.0, 100, 5.0, &mut hub)), 5.0);
        // Gate drops: pass through again
        assert_eq!(node.eval(&mut ctx(9.0, 0.0, 200, 5.0, &mut hub)), 9.0);
    }

    #[test]
    fn test_hold_prior_freezes_previous_output() {
        let mut hub = NullHub;
        let mut node = ControlNode::new(HoldOperator::HoldPrior);
        assert_eq!(node.eval(&mut ctx(5.0, 0.0, 0, f64::NAN, &mut hub)), 5.0);
        // Gate opens: freeze what the node emitted last tick
        assert_eq!(node.eval(&mut ctx(9.0, 1.0, 100, 5.0, &mut hub)), 5.0);
        assert_eq!(node.eval(&mut ctx(12.0, 1.0, 200, 5.0, &mut hub)), 5.0);
    }

    #[test]
    fn test_output_zero_while_gated() {
        let mut hub = NullHub;
        let mut node = ControlNode::new(HoldOperator::OutputZero);
        assert_eq!(node.eval(&mut ctx(5.0, 1.0, 0, f64::NAN, &mut hub)), 0.0);
        assert_eq!(node.eval(&mut ctx(5.0, 0.0, 100, 0.0, &mut hub)), 5.0);
    }

    #[test]
    fn test_wait_timer_keeps_gate_open() {
        let mut hub = NullHub;
        let mut node = ControlNode::new(HoldOperator::OutputZero);
        node.wait_duration = 1.0;
        // Gate pulses once at t=0; timer holds it for 1s
        assert_eq!(node.eval(&mut ctx(5.0, 1.0, 0, f64::NAN, &mut hub)), 0.0);
        assert_eq!(node.eval(&mut ctx(5.0, 0.0, 500, 0.0, &mut hub)), 0.0);
        assert!(node.gate_active());
        // Timer expired
        assert_eq!(node.eval(&mut ctx(5.0, 0.0, 1500, 0.0, &mut hub)), 5.0);
        assert!(!node.gate_active());
    }

    #[test]
    fn test_disconnected_signal_reads_zero() {
        let mut hub = NullHub;
        let mut node = ControlNode::new(HoldOperator::HoldCurrent);
        let mut c = ctx(f64::NAN, 0.0, 0, f64::NAN, &mut hub);
        c.connected[SIGNAL_PORT] = false;
        assert_eq!(node.eval(&mut c), 0.0);
    }
}
