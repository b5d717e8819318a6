//! Operator tables for the computation nodes.
//!
//! Every operator is total over `f64`: a NaN operand yields a NaN result
//! (including the logic family — an unreadable input must not masquerade
//! as `false`). The tick never aborts on a bad value.

use serde::{Deserialize, Serialize};

/// Binary arithmetic operators for the Math node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MathOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl MathOperator {
    pub fn apply(self, n1: f64, n2: f64) -> f64 {
        match self {
            MathOperator::Add => n1 + n2,
            MathOperator::Subtract => n1 - n2,
            MathOperator::Multiply => n1 * n2,
            MathOperator::Divide => n1 / n2,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            MathOperator::Add => "+",
            MathOperator::Subtract => "-",
            MathOperator::Multiply => "*",
            MathOperator::Divide => "/",
        }
    }
}

/// Comparison/equality/boolean operators for the Logic node.
/// Results are 1.0/0.0, or NaN when either operand is NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicOperator {
    GreaterThan,
    LessThan,
    GreaterThanOrEqualTo,
    LessThanOrEqualTo,
    Equal,
    NotEqual,
    And,
    Or,
    Nand,
    Xor,
}

impl LogicOperator {
    pub fn apply(self, n1: f64, n2: f64) -> f64 {
        if n1.is_nan() || n2.is_nan() {
            return f64::NAN;
        }
        let truthy = |n: f64| n != 0.0;
        let b = match self {
            LogicOperator::GreaterThan => n1 > n2,
            LogicOperator::LessThan => n1 < n2,
            LogicOperator::GreaterThanOrEqualTo => n1 >= n2,
            LogicOperator::LessThanOrEqualTo => n1 <= n2,
            LogicOperator::Equal => n1 == n2,
            LogicOperator::NotEqual => n1 != n2,
            LogicOperator::And => truthy(n1) && truthy(n2),
            LogicOperator::Or => truthy(n1) || truthy(n2),
            LogicOperator::Nand => !(truthy(n1) && truthy(n2)),
            LogicOperator::Xor => truthy(n1) != truthy(n2),
        };
        if b {
            1.0
        } else {
            0.0
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            LogicOperator::GreaterThan => ">",
            LogicOperator::LessThan => "<",
            LogicOperator::GreaterThanOrEqualTo => ">=",
            LogicOperator::LessThanOrEqualTo => "<=",
            LogicOperator::Equal => "==",
            LogicOperator::NotEqual => "!=",
            LogicOperator::And => "&&",
            LogicOperator::Or => "||",
            LogicOperator::Nand => "nand",
            LogicOperator::Xor => "xor",
        }
    }
}

/// Unary operators for the Transform node.
///
/// `Ramp` slews toward the input: when the step from the previous output
/// exceeds 10% of it, move 10% per tick instead of jumping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransformOperator {
    AbsoluteValue,
    Negation,
    Not,
    Round,
    Floor,
    Ceil,
    Ramp,
}

impl TransformOperator {
    /// `prev` is the node's previous output, used only by `Ramp`.
    pub fn apply(self, n1: f64, prev: Option<f64>) -> f64 {
        match self {
            TransformOperator::AbsoluteValue => n1.abs(),
            TransformOperator::Negation => 0.0 - n1,
            TransformOperator::Not => {
                if n1.is_nan() {
                    f64::NAN
                } else if n1 != 0.0 {
                    0.0
                } else {
                    1.0
                }
            }
            TransformOperator::Round => n1.round(),
            TransformOperator::Floor => n1.floor(),
            TransformOperator::Ceil => n1.ceil(),
            TransformOperator::Ramp => ramp(n1, prev),
        }
    }
}

fn ramp(n1: f64, prev: Option<f64>) -> f64 {
    let Some(prev) = prev.filter(|p| p.is_finite()) else {
        return n1;
    };
    let delta = n1 - prev;
    let is_steep = delta.abs() > 0.1 * prev;
    if delta > 0.0 {
        if is_steep {
            prev + n1 * 0.1
        } else {
            n1
        }
    } else if delta < 0.0 {
        if is_steep {
            prev - prev * 0.1
        } else {
            n1
        }
    } else {
        n1
    }
}

/// Oscillator waveforms for the Generator node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
}

impl Waveform {
    /// Evaluate at time `t` (ms since engine start) with period `p` (ms)
    /// and amplitude `a`. The sine output is quantized to 2 decimals,
    /// matching the classic generator behavior.
    pub fn value(self, t: f64, p: f64, a: f64) -> f64 {
        if !(p > 0.0) {
            return f64::NAN;
        }
        match self {
            Waveform::Sine => {
                ((t * std::f64::consts::PI / (p / 2.0)).sin() * a * 100.0).round() / 100.0
            }
            Waveform::Square => {
                if t % p < p / 2.0 {
                    a
                } else {
                    0.0
                }
            }
            Waveform::Triangle => (2.0 * a / p) * ((t % p) - p / 2.0).abs(),
        }
    }
}

/// Timer (on/off) waveform: 1 during the on-phase, 0 during the off-phase.
/// `t_on`/`t_off` in ms.
pub fn timer_value(t: f64, t_on: f64, t_off: f64) -> f64 {
    let period = t_on + t_off;
    if !(period > 0.0) {
        return f64::NAN;
    }
    if t % period < t_on {
        1.0
    } else {
        0.0
    }
}

/// Hold functions for the Control node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoldOperator {
    /// Hold this: freeze the value present when the gate opened
    HoldCurrent,
    /// Hold previous: freeze the value from the tick before the gate opened
    HoldPrior,
    /// Hold 0: output zero while gated
    OutputZero,
}

impl HoldOperator {
    pub fn display_name(self) -> &'static str {
        match self {
            HoldOperator::HoldCurrent => "Hold this",
            HoldOperator::HoldPrior => "Hold previous",
            HoldOperator::OutputZero => "Hold 0",
        }
    }
}
