//! Arithmetic nodes: Math, Logic, Transform.
//!
//! All three fail soft: a disconnected input arrives as NaN and the
//! operator tables propagate it instead of halting the tick.

use crate::program::node::EvalContext;
use crate::program::ops::{LogicOperator, MathOperator, TransformOperator};
use crate::types::display_value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MathNode {
    pub op: MathOperator,
}

impl MathNode {
    pub fn new(op: MathOperator) -> Self {
        Self { op }
    }

    pub fn eval(&mut self, ctx: &mut EvalContext) -> f64 {
        self.op.apply(ctx.inputs[0], ctx.inputs[1])
    }

    /// Number sentence for the node face, e.g. "2 + 3 = ".
    pub fn sentence(&self, ctx: &EvalContext) -> String {
        format!(
            "{} {} {} = ",
            display_value(ctx.inputs[0]),
            self.op.symbol(),
            display_value(ctx.inputs[1])
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicNode {
    pub op: LogicOperator,
}

impl LogicNode {
    pub fn new(op: LogicOperator) -> Self {
        Self { op }
    }

    pub fn eval(&mut self, ctx: &mut EvalContext) -> f64 {
        self.op.apply(ctx.inputs[0], ctx.inputs[1])
    }

    pub fn sentence(&self, ctx: &EvalContext) -> String {
        format!(
            "{} {} {} ⇒ ",
            display_value(ctx.inputs[0]),
            self.op.symbol(),
            display_value(ctx.inputs[1])
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformNode {
    pub op: TransformOperator,
}

impl TransformNode {
    pub fn new(op: TransformOperator) -> Self {
        Self { op }
    }

    pub fn eval(&mut self, ctx: &mut EvalContext) -> f64 {
        let prev = if ctx.prev_value.is_finite() {
            Some(ctx.prev_value)
        } else {
            None
        };
        self.op.apply(ctx.inputs[0], prev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::NullHub;
    use std::time::Duration;

    fn ctx_with<'a>(inputs: [f64; 2], hub: &'a mut NullHub) -> EvalContext<'a> {
        EvalContext {
            inputs,
            connected: [true; 2],
            now: Duration::ZERO,
            dt: Duration::from_millis(100),
            prev_value: f64::NAN,
            hub,
        }
    }

    #[test]
    fn test_math_divide_nan_input() {
        let mut hub = NullHub;
        let mut node = MathNode::new(MathOperator::Divide);
        assert!(node.eval(&mut ctx_with([6.0, f64::NAN], &mut hub)).is_nan());
        assert_eq!(node.eval(&mut ctx_with([6.0, 3.0], &mut hub)), 2.0);
    }

    #[test]
    fn test_sentence_display_rounding() {
        let mut hub = NullHub;
        let node = MathNode::new(MathOperator::Add);
        let ctx = ctx_with([1.8309, 1.0], &mut hub);
        assert_eq!(node.sentence(&ctx), "1.831 + 1 = ");
    }

    #[test]
    fn test_transform_ramp_uses_prev_output() {
        let mut hub = NullHub;
        let mut node = TransformNode::new(TransformOperator::Ramp);
        let mut ctx = ctx_with([100.0, f64::NAN], &mut hub);
        ctx.prev_value = 10.0;
        assert_eq!(node.eval(&mut ctx), 20.0);
    }
}
