//! Node container and kind dispatch.
//!
//! Every node in a program is a [`Node`] wrapping one [`NodeKind`]
//! variant. Dispatch is a plain enum match rather than trait objects,
//! so the evaluator stays monomorphic and the whole kind set is visible
//! in one place.

use crate::hub::Hub;
use crate::program::id::NodeId;
use crate::program::nodes::{
    ControlNode, DemoOutputNode, GeneratorNode, LiveOutputNode, LogicNode, MathNode, NumberNode,
    SensorNode, TimerNode, TransformNode,
};
use crate::types::{display_value, HistoryBuffer};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything a node may read while evaluating one tick.
///
/// `inputs` holds the resolved upstream values per input port, NaN for
/// unconnected ports; `connected` distinguishes a genuine NaN input
/// from a missing link. `prev_value` is the node's own output from the
/// previous tick.
pub struct EvalContext<'a> {
    pub inputs: [f64; 2],
    pub connected: [bool; 2],
    pub now: Duration,
    pub dt: Duration,
    pub prev_value: f64,
    pub hub: &'a mut dyn Hub,
}

/// The closed set of node behaviors a program may contain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum NodeKind {
    Number(NumberNode),
    Generator(GeneratorNode),
    Timer(TimerNode),
    Math(MathNode),
    Logic(LogicNode),
    Transform(TransformNode),
    Control(ControlNode),
    Sensor(SensorNode),
    DemoOutput(DemoOutputNode),
    LiveOutput(LiveOutputNode),
}

impl NodeKind {
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::Number(_) => "number",
            NodeKind::Generator(_) => "generator",
            NodeKind::Timer(_) => "timer",
            NodeKind::Math(_) => "math",
            NodeKind::Logic(_) => "logic",
            NodeKind::Transform(_) => "transform",
            NodeKind::Control(_) => "control",
            NodeKind::Sensor(_) => "sensor",
            NodeKind::DemoOutput(_) => "demo-output",
            NodeKind::LiveOutput(_) => "live-output",
        }
    }

    /// Number of input ports this kind accepts.
    pub fn input_arity(&self) -> usize {
        match self {
            NodeKind::Number(_)
            | NodeKind::Generator(_)
            | NodeKind::Timer(_)
            | NodeKind::Sensor(_) => 0,
            NodeKind::Transform(_) => 1,
            NodeKind::Math(_) | NodeKind::Logic(_) | NodeKind::Control(_) => 2,
            NodeKind::DemoOutput(n) => n.device.input_arity(),
            NodeKind::LiveOutput(_) => 1,
        }
    }

    /// Output nodes are terminal; everything else exposes one output.
    pub fn output_arity(&self) -> usize {
        match self {
            NodeKind::DemoOutput(_) | NodeKind::LiveOutput(_) => 0,
            _ => 1,
        }
    }

    /// Delay nodes expose last tick's value to their consumers, which
    /// lets them sit on a cycle without blocking the tick order.
    pub fn is_delay(&self) -> bool {
        matches!(self, NodeKind::Control(_))
    }

    pub fn eval(&mut self, ctx: &mut EvalContext) -> f64 {
        match self {
            NodeKind::Number(n) => n.eval(ctx),
            NodeKind::Generator(n) => n.eval(ctx),
            NodeKind::Timer(n) => n.eval(ctx),
            NodeKind::Math(n) => n.eval(ctx),
            NodeKind::Logic(n) => n.eval(ctx),
            NodeKind::Transform(n) => n.eval(ctx),
            NodeKind::Control(n) => n.eval(ctx),
            NodeKind::Sensor(n) => n.eval(ctx),
            NodeKind::DemoOutput(n) => n.eval(ctx),
            NodeKind::LiveOutput(n) => n.eval(ctx),
        }
    }

    /// Human-readable state for the tile, computed while the tick's
    /// context is still at hand.
    pub fn display(&self, value: f64, ctx: &EvalContext) -> String {
        match self {
            NodeKind::Math(n) => n.sentence(ctx),
            NodeKind::Logic(n) => n.sentence(ctx),
            NodeKind::Control(n) => n.sentence(value, ctx.now),
            NodeKind::Sensor(n) => n.display(value),
            NodeKind::DemoOutput(n) => n.display(value),
            NodeKind::LiveOutput(n) => n.display(value),
            NodeKind::Number(_)
            | NodeKind::Generator(_)
            | NodeKind::Timer(_)
            | NodeKind::Transform(_) => display_value(value),
        }
    }
}

fn nan() -> f64 {
    f64::NAN
}

/// A placed node: identity, behavior, current value, optional history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,

    /// Output of the most recent evaluation. NaN before the first tick.
    #[serde(skip, default = "nan")]
    pub value: f64,

    /// Value exposed to consumers of a delay node, committed at the end
    /// of each tick. Unused for ordinary kinds.
    #[serde(skip)]
    pub committed: f64,

    /// Display string from the most recent evaluation.
    #[serde(skip)]
    pub display: String,

    /// Recent-values ring, present while the minigraph is shown.
    #[serde(skip)]
    pub history: Option<HistoryBuffer>,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            value: f64::NAN,
            committed: 0.0,
            display: String::new(),
            history: None,
        }
    }

    /// Value downstream nodes should read this tick.
    pub fn output(&self) -> f64 {
        if self.kind.is_delay() {
            self.committed
        } else {
            self.value
        }
    }

    /// Evaluate for the tick and refresh the display string.
    pub fn evaluate(&mut self, ctx: &mut EvalContext) {
        ctx.prev_value = self.value;
        self.value = self.kind.eval(ctx);
        self.display = self.kind.display(self.value, ctx);
    }

    /// Expose this tick's value to next tick's consumers.
    pub fn commit(&mut self) {
        self.committed = self.value;
    }

    /// Show or hide the minigraph. Enabling starts an empty buffer;
    /// disabling drops accumulated samples. Both are idempotent.
    pub fn set_minigraph(&mut self, enabled: bool, capacity: usize) {
        match (enabled, self.history.is_some()) {
            (true, false) => self.history = Some(HistoryBuffer::with_capacity(capacity)),
            (false, true) => self.history = None,
            _ => {}
        }
    }

    pub fn minigraph_enabled(&self) -> bool {
        self.history.is_some()
    }

    /// Append the tick's value to the history, if one is being kept.
    pub fn record(&mut self, timestamp: Duration) {
        if let Some(history) = &mut self.history {
            history.push(timestamp, self.value);
        }
    }
}
