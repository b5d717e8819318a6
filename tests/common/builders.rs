//! Test data builders for assembling small programs

use dataflow_tile::program::node::NodeKind;
use dataflow_tile::program::nodes::{
    GeneratorNode, LogicNode, MathNode, NumberNode, TimerNode, TransformNode,
};
use dataflow_tile::program::ops::{
    LogicOperator, MathOperator, TransformOperator, Waveform,
};
use dataflow_tile::program::{Graph, NodeId};

/// Builder for wiring a test program without repeating graph plumbing.
pub struct ProgramBuilder {
    graph: Graph,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
        }
    }

    pub fn number(&mut self, value: f64) -> NodeId {
        self.graph.add_node(NodeKind::Number(NumberNode::new(value)))
    }

    pub fn generator(&mut self, waveform: Waveform, amplitude: f64, period_s: f64) -> NodeId {
        self.graph.add_node(NodeKind::Generator(GeneratorNode::new(
            waveform, amplitude, period_s,
        )))
    }

    pub fn timer(&mut self, on_s: f64, off_s: f64) -> NodeId {
        self.graph
            .add_node(NodeKind::Timer(TimerNode::new(on_s, off_s)))
    }

    pub fn math(&mut self, op: MathOperator) -> NodeId {
        self.graph.add_node(NodeKind::Math(MathNode::new(op)))
    }

    pub fn logic(&mut self, op: LogicOperator) -> NodeId {
        self.graph.add_node(NodeKind::Logic(LogicNode::new(op)))
    }

    pub fn transform(&mut self, op: TransformOperator) -> NodeId {
        self.graph
            .add_node(NodeKind::Transform(TransformNode::new(op)))
    }

    pub fn node(&mut self, kind: NodeKind) -> NodeId {
        self.graph.add_node(kind)
    }

    pub fn link(&mut self, source: NodeId, dest: NodeId, port: usize) -> &mut Self {
        self.graph
            .add_link(source, dest, port)
            .unwrap_or_else(|e| panic!("test link {source} -> {dest}:{port} failed: {e}"));
        self
    }

    pub fn build(self) -> Graph {
        self.graph
    }
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}
