//! Tick evaluation.
//!
//! Each tick walks the graph in dependency order, feeds every node its
//! upstream values, and records the results. The order is Kahn's
//! algorithm over the link set, with one twist: edges leaving a delay
//! node are not counted, because consumers of a delay node read its
//! value from the previous tick. That makes any cycle routed through a
//! hold node legal. A cycle with no delay node on it cannot be ordered;
//! its members are skipped for the tick and keep their previous value.
//!
//! A tick never aborts. Bad input turns into NaN inside the nodes, not
//! into an error here.

use crate::hub::Hub;
use crate::program::graph::Graph;
use crate::program::id::NodeId;
use crate::program::node::EvalContext;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Default)]
pub struct Evaluator {
    /// Cached evaluation order, rebuilt after structural changes.
    order: Option<Vec<NodeId>>,
    last_tick: Option<Duration>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the cached order. Call after any node or link mutation.
    pub fn invalidate(&mut self) {
        self.order = None;
    }

    /// Evaluate every node once at program time `now`.
    pub fn tick(&mut self, graph: &mut Graph, hub: &mut dyn Hub, now: Duration) {
        let order = match self.order.take() {
            Some(order) => order,
            None => evaluation_order(graph),
        };
        let dt = match self.last_tick {
            Some(prev) => now.saturating_sub(prev),
            None => Duration::ZERO,
        };
        self.last_tick = Some(now);

        for &id in &order {
            let mut inputs = [f64::NAN; 2];
            let mut connected = [false; 2];
            for link in graph.inputs_of(id) {
                if link.dest_port < 2 {
                    connected[link.dest_port] = true;
                    if let Some(source) = graph.node(link.source) {
                        inputs[link.dest_port] = source.output();
                    }
                }
            }
            if let Some(node) = graph.node_mut(id) {
                let mut ctx = EvalContext {
                    inputs,
                    connected,
                    now,
                    dt,
                    prev_value: f64::NAN,
                    hub: &mut *hub,
                };
                node.evaluate(&mut ctx);
            }
        }

        for node in graph.nodes_mut() {
            if node.kind.is_delay() {
                node.commit();
            }
            node.record(now);
        }

        self.order = Some(order);
    }
}

/// Kahn's algorithm over the non-delay edges; nodes stuck in an
/// undelayed cycle are left out and keep their previous values.
fn evaluation_order(graph: &Graph) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = graph.nodes().map(|node| node.id).collect();
    ids.sort_unstable();

    let counted = |source: NodeId| {
        graph
            .node(source)
            .map(|node| !node.kind.is_delay())
            .unwrap_or(false)
    };

    let mut in_degree: Vec<(NodeId, usize)> = ids
        .iter()
        .map(|&id| {
            let degree = graph
                .inputs_of(id)
                .filter(|link| counted(link.source))
                .count();
            (id, degree)
        })
        .collect();

    let mut ready: VecDeque<NodeId> = in_degree
        .iter()
        .filter(|(_, degree)| *degree == 0)
        .map(|(id, _)| *id)
        .collect();

    let mut order = Vec::with_capacity(ids.len());
    while let Some(id) = ready.pop_front() {
        order.push(id);
        if !counted(id) {
            continue;
        }
        for link in graph.links().filter(|link| link.source == id) {
            if let Some(entry) = in_degree.iter_mut().find(|(dest, _)| *dest == link.dest) {
                entry.1 = entry.1.saturating_sub(1);
                if entry.1 == 0 {
                    ready.push_back(link.dest);
                }
            }
        }
    }

    if order.len() < ids.len() {
        let skipped = ids.len() - order.len();
        warn!(
            skipped,
            "program contains an undelayed cycle; cyclic nodes keep their previous values"
        );
    }

    order
}
