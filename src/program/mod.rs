//! The dataflow program: graph, node behaviors, evaluation, runtime.

pub mod evaluator;
pub mod graph;
pub mod id;
pub mod node;
pub mod nodes;
pub mod ops;
pub mod runtime;

pub use evaluator::Evaluator;
pub use graph::{Graph, Link};
pub use id::{LinkId, NodeId};
pub use node::{EvalContext, Node, NodeKind};
pub use runtime::{
    NodeParam, NodeValue, ProgramCommand, ProgramEvent, ProgramHandle, ProgramRuntime,
};
