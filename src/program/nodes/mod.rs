//! Per-kind node behavior.
//!
//! Each node kind is a struct with its parameters and volatile state;
//! the `NodeKind` enum in [`crate::program::node`] dispatches over them.

pub mod arith;
pub mod control;
pub mod output;
pub mod sensor;
pub mod sources;

pub use arith::{LogicNode, MathNode, TransformNode};
pub use control::ControlNode;
pub use output::{DemoDevice, DemoOutputNode, LiveDevice, LiveOutputNode};
pub use sensor::SensorNode;
pub use sources::{GeneratorNode, NumberNode, TimerNode};
