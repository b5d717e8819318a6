//! # Dataflow tile engine
//!
//! A headless engine for block-programming tiles: users wire typed
//! computation nodes (number, generator, timer, math, logic, transform,
//! hold, sensor, outputs) into a small graph that is re-evaluated on a
//! fixed tick. Programs can read live sensors through a hub adapter,
//! drive simulated or physical actuators, and record their output for
//! later playback.
//!
//! ## Architecture
//!
//! - **Program**: graph of nodes with validated links, evaluated each
//!   tick in topological order; hold nodes act as explicit one-tick
//!   delays, which makes feedback loops legal
//! - **Runtime**: one dedicated thread per tile, driven over crossbeam
//!   channels so graph edits never interleave a tick
//! - **Recorder**: samples chosen node channels on its own cadence and
//!   plays finished recordings back at the recorded rate
//! - **Hub**: pluggable sensor/actuator backend; a missing hub degrades
//!   the display instead of failing the program
//!
//! ## Example
//!
//! ```
//! use dataflow_tile::program::node::NodeKind;
//! use dataflow_tile::program::nodes::{GeneratorNode, MathNode, NumberNode};
//! use dataflow_tile::program::ops::{MathOperator, Waveform};
//! use dataflow_tile::tile::DataflowTile;
//!
//! let mut tile = DataflowTile::new();
//! let wave = tile.graph.add_node(NodeKind::Generator(GeneratorNode::new(
//!     Waveform::Sine,
//!     1.0,
//!     10.0,
//! )));
//! let offset = tile.graph.add_node(NodeKind::Number(NumberNode::new(20.0)));
//! let sum = tile
//!     .graph
//!     .add_node(NodeKind::Math(MathNode::new(MathOperator::Add)));
//! tile.graph.add_link(wave, sum, 0).unwrap();
//! tile.graph.add_link(offset, sum, 1).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod hub;
pub mod program;
pub mod recorder;
pub mod tile;
pub mod types;

// Re-export commonly used types
pub use error::{ConnectionError, DataflowError, Result};
pub use hub::{ActuatorChannel, DemoHub, Hub, HubReading, NullHub, SensorKind};
pub use program::{Graph, LinkId, NodeId, NodeKind, ProgramHandle, ProgramRuntime};
pub use recorder::{ProgramRecorder, Recording, RecordingState};
pub use tile::{DataflowTile, TileState};
pub use types::{DataPoint, HistoryBuffer};
