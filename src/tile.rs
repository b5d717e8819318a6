//! Tile surface: what the embedding document sees of a program.
//!
//! A tile owns a program graph, its engine settings and its recorder,
//! and exposes a serializable snapshot for persistence. Snapshots carry
//! topology and parameters but never recent values; a restored tile
//! starts with a cold evaluator.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::program::graph::Graph;
use crate::program::id::NodeId;
use crate::recorder::{ProgramRecorder, RecordingView};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TILE_TITLE: &str = "Program";

/// An external value source the tile can offer for linking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkableSource {
    pub key: String,
    pub label: String,
}

/// Persistent form of a tile. Node values, display strings and history
/// buffers are volatile and excluded by the node serde shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileState {
    pub title: String,
    pub graph: Graph,
    pub config: EngineConfig,
    pub linkable_sources: Vec<LinkableSource>,
}

pub struct DataflowTile {
    title: String,
    pub graph: Graph,
    pub config: EngineConfig,
    pub recorder: ProgramRecorder,
    linkable_sources: Vec<LinkableSource>,
    selected_source: Option<String>,
}

impl Default for DataflowTile {
    fn default() -> Self {
        Self::new()
    }
}

impl DataflowTile {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TILE_TITLE.to_string(),
            graph: Graph::new(),
            config: EngineConfig::default(),
            recorder: ProgramRecorder::new(),
            linkable_sources: Vec::new(),
            selected_source: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Snapshot for persistence.
    pub fn state(&self) -> TileState {
        TileState {
            title: self.title.clone(),
            graph: self.graph.clone(),
            config: self.config.clone(),
            linkable_sources: self.linkable_sources.clone(),
        }
    }

    /// Rebuild a tile from a snapshot. The recorder starts Idle and the
    /// restored nodes carry no values until the next tick.
    pub fn restore(state: TileState) -> Self {
        Self {
            title: state.title,
            graph: state.graph,
            config: state.config,
            recorder: ProgramRecorder::new(),
            linkable_sources: state.linkable_sources,
            selected_source: None,
        }
    }

    /// Subscribe to the current recording; the view goes stale when the
    /// recording is cleared.
    pub fn subscribe_recording(&self) -> RecordingView {
        self.recorder.view()
    }

    pub fn register_linkable_source(&mut self, key: impl Into<String>, label: impl Into<String>) {
        self.linkable_sources.push(LinkableSource {
            key: key.into(),
            label: label.into(),
        });
    }

    pub fn has_linkable_source(&self) -> bool {
        !self.linkable_sources.is_empty()
    }

    /// Select a registered source by key. Responsibility ends at the
    /// selection; wiring its values in is up to the embedder.
    pub fn select_source(&mut self, key: &str) -> bool {
        if self.linkable_sources.iter().any(|s| s.key == key) {
            self.selected_source = Some(key.to_string());
            true
        } else {
            false
        }
    }

    pub fn selected_source(&self) -> Option<&str> {
        self.selected_source.as_deref()
    }

    /// Node ids whose minigraph is currently visible, the default
    /// channel set for a new recording.
    pub fn visible_channels(&self) -> Vec<NodeId> {
        self.graph
            .nodes()
            .filter(|node| node.minigraph_enabled())
            .map(|node| node.id)
            .collect()
    }

    pub fn save_state(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &self.state())
            .map_err(|e| crate::error::DataflowError::Serialization(e.to_string()))
    }

    pub fn load_state(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let state: TileState = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| crate::error::DataflowError::Serialization(e.to_string()))?;
        Ok(Self::restore(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::node::NodeKind;
    use crate::program::nodes::{MathNode, NumberNode};
    use crate::program::ops::MathOperator;

    fn sample_tile() -> DataflowTile {
        let mut tile = DataflowTile::new();
        tile.set_title("plant monitor");
        let a = tile.graph.add_node(NodeKind::Number(NumberNode::new(1.5)));
        let b = tile.graph.add_node(NodeKind::Number(NumberNode::new(2.0)));
        let sum = tile
            .graph
            .add_node(NodeKind::Math(MathNode::new(MathOperator::Add)));
        tile.graph.add_link(a, sum, 0).unwrap();
        tile.graph.add_link(b, sum, 1).unwrap();
        tile
    }

    #[test]
    fn test_state_round_trip_preserves_topology() {
        let tile = sample_tile();
        let json = serde_json::to_string(&tile.state()).unwrap();
        let state: TileState = serde_json::from_str(&json).unwrap();
        let restored = DataflowTile::restore(state);

        assert_eq!(restored.title(), "plant monitor");
        assert_eq!(restored.graph.node_count(), 3);
        assert_eq!(restored.graph.link_count(), 2);
        // values are volatile and come back cold
        assert!(restored.graph.nodes().all(|node| node.value.is_nan()));
    }

    #[test]
    fn test_snapshot_excludes_history() {
        let mut tile = sample_tile();
        let id = tile.graph.nodes().next().unwrap().id;
        tile.graph.node_mut(id).unwrap().set_minigraph(true, 16);
        tile.graph
            .node_mut(id)
            .unwrap()
            .record(std::time::Duration::from_millis(5));

        let json = serde_json::to_string(&tile.state()).unwrap();
        let state: TileState = serde_json::from_str(&json).unwrap();
        let restored = DataflowTile::restore(state);
        assert!(restored.graph.node(id).unwrap().history.is_none());
    }

    #[test]
    fn test_linkable_sources() {
        let mut tile = DataflowTile::new();
        assert!(!tile.has_linkable_source());
        tile.register_linkable_source("var-7", "Greenhouse temperature");
        assert!(tile.has_linkable_source());
        assert!(!tile.select_source("nope"));
        assert!(tile.select_source("var-7"));
        assert_eq!(tile.selected_source(), Some("var-7"));
    }
}
