//! Program graph: nodes, links, and the rules for wiring them.
//!
//! Storage is slot-vec style: nodes and links live in `Vec<Option<_>>`
//! indexed by their id. Slots are not reused, so a stale id resolves to
//! an empty slot instead of aliasing a newer node. Removing a node
//! cascades to every link touching it, so the link table never holds a
//! dangling endpoint.

use crate::error::{ConnectionError, DataflowError, Result};
use crate::program::id::{LinkId, NodeId};
use crate::program::node::{Node, NodeKind};
use serde::{Deserialize, Serialize};

/// A directed connection from one node's output to another node's
/// input port. Sources have a single output, so only the destination
/// port is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub source: NodeId,
    pub dest: NodeId,
    pub dest_port: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    nodes: Vec<Option<Node>>,
    links: Vec<Option<Link>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(Node::new(id, kind)));
        id
    }

    /// Remove a node and every link attached to it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        self.nodes
            .get_mut(id.index())
            .and_then(|slot| slot.take())
            .ok_or(DataflowError::UnknownNode(id))?;

        for link_slot in self.links.iter_mut() {
            if let Some(link) = link_slot {
                if link.source == id || link.dest == id {
                    *link_slot = None;
                }
            }
        }
        Ok(())
    }

    /// Connect `source`'s output to `dest`'s input port, enforcing the
    /// wiring rules. A port already fed by another link, a port beyond
    /// the destination's arity, a terminal source, or a self-loop all
    /// reject the connection.
    pub fn add_link(&mut self, source: NodeId, dest: NodeId, dest_port: usize) -> Result<LinkId> {
        let source_node = self
            .node(source)
            .ok_or(DataflowError::InvalidConnection(ConnectionError::UnknownSource(source)))?;
        if source_node.kind.output_arity() == 0 {
            return Err(DataflowError::InvalidConnection(
                ConnectionError::PortOutOfRange {
                    node: source,
                    port: 0,
                    arity: 0,
                },
            ));
        }
        let dest_node = self.node(dest).ok_or(DataflowError::InvalidConnection(
            ConnectionError::UnknownDestination(dest),
        ))?;
        let arity = dest_node.kind.input_arity();
        if dest_port >= arity {
            return Err(DataflowError::InvalidConnection(
                ConnectionError::PortOutOfRange {
                    node: dest,
                    port: dest_port,
                    arity,
                },
            ));
        }
        if source == dest {
            return Err(DataflowError::InvalidConnection(ConnectionError::SelfLoop(
                source,
            )));
        }
        if self
            .links()
            .any(|link| link.dest == dest && link.dest_port == dest_port)
        {
            return Err(DataflowError::InvalidConnection(
                ConnectionError::PortOccupied {
                    node: dest,
                    port: dest_port,
                },
            ));
        }

        let id = LinkId(self.links.len() as u32);
        self.links.push(Some(Link {
            id,
            source,
            dest,
            dest_port,
        }));
        Ok(id)
    }

    pub fn remove_link(&mut self, id: LinkId) -> Result<()> {
        let slot = self
            .links
            .get_mut(id.index())
            .ok_or(DataflowError::UnknownLink(id))?;
        if slot.take().is_none() {
            return Err(DataflowError::UnknownLink(id));
        }
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(|slot| slot.as_ref())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).and_then(|slot| slot.as_mut())
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.index()).and_then(|slot| slot.as_ref())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut().filter_map(|slot| slot.as_mut())
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn link_count(&self) -> usize {
        self.links.iter().filter(|slot| slot.is_some()).count()
    }

    /// Links feeding the given node, one per occupied input port.
    pub fn inputs_of(&self, dest: NodeId) -> impl Iterator<Item = &Link> {
        self.links().filter(move |link| link.dest == dest)
    }
}
