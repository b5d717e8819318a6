//! Error handling for the dataflow engine
//!
//! Structural errors (a malformed link, a recorder action in the wrong
//! state) are rejected at the boundary with these types. Computational
//! errors (a non-numeric input, a missing hub) are *values* — `NaN` or a
//! degraded display state — so one broken node never stops the tick.

use crate::program::id::{LinkId, NodeId};
use crate::recorder::RecordingState;
use thiserror::Error;

/// Why a link attempt was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("source node {0} does not exist")]
    UnknownSource(NodeId),

    #[error("destination node {0} does not exist")]
    UnknownDestination(NodeId),

    #[error("port {port} out of range for node {node} (arity {arity})")]
    PortOutOfRange {
        node: NodeId,
        port: usize,
        arity: usize,
    },

    #[error("input port {port} of node {node} is already occupied")]
    PortOccupied { node: NodeId, port: usize },

    #[error("node {0} cannot be linked to itself")]
    SelfLoop(NodeId),
}

/// Main error type for dataflow engine operations
#[derive(Error, Debug)]
pub enum DataflowError {
    /// A link attempt that violates connection legality
    #[error("invalid connection: {0}")]
    InvalidConnection(ConnectionError),

    /// Operation referenced a node that is not in the graph
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// Operation referenced a link that is not in the graph
    #[error("unknown link: {0}")]
    UnknownLink(LinkId),

    /// A recorder action invoked in a state that does not permit it
    #[error("recorder cannot {action} while {state:?}")]
    RecorderState {
        action: &'static str,
        state: RecordingState,
    },

    /// A destructive action was invoked without explicit confirmation
    #[error("confirmation required: {0}")]
    ConfirmationRequired(&'static str),

    /// Errors related to channel communication with the runtime thread
    #[error("channel error: {0}")]
    Channel(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias using [`DataflowError`]
pub type Result<T> = std::result::Result<T, DataflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DataflowError::InvalidConnection(ConnectionError::PortOccupied {
            node: NodeId(3),
            port: 1,
        });
        assert!(err.to_string().contains("already occupied"));

        let err = DataflowError::RecorderState {
            action: "play",
            state: RecordingState::Recording,
        };
        assert!(err.to_string().contains("play"));
        assert!(err.to_string().contains("Recording"));
    }
}
