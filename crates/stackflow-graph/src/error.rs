//! Graph error types.

use thiserror::Error;

use crate::node::NodeId;

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur while building or hydrating a workflow graph.
///
/// Routine editing operations (patching an unknown node, reconnecting an
/// existing edge) never produce errors; they no-op and log instead. These
/// variants cover the cases where a caller hands us data that cannot be
/// represented at all, such as a persisted workflow with dangling edges.
#[derive(Debug, Error)]
pub enum GraphError {
    /// An edge references a node that does not exist in the workflow.
    #[error("edge {edge_id} references missing node {node_id}")]
    DanglingEdge {
        /// ID of the offending edge.
        edge_id: String,
        /// ID of the missing endpoint.
        node_id: NodeId,
    },

    /// Two nodes in a workflow share the same ID.
    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
