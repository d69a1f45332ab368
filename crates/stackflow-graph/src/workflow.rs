//! Serializable workflow definition.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::node::{Edge, Node, NodeId, NodeKind};

/// A stack's workflow: ordered nodes and the edges between them.
///
/// This is both the in-memory shape and the exact `workflow_config`
/// payload exchanged with the backend. Node and edge order is insertion
/// order and is preserved across hydrate/snapshot round trips.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Workflow {
    /// Nodes in the workflow, in insertion order.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Edges connecting nodes, in insertion order.
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Workflow {
    /// Creates an empty workflow.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether the workflow has neither nodes nor edges.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns a reference to a node by ID.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == *id)
    }

    /// Returns a mutable reference to a node by ID.
    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id == *id)
    }

    /// Returns whether a node exists.
    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.iter().any(|node| node.id == *id)
    }

    /// Returns an iterator over nodes of the given kind.
    pub fn nodes_of_kind<'a>(&'a self, kind: &'a NodeKind) -> impl Iterator<Item = &'a Node> {
        self.nodes.iter().filter(move |node| node.kind == *kind)
    }

    /// Returns the number of edges arriving at a node.
    pub fn incoming_count(&self, id: &NodeId) -> usize {
        self.edges.iter().filter(|edge| edge.target == *id).count()
    }

    /// Returns the number of edges leaving a node.
    pub fn outgoing_count(&self, id: &NodeId) -> usize {
        self.edges.iter().filter(|edge| edge.source == *id).count()
    }

    /// Returns whether any edge touches the node.
    pub fn is_connected(&self, id: &NodeId) -> bool {
        self.edges.iter().any(|edge| edge.touches(id))
    }

    /// Checks referential integrity: unique node ids and no dangling
    /// edge endpoints.
    ///
    /// Editing operations uphold these invariants by construction; this
    /// guards workflows arriving from persistence.
    pub fn check_integrity(&self) -> GraphResult<()> {
        let mut seen = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !seen.insert(&node.id) {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }

        for edge in &self.edges {
            for endpoint in [&edge.source, &edge.target] {
                if !seen.contains(endpoint) {
                    return Err(GraphError::DanglingEdge {
                        edge_id: edge.id.to_string(),
                        node_id: endpoint.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
