//! Mutable graph store for one editing session.

use jiff::Timestamp;
use serde_json::{Map, Value};

use crate::TRACING_TARGET;
use crate::error::GraphResult;
use crate::node::{Edge, EdgeId, Node, NodeId, NodeKind, Position};
use crate::workflow::Workflow;

/// Owns the mutable workflow of one stack while it is being edited.
///
/// The store is the single source of truth for the graph; rendering
/// layers are projections that feed change events back in. Editing
/// operations uphold two hard invariants: node ids are unique, and no
/// edge ever references a missing node (deletion cascades).
///
/// Invalid local input (unknown node id, malformed patch) is logged and
/// ignored; it never corrupts state and never surfaces as an error.
#[derive(Debug, Clone)]
pub struct GraphStore {
    workflow: Workflow,
    /// Monotonic sequence for fresh node ids, seeded from the wall clock.
    sequence: u64,
    /// Bumped on every structural or config mutation. Selection changes
    /// leave it untouched, so it doubles as the revalidation trigger.
    revision: u64,
}

impl GraphStore {
    /// Creates a store with an empty workflow.
    pub fn new() -> Self {
        Self {
            workflow: Workflow::new(),
            sequence: Timestamp::now().as_millisecond().max(0) as u64,
            revision: 0,
        }
    }

    /// Replaces the workflow wholesale with persisted stack data.
    ///
    /// Rejects workflows that violate referential integrity. The id
    /// sequence is advanced past every numeric suffix already in use so
    /// later [`create_node`](Self::create_node) calls cannot collide.
    pub fn hydrate(&mut self, workflow: Workflow) -> GraphResult<()> {
        workflow.check_integrity()?;

        for node in &workflow.nodes {
            if let Some(suffix) = numeric_suffix(node.id.as_str()) {
                self.sequence = self.sequence.max(suffix + 1);
            }
        }

        self.workflow = workflow;
        self.revision += 1;
        Ok(())
    }

    /// Returns a wholesale copy of the current workflow for persistence
    /// or validation.
    pub fn snapshot(&self) -> Workflow {
        self.workflow.clone()
    }

    /// Returns a reference to the current workflow.
    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Returns the mutation revision.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Creates a node with the default configuration for its kind and
    /// selects it.
    pub fn create_node(
        &mut self,
        kind: NodeKind,
        position: Position,
        label: impl Into<String>,
    ) -> NodeId {
        let id = NodeId::generate(&kind, self.sequence);
        self.sequence += 1;

        let node = Node::new(id.clone(), kind, position, label);
        self.workflow.nodes.push(node);
        self.revision += 1;

        self.select(Some(&id));
        id
    }

    /// Shallow-merges a JSON patch into a node's configuration.
    ///
    /// Unknown node ids and unrepresentable patches are logged and
    /// ignored; the existing configuration is never partially applied.
    pub fn update_node_config(&mut self, id: &NodeId, patch: Map<String, Value>) {
        let Some(node) = self.workflow.node_mut(id) else {
            tracing::warn!(target: TRACING_TARGET, node_id = %id, "config patch for unknown node");
            return;
        };

        match node.config.apply_patch(patch) {
            Ok(()) => self.revision += 1,
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    node_id = %id,
                    %error,
                    "config patch rejected",
                );
            }
        }
    }

    /// Removes a node and every edge touching it.
    pub fn delete_node(&mut self, id: &NodeId) {
        let before = self.workflow.node_count();
        self.workflow.nodes.retain(|node| node.id != *id);
        if self.workflow.node_count() == before {
            tracing::warn!(target: TRACING_TARGET, node_id = %id, "delete for unknown node");
            return;
        }

        // Cascade so no dangling edge survives the node.
        self.workflow.edges.retain(|edge| !edge.touches(id));
        self.revision += 1;
    }

    /// Connects two nodes, replacing any existing edge between the pair.
    ///
    /// The edge id is derived from the endpoints, so reconnecting the
    /// same pair is idempotent. Returns `None` (logged) when either
    /// endpoint is missing. Self-loops are representable; validation
    /// rejects them later.
    pub fn connect(&mut self, source: &NodeId, target: &NodeId) -> Option<EdgeId> {
        if !self.workflow.contains_node(source) || !self.workflow.contains_node(target) {
            tracing::warn!(
                target: TRACING_TARGET,
                source = %source,
                %target,
                "connect with missing endpoint",
            );
            return None;
        }

        let edge = Edge::new(source.clone(), target.clone());
        let id = edge.id.clone();

        if let Some(existing) = self.workflow.edges.iter_mut().find(|e| e.id == id) {
            *existing = edge;
        } else {
            self.workflow.edges.push(edge);
        }
        self.revision += 1;

        Some(id)
    }

    /// Selects a node, clearing any previous selection; `None` clears
    /// the selection entirely.
    ///
    /// Selection is presentation state: it does not bump the revision.
    pub fn select(&mut self, id: Option<&NodeId>) {
        if let Some(id) = id {
            if !self.workflow.contains_node(id) {
                tracing::warn!(target: TRACING_TARGET, node_id = %id, "select for unknown node");
                return;
            }
        }

        for node in &mut self.workflow.nodes {
            node.selected = Some(&node.id) == id;
        }
    }

    /// Returns the currently selected node, if any.
    pub fn selected_node(&self) -> Option<&Node> {
        self.workflow.nodes.iter().find(|node| node.selected)
    }

    /// Appends an uploaded file's display name to the first knowledge
    /// base node's file list.
    ///
    /// Read-modify-write: previously attached files and their order are
    /// preserved, and duplicates are kept as-is. Returns `false` (logged)
    /// when the workflow has no knowledge base node.
    pub fn attach_file(&mut self, name: impl Into<String>) -> bool {
        let Some(node) = self
            .workflow
            .nodes
            .iter_mut()
            .find(|node| node.kind.is_knowledge_base())
        else {
            tracing::warn!(target: TRACING_TARGET, "file attach without a knowledge base node");
            return false;
        };

        node.config.push_file(name);
        self.revision += 1;
        true
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts the trailing decimal suffix of a node id, if any.
fn numeric_suffix(id: &str) -> Option<u64> {
    let digits = id.rsplit('-').next()?;
    digits.parse().ok()
}
