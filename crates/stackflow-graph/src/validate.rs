//! Structural validation rules and the validation verdict type.
//!
//! Workflow validation is evaluated by the backend service; this module
//! defines the verdict contract plus the minimum structural rules any
//! conforming validator enforces. The in-memory mock backend used in
//! tests runs exactly these rules.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Reversed};
use serde::{Deserialize, Serialize};

use crate::node::{NodeId, NodeKind};
use crate::workflow::Workflow;

/// Fallback error reported when validation itself cannot be reached.
pub const TRANSPORT_FAILURE_ERROR: &str = "Validation failed";

/// Verdict of a workflow validation run.
///
/// A pure snapshot: each run replaces the previous result wholesale,
/// results are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the workflow may be built and chatted with.
    pub valid: bool,
    /// Human-readable errors, reported verbatim to the user.
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// A valid verdict with no errors.
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// A verdict derived from a list of structural errors: valid exactly
    /// when the list is empty.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// The fail-closed verdict used when validation cannot be reached.
    pub fn transport_failure() -> Self {
        Self {
            valid: false,
            errors: vec![TRANSPORT_FAILURE_ERROR.to_owned()],
        }
    }

    /// Enforces the verdict contract: an invalid result always carries at
    /// least one error, and a valid result carries none.
    pub fn normalized(mut self) -> Self {
        if self.valid {
            self.errors.clear();
        } else if self.errors.is_empty() {
            self.errors.push(TRANSPORT_FAILURE_ERROR.to_owned());
        }
        self
    }
}

/// Runs the minimum structural rules against a workflow.
///
/// Returns the ordered list of rule violations; an empty list means the
/// workflow passes local preflight (the backend may still reject it for
/// reasons of its own).
pub fn preflight(workflow: &Workflow) -> Vec<String> {
    if workflow.nodes.is_empty() {
        return vec!["Workflow must contain at least one node".to_owned()];
    }

    let reaches_output = output_reachability(workflow);
    let mut errors = Vec::new();

    for node in &workflow.nodes {
        if !node.kind.is_known() {
            errors.push(format!(
                "Node {} has unknown type \"{}\"",
                node.id, node.kind
            ));
            continue;
        }

        if node.kind.is_output() {
            if workflow.incoming_count(&node.id) == 0 {
                errors.push(format!(
                    "Output node {} must have at least one incoming edge",
                    node.id
                ));
            }
            continue;
        }

        // A node no edge touches is disconnected, except for query entry
        // points which simply have not been wired up yet.
        if !workflow.is_connected(&node.id) && !node.kind.is_user_query() {
            errors.push(format!("Node {} is not connected to the workflow", node.id));
            continue;
        }

        let feeds_forward =
            workflow.outgoing_count(&node.id) > 0 || reaches_output.contains(&node.id);
        if !feeds_forward {
            errors.push(format!("Node {} must connect toward an Output node", node.id));
        }
    }

    for edge in &workflow.edges {
        if edge.is_self_loop() {
            errors.push(format!(
                "Edge {} connects node {} to itself",
                edge.id, edge.source
            ));
        }
    }

    errors
}

/// Returns the set of nodes with a directed path to some output node.
fn output_reachability(workflow: &Workflow) -> HashSet<NodeId> {
    let mut graph = DiGraph::<&NodeId, ()>::new();
    let mut indices: HashMap<&NodeId, NodeIndex> = HashMap::with_capacity(workflow.node_count());

    for node in &workflow.nodes {
        indices.insert(&node.id, graph.add_node(&node.id));
    }
    for edge in &workflow.edges {
        if let (Some(&source), Some(&target)) =
            (indices.get(&edge.source), indices.get(&edge.target))
        {
            graph.add_edge(source, target, ());
        }
    }

    // Walk backwards from every output node; everything visited can
    // reach an output.
    let reversed = Reversed(&graph);
    let mut reaches = HashSet::new();
    for node in workflow.nodes_of_kind(&NodeKind::Output) {
        let Some(&start) = indices.get(&node.id) else {
            continue;
        };
        let mut bfs = Bfs::new(&reversed, start);
        while let Some(index) = bfs.next(&reversed) {
            reaches.insert(graph[index].clone());
        }
    }

    reaches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Edge, Node, Position};
    use crate::store::GraphStore;

    fn wired_pair() -> (GraphStore, NodeId, NodeId) {
        let mut store = GraphStore::new();
        let query = store.create_node(NodeKind::UserQuery, Position::default(), "User Query");
        let output = store.create_node(NodeKind::Output, Position::default(), "Output");
        store.connect(&query, &output);
        (store, query, output)
    }

    #[test]
    fn test_empty_workflow_invalid() {
        let errors = preflight(&Workflow::new());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("at least one node"));
    }

    #[test]
    fn test_query_wired_to_output_passes() {
        let (store, ..) = wired_pair();
        assert!(preflight(store.workflow()).is_empty());
    }

    #[test]
    fn test_output_requires_incoming_edge() {
        let mut store = GraphStore::new();
        store.create_node(NodeKind::Output, Position::default(), "Output");
        let errors = preflight(store.workflow());
        assert!(errors.iter().any(|e| e.contains("incoming edge")));
    }

    #[test]
    fn test_lone_user_query_must_feed_forward() {
        let mut store = GraphStore::new();
        store.create_node(NodeKind::UserQuery, Position::default(), "User Query");
        let errors = preflight(store.workflow());
        assert!(errors.iter().any(|e| e.contains("toward an Output")));
    }

    #[test]
    fn test_disconnected_engine_invalid() {
        let (mut store, ..) = wired_pair();
        store.create_node(NodeKind::LlmEngine, Position::default(), "LLM Engine");
        let errors = preflight(store.workflow());
        assert!(errors.iter().any(|e| e.contains("not connected")));
    }

    #[test]
    fn test_self_loop_invalid() {
        let (mut store, query, _) = wired_pair();
        store.connect(&query, &query);
        let errors = preflight(store.workflow());
        assert!(errors.iter().any(|e| e.contains("to itself")));
    }

    #[test]
    fn test_unknown_kind_flagged() {
        let mut workflow = Workflow::new();
        workflow.nodes.push(Node::new(
            NodeId::from("rerankEngine-1"),
            NodeKind::Other("rerankEngine".to_owned()),
            Position::default(),
            "Rerank",
        ));
        workflow.nodes.push(Node::new(
            NodeId::from("output-2"),
            NodeKind::Output,
            Position::default(),
            "Output",
        ));
        workflow.edges.push(Edge::new(
            NodeId::from("rerankEngine-1"),
            NodeId::from("output-2"),
        ));

        let errors = preflight(&workflow);
        assert!(errors.iter().any(|e| e.contains("unknown type")));
    }

    #[test]
    fn test_normalized_invalid_always_carries_errors() {
        let result = ValidationResult {
            valid: false,
            errors: Vec::new(),
        }
        .normalized();
        assert!(!result.valid);
        assert_eq!(result.errors, [TRANSPORT_FAILURE_ERROR]);

        let result = ValidationResult {
            valid: true,
            errors: vec!["stale".to_owned()],
        }
        .normalized();
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }
}
