//! Node and edge types for workflow graphs.

use std::str::FromStr;

use derive_more::{Debug, Display, From, Into};
use serde::{Deserialize, Serialize};
use strum::EnumString;

use crate::config::NodeConfig;

/// Unique identifier for a node in a workflow graph.
///
/// Node ids are opaque strings on the wire. Fresh ids are generated by the
/// graph store as `{kind}-{sequence}` so that ids stay human-readable and
/// collision-free within a session.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a node ID from the node kind and a sequence number.
    pub fn generate(kind: &NodeKind, sequence: u64) -> Self {
        Self(format!("{kind}-{sequence}"))
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Unique identifier for an edge in a workflow graph.
///
/// Edge ids are derived deterministically from the endpoint pair, so
/// reconnecting the same two nodes reuses the same identity instead of
/// accumulating duplicate edges.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Returns the canonical edge ID for a source/target pair.
    pub fn between(source: &NodeId, target: &NodeId) -> Self {
        Self(format!("{source}->{target}"))
    }

    /// Returns the ID as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The kind of a workflow node.
///
/// The four known kinds form the component catalog. Unknown kinds
/// round-trip through [`NodeKind::Other`] so that a graph persisted by a
/// newer producer still loads; validation flags them instead.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Debug, strum::Display, EnumString)]
#[serde(into = "String", from = "String")]
pub enum NodeKind {
    /// Entry point for user queries.
    #[strum(serialize = "userQuery")]
    UserQuery,
    /// Document knowledge base.
    #[strum(serialize = "knowledgeBase")]
    KnowledgeBase,
    /// AI language model engine.
    #[strum(serialize = "llmEngine")]
    LlmEngine,
    /// Final response output.
    #[strum(serialize = "output")]
    Output,
    /// A node kind this version does not understand.
    #[strum(default, to_string = "{0}")]
    Other(String),
}

impl NodeKind {
    /// Returns whether this is a user query node.
    pub const fn is_user_query(&self) -> bool {
        matches!(self, NodeKind::UserQuery)
    }

    /// Returns whether this is a knowledge base node.
    pub const fn is_knowledge_base(&self) -> bool {
        matches!(self, NodeKind::KnowledgeBase)
    }

    /// Returns whether this is an LLM engine node.
    pub const fn is_llm_engine(&self) -> bool {
        matches!(self, NodeKind::LlmEngine)
    }

    /// Returns whether this is an output node.
    pub const fn is_output(&self) -> bool {
        matches!(self, NodeKind::Output)
    }

    /// Returns whether this kind is part of the known catalog.
    pub const fn is_known(&self) -> bool {
        !matches!(self, NodeKind::Other(_))
    }
}

impl From<String> for NodeKind {
    fn from(value: String) -> Self {
        Self::from_str(&value).unwrap_or(NodeKind::Other(value))
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.to_string()
    }
}

/// A position on the workflow canvas, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Creates a position from coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A single node in a workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// Unique node identifier.
    pub id: NodeId,
    /// Node kind. Immutable after creation.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Display label.
    pub label: String,
    /// Position on the canvas.
    pub position: Position,
    /// Kind-specific configuration.
    pub config: NodeConfig,
    /// Whether this node is currently selected in the editing session.
    #[serde(default, skip_serializing_if = "is_false")]
    pub selected: bool,
}

impl Node {
    /// Creates a node with the default configuration for its kind.
    pub fn new(id: NodeId, kind: NodeKind, position: Position, label: impl Into<String>) -> Self {
        let config = NodeConfig::default_for(&kind);
        Self {
            id,
            kind,
            label: label.into(),
            position,
            config,
            selected: false,
        }
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // The config shape depends on the node kind, so decode it as a raw
        // object first and let the kind pick the schema.
        #[derive(Deserialize)]
        struct Wire {
            id: NodeId,
            #[serde(rename = "type")]
            kind: NodeKind,
            #[serde(default)]
            label: String,
            #[serde(default)]
            position: Position,
            #[serde(default)]
            config: serde_json::Map<String, serde_json::Value>,
            #[serde(default)]
            selected: bool,
        }

        let wire = Wire::deserialize(deserializer)?;
        let config =
            NodeConfig::from_map(&wire.kind, wire.config).map_err(serde::de::Error::custom)?;
        Ok(Self {
            id: wire.id,
            kind: wire.kind,
            label: wire.label,
            position: wire.position,
            config,
            selected: wire.selected,
        })
    }
}

/// A directed edge between two workflow nodes.
///
/// Self-loops are representable by the data model; structural validation
/// rejects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique edge identifier, derived from the endpoint pair.
    pub id: EdgeId,
    /// Source node ID.
    pub source: NodeId,
    /// Target node ID.
    pub target: NodeId,
}

impl Edge {
    /// Creates an edge between two nodes with its canonical ID.
    pub fn new(source: NodeId, target: NodeId) -> Self {
        let id = EdgeId::between(&source, &target);
        Self { id, source, target }
    }

    /// Returns whether this edge touches the given node.
    pub fn touches(&self, id: &NodeId) -> bool {
        self.source == *id || self.target == *id
    }

    /// Returns whether this edge is a self-loop.
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_round_trip() {
        for raw in ["userQuery", "knowledgeBase", "llmEngine", "output"] {
            let kind = NodeKind::from(raw.to_owned());
            assert!(kind.is_known());
            assert_eq!(kind.to_string(), raw);
        }
    }

    #[test]
    fn test_node_kind_unknown_preserved() {
        let kind = NodeKind::from("rerankEngine".to_owned());
        assert!(!kind.is_known());
        assert_eq!(kind.to_string(), "rerankEngine");

        let json = serde_json::to_string(&kind).expect("serialization failed");
        assert_eq!(json, "\"rerankEngine\"");
        let back: NodeKind = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(back, kind);
    }

    #[test]
    fn test_node_id_generate() {
        let id = NodeId::generate(&NodeKind::LlmEngine, 1736968412000);
        assert_eq!(id.as_str(), "llmEngine-1736968412000");
    }

    #[test]
    fn test_edge_id_deterministic() {
        let a = NodeId::from("userQuery-1");
        let b = NodeId::from("output-2");
        assert_eq!(EdgeId::between(&a, &b), EdgeId::between(&a, &b));
        assert_ne!(EdgeId::between(&a, &b), EdgeId::between(&b, &a));
    }

    #[test]
    fn test_node_serializes_kind_as_type() {
        let node = Node::new(
            NodeId::from("userQuery-1"),
            NodeKind::UserQuery,
            Position::new(120.0, 80.0),
            "User Query",
        );
        let value = serde_json::to_value(&node).expect("serialization failed");
        assert_eq!(value["type"], "userQuery");
        assert_eq!(value["position"]["x"], 120.0);
        // Unselected nodes do not carry the flag on the wire.
        assert!(value.get("selected").is_none());
    }
}
