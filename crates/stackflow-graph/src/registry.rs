//! Component registry: the fixed catalog of node kinds.

use serde::{Deserialize, Serialize};

use crate::node::NodeKind;

/// Icon identity for a catalog component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    /// Speech bubble, used for query entry.
    MessageSquare,
    /// Database cylinder, used for knowledge bases.
    Database,
    /// Brain, used for language model engines.
    Brain,
    /// Document, used for outputs.
    FileText,
}

/// A catalog entry describing one draggable component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    /// Node kind this component creates.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Display label.
    pub label: &'static str,
    /// Short description shown under the label.
    pub description: &'static str,
    /// Icon identity.
    pub icon: Icon,
}

/// The compiled-in component catalog, in display order.
static CATALOG: [Component; 4] = [
    Component {
        kind: NodeKind::UserQuery,
        label: "User Query",
        description: "Entry point for user queries",
        icon: Icon::MessageSquare,
    },
    Component {
        kind: NodeKind::KnowledgeBase,
        label: "Knowledge Base",
        description: "Document knowledge base",
        icon: Icon::Database,
    },
    Component {
        kind: NodeKind::LlmEngine,
        label: "LLM Engine",
        description: "AI language model",
        icon: Icon::Brain,
    },
    Component {
        kind: NodeKind::Output,
        label: "Output",
        description: "Final response output",
        icon: Icon::FileText,
    },
];

/// Returns the component catalog in display order.
pub fn components() -> &'static [Component] {
    &CATALOG
}

/// Looks up the catalog entry for a node kind.
pub fn component(kind: &NodeKind) -> Option<&'static Component> {
    CATALOG.iter().find(|component| component.kind == *kind)
}
