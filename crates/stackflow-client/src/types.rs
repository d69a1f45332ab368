//! Request and response payloads for the stackflow service API.

use derive_more::{Debug, Display, From, Into};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use stackflow_graph::workflow::Workflow;

/// Unique identifier for a stack.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct StackId(i64);

impl StackId {
    /// Creates a stack ID from a raw value.
    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[inline]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

/// A saved, named workflow owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    /// Unique stack identifier.
    pub id: StackId,
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// The persisted workflow; absent means an empty graph.
    #[serde(default)]
    pub workflow_config: Option<Workflow>,
    /// Creation time.
    pub created_at: Timestamp,
    /// Last update time.
    pub updated_at: Timestamp,
}

/// Payload for creating a stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewStack {
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewStack {
    /// Creates a payload with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update of a stack. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StackPatch {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New workflow, serialized wholesale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_config: Option<Workflow>,
}

impl StackPatch {
    /// Creates a patch that only replaces the workflow.
    pub fn workflow(workflow: Workflow) -> Self {
        Self {
            workflow_config: Some(workflow),
            ..Self::default()
        }
    }
}

/// Request to execute a stack's pipeline against a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Stack whose workflow runs.
    pub stack_id: StackId,
    /// Free-text user query.
    pub query: String,
}

/// Result of a pipeline execution.
///
/// Passed through to the caller uninterpreted; the editing session only
/// gates reachability of the execute call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResponse {
    /// Whether execution completed.
    pub success: bool,
    /// Pipeline output on success.
    #[serde(default)]
    pub result: Option<String>,
    /// Failure detail on error.
    #[serde(default)]
    pub error: Option<String>,
}

/// Acknowledgement for a document upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Human-readable status message.
    pub message: String,
    /// Identifier assigned to the stored document.
    pub document_id: i64,
    /// Number of embedding chunks created during ingestion.
    #[serde(default)]
    pub chunks_created: u64,
}

/// One logged chat exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    /// Record identifier.
    pub id: i64,
    /// Stack the exchange belongs to.
    pub stack_id: StackId,
    /// The user's query.
    pub user_query: String,
    /// The pipeline's response.
    pub ai_response: String,
    /// When the exchange happened.
    pub created_at: Timestamp,
}
