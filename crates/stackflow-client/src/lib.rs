#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

pub mod http;
pub mod mock;
pub mod types;

pub use error::{ClientError, ClientResult};
pub use http::{HttpBackend, HttpConfig};
pub use mock::MockBackend;
pub use types::{
    ChatRecord, ExecutionRequest, ExecutionResponse, NewStack, Stack, StackId, StackPatch,
    UploadReceipt,
};

use stackflow_graph::validate::ValidationResult;
use stackflow_graph::workflow::Workflow;

/// Tracing target for client operations.
pub const TRACING_TARGET: &str = "stackflow_client";

/// The backend collaborators of a workflow editing session.
///
/// One trait covers every remote boundary the session touches: stack
/// persistence, workflow validation, pipeline execution, and document
/// upload. Implementations decide transport; [`HttpBackend`] speaks the
/// stackflow service API and [`MockBackend`] keeps everything in memory.
#[async_trait::async_trait]
pub trait StackBackend: Send + Sync {
    /// Creates a stack with an empty workflow.
    async fn create_stack(&self, stack: NewStack) -> ClientResult<Stack>;

    /// Lists all stacks.
    async fn list_stacks(&self) -> ClientResult<Vec<Stack>>;

    /// Loads one stack, including its persisted workflow if any.
    async fn get_stack(&self, id: StackId) -> ClientResult<Stack>;

    /// Applies a partial update to a stack. Saving a workflow is an
    /// update carrying `workflow_config`.
    async fn update_stack(&self, id: StackId, patch: StackPatch) -> ClientResult<Stack>;

    /// Deletes a stack.
    async fn delete_stack(&self, id: StackId) -> ClientResult<()>;

    /// Validates a workflow. The payload is always the full graph, never
    /// a diff.
    async fn validate_workflow(&self, workflow: &Workflow) -> ClientResult<ValidationResult>;

    /// Executes a stack's pipeline against a query.
    async fn execute_workflow(&self, request: ExecutionRequest) -> ClientResult<ExecutionResponse>;

    /// Uploads a document, optionally associating it with a stack.
    async fn upload_document(
        &self,
        filename: &str,
        content: Vec<u8>,
        stack_id: Option<StackId>,
    ) -> ClientResult<UploadReceipt>;

    /// Returns a stack's chat transcript, newest first.
    async fn chat_history(&self, id: StackId) -> ClientResult<Vec<ChatRecord>>;
}
