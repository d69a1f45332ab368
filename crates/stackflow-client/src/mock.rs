//! In-memory mock backend for tests.
//!
//! Persists stacks in a process-local table and validates workflows with
//! the structural preflight rules from `stackflow-graph`, so editing
//! sessions can be exercised end to end without a running service. Call
//! counters and an injectable transport failure support re-entrancy and
//! fail-closed assertions.

use std::collections::HashMap;
use std::sync::Mutex;

use jiff::Timestamp;

use stackflow_graph::validate::{self, ValidationResult};
use stackflow_graph::workflow::Workflow;

use crate::error::{ClientError, ClientResult};
use crate::types::{
    ChatRecord, ExecutionRequest, ExecutionResponse, NewStack, Stack, StackId, StackPatch,
    UploadReceipt,
};
use crate::StackBackend;

/// Per-operation call counts observed by the mock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// Workflow validation requests.
    pub validate: usize,
    /// Stack updates (saves).
    pub update: usize,
    /// Pipeline executions.
    pub execute: usize,
    /// Document uploads.
    pub upload: usize,
}

#[derive(Debug, Default)]
struct MockState {
    stacks: HashMap<i64, Stack>,
    next_stack_id: i64,
    next_document_id: i64,
    chat_logs: Vec<ChatRecord>,
    fail_transport: bool,
    calls: CallCounts,
}

/// In-memory [`StackBackend`] implementation.
#[derive(Debug, Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    /// Creates an empty mock backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock backend seeded with one stack, returning its id.
    pub fn with_stack(name: &str) -> (Self, StackId) {
        let backend = Self::new();
        let id = {
            let mut state = backend.state.lock().expect("mock state poisoned");
            state.insert_stack(name.to_owned(), None)
        };
        (backend, id)
    }

    /// Makes every subsequent call fail with a transport error when set.
    pub fn set_fail_transport(&self, fail: bool) {
        self.state.lock().expect("mock state poisoned").fail_transport = fail;
    }

    /// Returns the call counts observed so far.
    pub fn calls(&self) -> CallCounts {
        self.state.lock().expect("mock state poisoned").calls
    }

    fn checked(&self) -> ClientResult<std::sync::MutexGuard<'_, MockState>> {
        let state = self.state.lock().expect("mock state poisoned");
        if state.fail_transport {
            return Err(ClientError::Unavailable("injected transport failure".into()));
        }
        Ok(state)
    }
}

impl MockState {
    fn insert_stack(&mut self, name: String, workflow: Option<Workflow>) -> StackId {
        self.next_stack_id += 1;
        let id = StackId::new(self.next_stack_id);
        let now = Timestamp::now();
        self.stacks.insert(
            self.next_stack_id,
            Stack {
                id,
                name,
                description: None,
                workflow_config: workflow,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    fn stack_mut(&mut self, id: StackId) -> ClientResult<&mut Stack> {
        self.stacks.get_mut(&id.get()).ok_or(ClientError::Status {
            status: 404,
            message: "Stack not found".to_owned(),
        })
    }
}

#[async_trait::async_trait]
impl StackBackend for MockBackend {
    async fn create_stack(&self, stack: NewStack) -> ClientResult<Stack> {
        let mut state = self.checked()?;
        let id = state.insert_stack(stack.name, None);
        if let Some(description) = stack.description {
            state.stack_mut(id)?.description = Some(description);
        }
        Ok(state.stacks[&id.get()].clone())
    }

    async fn list_stacks(&self) -> ClientResult<Vec<Stack>> {
        let state = self.checked()?;
        let mut stacks: Vec<_> = state.stacks.values().cloned().collect();
        stacks.sort_by_key(|stack| stack.id.get());
        Ok(stacks)
    }

    async fn get_stack(&self, id: StackId) -> ClientResult<Stack> {
        let mut state = self.checked()?;
        Ok(state.stack_mut(id)?.clone())
    }

    async fn update_stack(&self, id: StackId, patch: StackPatch) -> ClientResult<Stack> {
        let mut state = self.checked()?;
        state.calls.update += 1;

        let stack = state.stack_mut(id)?;
        if let Some(name) = patch.name {
            stack.name = name;
        }
        if let Some(description) = patch.description {
            stack.description = Some(description);
        }
        if let Some(workflow) = patch.workflow_config {
            stack.workflow_config = Some(workflow);
        }
        stack.updated_at = Timestamp::now();
        Ok(stack.clone())
    }

    async fn delete_stack(&self, id: StackId) -> ClientResult<()> {
        let mut state = self.checked()?;
        state.stacks.remove(&id.get()).ok_or(ClientError::Status {
            status: 404,
            message: "Stack not found".to_owned(),
        })?;
        Ok(())
    }

    async fn validate_workflow(&self, workflow: &Workflow) -> ClientResult<ValidationResult> {
        let mut state = self.checked()?;
        state.calls.validate += 1;
        Ok(ValidationResult::from_errors(validate::preflight(workflow)))
    }

    async fn execute_workflow(&self, request: ExecutionRequest) -> ClientResult<ExecutionResponse> {
        let mut state = self.checked()?;
        state.calls.execute += 1;

        let stack = state.stack_mut(request.stack_id)?;
        if stack.workflow_config.is_none() {
            return Err(ClientError::Status {
                status: 400,
                message: "Stack has no workflow configuration".to_owned(),
            });
        }

        let response = format!("echo: {}", request.query);
        let record_id = state.chat_logs.len() as i64 + 1;
        state.chat_logs.push(ChatRecord {
            id: record_id,
            stack_id: request.stack_id,
            user_query: request.query,
            ai_response: response.clone(),
            created_at: Timestamp::now(),
        });

        Ok(ExecutionResponse {
            success: true,
            result: Some(response),
            error: None,
        })
    }

    async fn upload_document(
        &self,
        filename: &str,
        _content: Vec<u8>,
        _stack_id: Option<StackId>,
    ) -> ClientResult<UploadReceipt> {
        let mut state = self.checked()?;
        state.calls.upload += 1;
        state.next_document_id += 1;

        Ok(UploadReceipt {
            message: format!("Document {filename} uploaded and processed successfully"),
            document_id: state.next_document_id,
            chunks_created: 1,
        })
    }

    async fn chat_history(&self, id: StackId) -> ClientResult<Vec<ChatRecord>> {
        let state = self.checked()?;
        let mut records: Vec<_> = state
            .chat_logs
            .iter()
            .filter(|record| record.stack_id == id)
            .cloned()
            .collect();
        records.reverse();
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use stackflow_graph::node::{NodeKind, Position};
    use stackflow_graph::store::GraphStore;

    use super::*;

    fn valid_workflow() -> Workflow {
        let mut store = GraphStore::new();
        let query = store.create_node(NodeKind::UserQuery, Position::default(), "User Query");
        let output = store.create_node(NodeKind::Output, Position::default(), "Output");
        store.connect(&query, &output);
        store.snapshot()
    }

    #[tokio::test]
    async fn test_validate_runs_preflight() {
        let backend = MockBackend::new();

        let verdict = backend
            .validate_workflow(&Workflow::new())
            .await
            .expect("validate failed");
        assert!(!verdict.valid);
        assert!(verdict.errors[0].contains("at least one node"));

        let verdict = backend
            .validate_workflow(&valid_workflow())
            .await
            .expect("validate failed");
        assert!(verdict.valid);
        assert!(verdict.errors.is_empty());
    }

    #[tokio::test]
    async fn test_fail_transport_rejects_everything() {
        let (backend, id) = MockBackend::with_stack("Support Bot");
        backend.set_fail_transport(true);

        let error = backend.get_stack(id).await.expect_err("expected failure");
        assert!(error.is_transport());
    }

    #[tokio::test]
    async fn test_update_persists_workflow() {
        let (backend, id) = MockBackend::with_stack("Support Bot");
        backend
            .update_stack(id, StackPatch::workflow(valid_workflow()))
            .await
            .expect("update failed");

        let stack = backend.get_stack(id).await.expect("get failed");
        assert!(stack.workflow_config.is_some());
        assert_eq!(backend.calls().update, 1);
    }

    #[tokio::test]
    async fn test_execute_logs_chat_history() {
        let (backend, id) = MockBackend::with_stack("Support Bot");
        backend
            .update_stack(id, StackPatch::workflow(valid_workflow()))
            .await
            .expect("update failed");

        backend
            .execute_workflow(ExecutionRequest {
                stack_id: id,
                query: "hello".to_owned(),
            })
            .await
            .expect("execute failed");

        let history = backend.chat_history(id).await.expect("history failed");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_query, "hello");
    }
}
