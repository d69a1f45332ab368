//! The editing session for one stack.

use std::sync::Arc;

use stackflow_client::{ExecutionRequest, StackBackend, StackId, StackPatch};
use stackflow_graph::node::NodeId;
use stackflow_graph::store::GraphStore;
use stackflow_graph::validate::ValidationResult;

use crate::TRACING_TARGET;
use crate::error::SessionResult;
use crate::state::{BuildOutcome, ChatOutcome, SaveOutcome, UploadOutcome, ValidationState};

/// An editing session for one stack's workflow.
///
/// Owns the graph store exclusively for the session's lifetime and
/// sequences load → edit → validate → build/save/chat. All remote calls
/// are made through the injected [`StackBackend`]; their failures become
/// session state, never lost graphs.
///
/// Validation is not freshness-guaranteed: a verdict is applied when it
/// arrives even if the graph changed after the request was sent. The
/// next committed mutation batch triggers a fresh run.
pub struct StackSession {
    stack_id: StackId,
    stack_name: String,
    store: GraphStore,
    backend: Arc<dyn StackBackend>,
    state: ValidationState,
    result: ValidationResult,
    building: bool,
    saving: bool,
}

impl std::fmt::Debug for StackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackSession")
            .field("stack_id", &self.stack_id)
            .field("state", &self.state)
            .field("building", &self.building)
            .field("saving", &self.saving)
            .finish_non_exhaustive()
    }
}

impl StackSession {
    /// Opens a session by loading a stack from the backend.
    ///
    /// A stack without a persisted workflow starts with an empty graph.
    /// A non-empty workflow is validated immediately after hydration.
    pub async fn load(backend: Arc<dyn StackBackend>, stack_id: StackId) -> SessionResult<Self> {
        let stack = backend.get_stack(stack_id).await?;

        let mut store = GraphStore::new();
        if let Some(workflow) = stack.workflow_config {
            store.hydrate(workflow)?;
        }

        let mut session = Self {
            stack_id,
            stack_name: stack.name,
            store,
            backend,
            state: ValidationState::Idle,
            result: ValidationResult::default(),
            building: false,
            saving: false,
        };

        if !session.store.workflow().is_empty() {
            session.revalidate().await;
        }
        Ok(session)
    }

    /// Returns the stack id this session edits.
    pub fn stack_id(&self) -> StackId {
        self.stack_id
    }

    /// Returns the stack's display name.
    pub fn stack_name(&self) -> &str {
        &self.stack_name
    }

    /// Returns the graph store for read access.
    pub fn graph(&self) -> &GraphStore {
        &self.store
    }

    /// Returns the current validation state.
    pub fn state(&self) -> ValidationState {
        self.state
    }

    /// Returns the last validation verdict.
    pub fn validation(&self) -> &ValidationResult {
        &self.result
    }

    /// Returns whether a build is in flight.
    pub fn is_building(&self) -> bool {
        self.building
    }

    /// Returns whether a save is in flight.
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Returns whether the build action is currently available.
    pub fn can_build(&self) -> bool {
        self.state.is_valid() && !self.building
    }

    /// Returns whether the chat action is currently available.
    pub fn can_chat(&self) -> bool {
        self.state.is_valid()
    }

    /// Returns whether the save action is currently available. Saving is
    /// independent of validity: a work-in-progress graph can be saved.
    pub fn can_save(&self) -> bool {
        !self.saving
    }

    /// Applies a batch of graph mutations, then revalidates if the batch
    /// changed anything and the graph is non-empty.
    ///
    /// This is the one place validation gets triggered by edits;
    /// selection-only changes never count as mutations.
    pub async fn apply<F>(&mut self, mutate: F)
    where
        F: FnOnce(&mut GraphStore),
    {
        let before = self.store.revision();
        mutate(&mut self.store);

        if self.store.revision() != before && !self.store.workflow().is_empty() {
            self.revalidate().await;
        }
    }

    /// Changes the node selection without triggering validation.
    pub fn select(&mut self, id: Option<&NodeId>) {
        self.store.select(id);
    }

    /// Validates the full current graph against the backend.
    ///
    /// The previous verdict is replaced wholesale. A transport or
    /// service failure fails closed: the session becomes `Invalid` with
    /// a reported error, never silently "valid".
    pub async fn revalidate(&mut self) {
        self.state = ValidationState::Validating;
        let workflow = self.store.snapshot();

        match self.backend.validate_workflow(&workflow).await {
            Ok(result) => {
                let result = result.normalized();
                self.state = if result.valid {
                    ValidationState::Valid
                } else {
                    ValidationState::Invalid
                };
                self.result = result;
            }
            Err(error) => {
                tracing::warn!(target: TRACING_TARGET, %error, "validation request failed");
                self.state = ValidationState::Invalid;
                self.result = ValidationResult::transport_failure();
            }
        }
    }

    /// Builds the stack: revalidates defensively and reports whether the
    /// workflow is ready for execution.
    ///
    /// No-op while a build is already in flight. The busy-flag is
    /// cleared on every exit path.
    pub async fn build(&mut self) -> BuildOutcome {
        if self.building {
            tracing::debug!(target: TRACING_TARGET, "build already in flight");
            return BuildOutcome::Busy;
        }
        if !self.state.is_valid() {
            return BuildOutcome::Invalid;
        }

        self.building = true;
        self.revalidate().await;
        let outcome = if self.state.is_valid() {
            BuildOutcome::Ready
        } else {
            BuildOutcome::Invalid
        };
        self.building = false;

        outcome
    }

    /// Persists the full current graph.
    ///
    /// Independent of validity and of any in-flight build. No-op while a
    /// save is already in flight; a failed save clears the busy-flag and
    /// leaves the in-memory graph untouched.
    pub async fn save(&mut self) -> SaveOutcome {
        if self.saving {
            tracing::debug!(target: TRACING_TARGET, "save already in flight");
            return SaveOutcome::Busy;
        }

        self.saving = true;
        let patch = StackPatch::workflow(self.store.snapshot());
        let outcome = match self.backend.update_stack(self.stack_id, patch).await {
            Ok(_) => SaveOutcome::Saved,
            Err(error) => {
                tracing::warn!(target: TRACING_TARGET, %error, "save failed");
                SaveOutcome::Failed
            }
        };
        self.saving = false;

        outcome
    }

    /// Hands a chat input off to pipeline execution for this stack.
    ///
    /// Gated on validity; the response is returned uninterpreted.
    pub async fn chat(&mut self, input: &str) -> ChatOutcome {
        if !self.can_chat() {
            return ChatOutcome::NotReady;
        }

        let request = ExecutionRequest {
            stack_id: self.stack_id,
            query: input.to_owned(),
        };
        match self.backend.execute_workflow(request).await {
            Ok(response) => ChatOutcome::Reply(response),
            Err(error) => {
                tracing::warn!(target: TRACING_TARGET, %error, "chat execution failed");
                ChatOutcome::Failed
            }
        }
    }

    /// Uploads a document and attaches its display name to the
    /// workflow's knowledge base node.
    ///
    /// An upload failure leaves every node configuration untouched.
    pub async fn upload_file(&mut self, filename: &str, content: Vec<u8>) -> UploadOutcome {
        let receipt = match self
            .backend
            .upload_document(filename, content, Some(self.stack_id))
            .await
        {
            Ok(receipt) => receipt,
            Err(error) => {
                tracing::warn!(target: TRACING_TARGET, %error, filename, "upload failed");
                return UploadOutcome::Failed;
            }
        };

        let before = self.store.revision();
        self.store.attach_file(filename);
        if self.store.revision() != before && !self.store.workflow().is_empty() {
            self.revalidate().await;
        }

        UploadOutcome::Stored(receipt)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use stackflow_client::{MockBackend, NewStack};
    use stackflow_graph::node::{NodeKind, Position};
    use stackflow_graph::validate::TRANSPORT_FAILURE_ERROR;
    use stackflow_graph::workflow::Workflow;

    use super::*;

    async fn open_session() -> (Arc<MockBackend>, StackSession) {
        let (backend, id) = MockBackend::with_stack("Support Bot");
        let backend = Arc::new(backend);
        let session = StackSession::load(backend.clone(), id)
            .await
            .expect("load failed");
        (backend, session)
    }

    async fn wire_valid_pair(session: &mut StackSession) {
        session
            .apply(|store| {
                let query = store.create_node(NodeKind::UserQuery, Position::default(), "User Query");
                let output = store.create_node(NodeKind::Output, Position::default(), "Output");
                store.connect(&query, &output);
            })
            .await;
    }

    #[tokio::test]
    async fn test_load_without_workflow_starts_empty_and_idle() {
        let (backend, session) = open_session().await;
        assert!(session.graph().workflow().is_empty());
        assert_eq!(session.state(), ValidationState::Idle);
        assert_eq!(backend.calls().validate, 0);
    }

    #[tokio::test]
    async fn test_mutation_batch_triggers_one_validation() {
        let (backend, mut session) = open_session().await;
        wire_valid_pair(&mut session).await;

        assert_eq!(backend.calls().validate, 1);
        assert_eq!(session.state(), ValidationState::Valid);
        assert!(session.can_build());
        assert!(session.can_chat());
    }

    #[tokio::test]
    async fn test_invalid_graph_reports_errors() {
        let (_, mut session) = open_session().await;
        session
            .apply(|store| {
                store.create_node(NodeKind::Output, Position::default(), "Output");
            })
            .await;

        assert_eq!(session.state(), ValidationState::Invalid);
        assert!(!session.validation().errors.is_empty());
        assert!(!session.can_build());
        assert!(!session.can_chat());
        // An invalid graph can still be saved as work in progress.
        assert!(session.can_save());
    }

    #[tokio::test]
    async fn test_selection_change_does_not_revalidate() {
        let (backend, mut session) = open_session().await;
        wire_valid_pair(&mut session).await;
        let validations = backend.calls().validate;

        session.select(None);
        session.apply(|store| store.select(None)).await;

        assert_eq!(backend.calls().validate, validations);
    }

    #[tokio::test]
    async fn test_validation_fails_closed_on_transport_error() {
        let (backend, mut session) = open_session().await;
        wire_valid_pair(&mut session).await;
        assert_eq!(session.state(), ValidationState::Valid);

        backend.set_fail_transport(true);
        session.revalidate().await;

        assert_eq!(session.state(), ValidationState::Invalid);
        assert_eq!(session.validation().errors, [TRANSPORT_FAILURE_ERROR]);
    }

    #[tokio::test]
    async fn test_build_revalidates_defensively() {
        let (backend, mut session) = open_session().await;
        wire_valid_pair(&mut session).await;
        let validations = backend.calls().validate;

        let outcome = session.build().await;

        assert_eq!(outcome, BuildOutcome::Ready);
        assert_eq!(backend.calls().validate, validations + 1);
        assert!(!session.is_building());
    }

    #[tokio::test]
    async fn test_build_unavailable_while_invalid() {
        let (_, mut session) = open_session().await;
        assert_eq!(session.build().await, BuildOutcome::Invalid);
    }

    #[tokio::test]
    async fn test_build_failure_clears_flag_and_turns_invalid() {
        let (backend, mut session) = open_session().await;
        wire_valid_pair(&mut session).await;

        backend.set_fail_transport(true);
        let outcome = session.build().await;

        assert_eq!(outcome, BuildOutcome::Invalid);
        assert_eq!(session.state(), ValidationState::Invalid);
        assert!(!session.is_building());
    }

    #[tokio::test]
    async fn test_save_persists_full_graph() {
        let (backend, mut session) = open_session().await;
        wire_valid_pair(&mut session).await;

        assert_eq!(session.save().await, SaveOutcome::Saved);

        let stack = backend
            .get_stack(session.stack_id())
            .await
            .expect("get failed");
        let workflow = stack.workflow_config.expect("workflow missing");
        assert_eq!(workflow.node_count(), 2);
        assert_eq!(workflow.edge_count(), 1);
    }

    #[tokio::test]
    async fn test_save_reentry_is_noop() {
        let (backend, mut session) = open_session().await;
        wire_valid_pair(&mut session).await;

        session.saving = true;
        assert_eq!(session.save().await, SaveOutcome::Busy);
        assert_eq!(backend.calls().update, 0);

        session.saving = false;
        assert_eq!(session.save().await, SaveOutcome::Saved);
        assert_eq!(backend.calls().update, 1);
    }

    #[tokio::test]
    async fn test_save_failure_clears_flag_and_keeps_graph() {
        let (backend, mut session) = open_session().await;
        wire_valid_pair(&mut session).await;

        backend.set_fail_transport(true);
        assert_eq!(session.save().await, SaveOutcome::Failed);
        assert!(!session.is_saving());
        assert_eq!(session.graph().workflow().node_count(), 2);
    }

    #[tokio::test]
    async fn test_chat_gated_on_validity() {
        let (_, mut session) = open_session().await;
        assert_eq!(session.chat("hello").await, ChatOutcome::NotReady);

        wire_valid_pair(&mut session).await;
        session.save().await;
        let ChatOutcome::Reply(response) = session.chat("hello").await else {
            panic!("expected a reply");
        };
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_upload_appends_file_to_knowledge_base() {
        let (_, mut session) = open_session().await;
        session
            .apply(|store| {
                let query = store.create_node(NodeKind::UserQuery, Position::default(), "User Query");
                let kb =
                    store.create_node(NodeKind::KnowledgeBase, Position::default(), "Knowledge Base");
                let output = store.create_node(NodeKind::Output, Position::default(), "Output");
                store.connect(&query, &kb);
                store.connect(&kb, &output);
                store.attach_file("handbook.pdf");
            })
            .await;

        let outcome = session.upload_file("spec.pdf", b"%PDF-1.4".to_vec()).await;
        assert!(matches!(outcome, UploadOutcome::Stored(_)));

        let workflow = session.graph().workflow();
        let kb = workflow
            .nodes_of_kind(&NodeKind::KnowledgeBase)
            .next()
            .expect("knowledge base missing");
        assert_eq!(
            kb.config.files().expect("files missing"),
            ["handbook.pdf", "spec.pdf"]
        );
    }

    #[tokio::test]
    async fn test_upload_failure_leaves_config_untouched() {
        let (backend, mut session) = open_session().await;
        session
            .apply(|store| {
                store.create_node(NodeKind::KnowledgeBase, Position::default(), "Knowledge Base");
            })
            .await;

        backend.set_fail_transport(true);
        let outcome = session.upload_file("spec.pdf", Vec::new()).await;
        assert_eq!(outcome, UploadOutcome::Failed);

        let workflow = session.graph().workflow();
        assert!(workflow.nodes[0].config.files().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_hydrates_persisted_workflow_and_validates() {
        let (backend, id) = MockBackend::with_stack("Support Bot");
        let backend = Arc::new(backend);

        // Persist a workflow through one session, then reopen.
        let mut session = StackSession::load(backend.clone(), id)
            .await
            .expect("load failed");
        wire_valid_pair(&mut session).await;
        session.save().await;
        drop(session);

        let validations = backend.calls().validate;
        let reopened = StackSession::load(backend.clone(), id)
            .await
            .expect("reload failed");

        assert_eq!(reopened.graph().workflow().node_count(), 2);
        assert_eq!(reopened.state(), ValidationState::Valid);
        assert_eq!(backend.calls().validate, validations + 1);
    }

    #[tokio::test]
    async fn test_delete_cascade_then_revalidate() {
        let (_, mut session) = open_session().await;
        let mut kb_id = None;
        session
            .apply(|store| {
                let query = store.create_node(NodeKind::UserQuery, Position::default(), "User Query");
                let kb =
                    store.create_node(NodeKind::KnowledgeBase, Position::default(), "Knowledge Base");
                let output = store.create_node(NodeKind::Output, Position::default(), "Output");
                store.connect(&query, &kb);
                store.connect(&kb, &output);
                kb_id = Some(kb);
            })
            .await;

        let kb_id = kb_id.expect("node id missing");
        session.apply(|store| store.delete_node(&kb_id)).await;

        let workflow = session.graph().workflow();
        assert_eq!(workflow.node_count(), 2);
        assert_eq!(workflow.edge_count(), 0);
        assert!(!workflow.contains_node(&kb_id));
        // Output lost its only incoming edge, so the verdict flips.
        assert_eq!(session.state(), ValidationState::Invalid);
    }

    #[tokio::test]
    async fn test_config_patch_revalidates_and_merges() {
        let (backend, mut session) = open_session().await;
        let mut llm_id = None;
        session
            .apply(|store| {
                llm_id = Some(store.create_node(NodeKind::LlmEngine, Position::default(), "LLM Engine"));
            })
            .await;
        let llm_id = llm_id.expect("node id missing");
        let validations = backend.calls().validate;

        let patch = match json!({"temperature": 0.3}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        session
            .apply(|store| store.update_node_config(&llm_id, patch))
            .await;

        assert_eq!(backend.calls().validate, validations + 1);
    }

    #[tokio::test]
    async fn test_load_missing_stack_fails() {
        let backend: Arc<MockBackend> = Arc::new(MockBackend::new());
        let result = StackSession::load(backend.clone(), stackflow_client::StackId::new(42)).await;
        assert!(result.is_err());

        // Stacks created through the backend load fine.
        let stack = backend
            .create_stack(NewStack::named("Fresh"))
            .await
            .expect("create failed");
        let session = StackSession::load(backend, stack.id).await.expect("load failed");
        assert!(session.graph().workflow().is_empty());
        assert_eq!(session.graph().workflow(), &Workflow::new());
    }
}
