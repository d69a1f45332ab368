//! Session states and action outcomes.

use stackflow_client::{ExecutionResponse, UploadReceipt};

/// Where the session stands with respect to workflow validity.
///
/// `Building` and `Saving` are not states of this machine; they are
/// independent busy-flags on the session that gate individual actions
/// without replacing the validity verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ValidationState {
    /// No validation has run yet.
    #[default]
    Idle,
    /// A validation request is in flight.
    Validating,
    /// The last validation run accepted the workflow.
    Valid,
    /// The last validation run rejected the workflow, or could not be
    /// reached (fail-closed).
    Invalid,
}

impl ValidationState {
    /// Returns whether the workflow is currently known to be valid.
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Outcome of a build request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The workflow revalidated cleanly and is ready for execution.
    Ready,
    /// The workflow is (or turned out to be) invalid.
    Invalid,
    /// A build is already in flight; the request was ignored.
    Busy,
}

/// Outcome of a save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The workflow was persisted.
    Saved,
    /// The backend rejected or never received the save; the in-memory
    /// graph is untouched.
    Failed,
    /// A save is already in flight; the request was ignored.
    Busy,
}

/// Outcome of a chat handoff.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    /// The pipeline answered; the response is passed through
    /// uninterpreted.
    Reply(ExecutionResponse),
    /// The workflow is not valid, so chat is unavailable.
    NotReady,
    /// The execution call failed; the session is unaffected.
    Failed,
}

/// Outcome of a document upload.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    /// The document was stored and its name attached to the knowledge
    /// base node.
    Stored(UploadReceipt),
    /// The upload failed; no node configuration was touched.
    Failed,
}
