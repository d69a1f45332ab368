//! Session error types.

use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur while opening an editing session.
///
/// Once a session is open, remote failures are converted into session
/// state (fail-closed validation, cleared busy-flags) rather than
/// surfaced as errors; these variants only cover the initial load.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend could not be reached or rejected the request.
    #[error(transparent)]
    Client(#[from] stackflow_client::ClientError),

    /// The persisted workflow is not a representable graph.
    #[error(transparent)]
    Graph(#[from] stackflow_graph::GraphError),
}
