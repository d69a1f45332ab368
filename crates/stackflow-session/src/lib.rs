#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod session;
mod state;

pub use error::{SessionError, SessionResult};
pub use session::StackSession;
pub use state::{BuildOutcome, ChatOutcome, SaveOutcome, UploadOutcome, ValidationState};

/// Tracing target for session operations.
pub const TRACING_TARGET: &str = "stackflow_session";
