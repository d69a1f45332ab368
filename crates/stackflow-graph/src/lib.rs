#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

pub mod config;
pub mod node;
pub mod registry;
pub mod schema;
pub mod store;
pub mod validate;
pub mod workflow;

#[doc(hidden)]
pub mod prelude;

pub use error::{GraphError, GraphResult};

/// Tracing target for graph operations.
pub const TRACING_TARGET: &str = "stackflow_graph";
