//! Prelude module for convenient imports.
//!
//! ```rust
//! use stackflow_graph::prelude::*;
//! ```

pub use crate::config::NodeConfig;
pub use crate::error::{GraphError, GraphResult};
pub use crate::node::{Edge, EdgeId, Node, NodeId, NodeKind, Position};
pub use crate::registry::{Component, Icon, components};
pub use crate::schema::{FieldKind, FieldSpec, fields_for};
pub use crate::store::GraphStore;
pub use crate::validate::{ValidationResult, preflight};
pub use crate::workflow::Workflow;
