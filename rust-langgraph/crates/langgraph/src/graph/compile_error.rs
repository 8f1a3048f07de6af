//! Graph compilation error.
//!
//! Returned by `StateGraph::compile` when the edge set does not describe a runnable graph.

use thiserror::Error;

/// Error when compiling a state graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompilationError {
    /// An edge (or a conditional path) references an id that was never added via `add_node`.
    #[error("node not found: {0}")]
    NodeNotFound(String),
    /// No edge leaves `START`, so the graph has no entry point.
    #[error("graph has no entry point: add an edge from START")]
    MissingEntry,
    /// A node id collides with the reserved `START` / `END` names.
    #[error("reserved node id: {0}")]
    ReservedId(String),
}
