//! Agent 与执行相关错误类型。
//!
//! - `AgentError`: graph execution error returned by `CompiledStateGraph::invoke`
//! - `ToolSourceError` lives in `tool_source`; `LlmError` lives in `llm`

use thiserror::Error;

use crate::llm::LlmError;

/// Error raised while running a graph.
///
/// Tool failures never show up here: `ActNode` turns them into tool results.
/// Model-service failures do, so the caller can end the session cleanly.
#[derive(Debug, Error)]
pub enum AgentError {
    /// 执行失败，附带原因描述。
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The model service failed (transport, status, parsing or deadline).
    #[error("model service error: {0}")]
    Llm(#[from] LlmError),

    /// The graph ran more node steps than allowed.
    #[error("recursion limit of {0} steps reached without hitting END")]
    RecursionLimit(usize),

    /// A router returned a branch with no target node.
    #[error("no route for branch '{branch}' from node '{from}'")]
    NoRoute { from: String, branch: String },
}
