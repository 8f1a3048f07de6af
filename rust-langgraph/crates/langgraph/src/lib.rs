//! LangGraph-style tool-calling agents in Rust: state-in, state-out.
//!
//! A `StateGraph<S>` of `Node<S>`s with direct and conditional edges; `ThinkNode` calls the
//! model, `ActNode` runs tools from a `ToolSource`, and `react::{should_continue, after_tools}`
//! route between them. The conversation state is an append-only `Vec<Message>`.

pub mod error;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod message;
pub mod react;
pub mod state;
pub mod tool_source;

pub use error::AgentError;
pub use graph::{CompilationError, CompiledStateGraph, Next, Node, StateGraph, END, START};
pub use llm::{LlmClient, LlmError, LlmResponse, MockLlm};
#[cfg(feature = "openai")]
pub use llm::{ChatOpenAI, OpenAiConfig};
pub use message::Message;
pub use react::{
    after_tools, build_tool_agent, should_continue, ActNode, LoopState, SystemPrompt, ThinkNode,
};
pub use state::{ConversationState, ToolCall, ToolResult};
pub use tool_source::{
    MockToolSource, ParamKind, ToolCallContent, ToolParam, ToolSet, ToolSource, ToolSourceError,
    ToolSpec, TypedToolSource,
};
