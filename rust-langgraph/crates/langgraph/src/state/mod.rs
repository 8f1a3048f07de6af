//! State types for graph-based agents.
//!
//! `ConversationState` is the single piece of mutable state an agent loop owns: an
//! append-only message list. `ToolCall` and `ToolResult` are the request/result pair
//! exchanged between the model caller and the tool executor.

pub mod conversation;

pub use conversation::{ConversationState, ToolCall, ToolResult};
