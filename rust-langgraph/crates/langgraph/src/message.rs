//! Message types for conversation state.
//!
//! Aligns with LangGraph/LangChain: System (usually first in the list), User (human),
//! Assistant (AI, optionally carrying tool calls) and Tool (one result per tool call).
//! Messages are never edited once built; `ConversationState` only appends them.

use crate::state::{ToolCall, ToolResult};

/// Role tag of a message, used for logging and wire conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// A single message in the conversation.
///
/// `Assistant` carries the tool invocation requests of that turn (possibly none);
/// `Tool` carries the result of exactly one request, correlated by `ToolResult::call_id`.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// System prompt; typically placed first in the message list.
    System(String),
    /// User input.
    User(String),
    /// Model reply, with zero or more tool invocation requests.
    Assistant {
        content: String,
        tool_calls: Vec<ToolCall>,
    },
    /// Result of one tool call.
    Tool(ToolResult),
}

impl Message {
    /// Builds a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    /// Builds a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    /// Builds an assistant message without tool calls.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Builds an assistant message that requests tool calls.
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    /// Builds a tool-result message.
    pub fn tool(result: ToolResult) -> Self {
        Self::Tool(result)
    }

    pub fn role(&self) -> Role {
        match self {
            Message::System(_) => Role::System,
            Message::User(_) => Role::User,
            Message::Assistant { .. } => Role::Assistant,
            Message::Tool(_) => Role::Tool,
        }
    }

    /// Text content regardless of role.
    pub fn content(&self) -> &str {
        match self {
            Message::System(s) | Message::User(s) => s,
            Message::Assistant { content, .. } => content,
            Message::Tool(r) => &r.content,
        }
    }

    /// Tool calls of an assistant message; empty for every other role.
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Message::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    pub fn is_assistant(&self) -> bool {
        matches!(self, Message::Assistant { .. })
    }
}
