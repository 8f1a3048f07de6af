//! Conversation state and tool types for the tool-calling agent loop.
//!
//! ConversationState holds the ordered message history; ThinkNode appends assistant
//! messages (with their `ToolCall`s) and ActNode appends one `Message::Tool` per call.
//! ToolCall and ToolResult align with OpenAI `tool_calls` / `role: "tool"` messages.

use crate::message::Message;

/// A single tool invocation requested by the model.
///
/// **Interaction**: Written by ThinkNode from the LLM response (id filled in when the
/// service omits one); read by ActNode, which calls `ToolSource::call_tool(name, args)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCall {
    /// Correlation id; copied into `ToolResult::call_id`.
    pub id: String,
    /// Tool name as listed by the ToolSource.
    pub name: String,
    /// Arguments as a JSON object string, exactly as the model produced them.
    pub arguments: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// Result of executing one tool call.
///
/// `terminate` is the structured "finish the session" signal a tool may raise
/// alongside its text (the drafter's `save` does on success). The loop controller
/// reads this flag; it never inspects `content`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolResult {
    /// Id of the ToolCall this result answers.
    pub call_id: String,
    /// Name of the tool that produced it.
    pub name: String,
    /// Result text shown to the model (success report or error description).
    pub content: String,
    /// Set when the tool asks the loop to stop after this batch.
    pub terminate: bool,
}

impl ToolResult {
    pub fn new(call_id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            name: name.into(),
            content: content.into(),
            terminate: false,
        }
    }

    /// Marks this result as terminating the loop.
    pub fn terminating(mut self) -> Self {
        self.terminate = true;
        self
    }
}

/// Ordered, append-only message history of one session.
///
/// Satisfies `Clone + Send + Sync + 'static` for use with `Node<ConversationState>`
/// and `StateGraph<ConversationState>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    pub messages: Vec<Message>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State seeded with a single user message.
    pub fn from_user(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(content)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Latest assistant message, skipping any tool results after it.
    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_assistant())
    }

    /// Content of the latest assistant message, or "" when there is none.
    pub fn last_assistant_content(&self) -> &str {
        self.last_assistant().map(Message::content).unwrap_or("")
    }

    /// Tool calls carried by the most recent message when it is an assistant message.
    ///
    /// Empty when the last message is anything else (including a tool result).
    pub fn pending_tool_calls(&self) -> &[ToolCall] {
        self.last().map(Message::tool_calls).unwrap_or(&[])
    }

    /// Every tool result recorded in this session, oldest first.
    pub fn tool_results(&self) -> impl Iterator<Item = &ToolResult> {
        self.messages.iter().filter_map(|m| match m {
            Message::Tool(r) => Some(r),
            _ => None,
        })
    }

    /// Tool results appended after the latest assistant message.
    pub fn latest_tool_results(&self) -> Vec<&ToolResult> {
        let start = self
            .messages
            .iter()
            .rposition(Message::is_assistant)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.messages[start..]
            .iter()
            .filter_map(|m| match m {
                Message::Tool(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    /// Number of assistant turns so far; used to derive unique tool call ids.
    pub fn assistant_turns(&self) -> usize {
        self.messages.iter().filter(|m| m.is_assistant()).count()
    }
}
