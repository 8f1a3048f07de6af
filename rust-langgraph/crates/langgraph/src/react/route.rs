//! Loop controller: routing decisions between the model step and the tool step.
//!
//! Pure functions of the conversation state, wired as conditional-edge routers.

use crate::message::Message;
use crate::state::ConversationState;

/// Where the tool-calling loop goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Call the model again.
    AskModel,
    /// Execute the pending tool calls.
    RunTools,
    /// Stop the session.
    Exit,
}

impl LoopState {
    /// Branch key used in conditional-edge path maps.
    pub fn as_str(self) -> &'static str {
        match self {
            LoopState::AskModel => "ask_model",
            LoopState::RunTools => "run_tools",
            LoopState::Exit => "exit",
        }
    }
}

/// After the model step: `RunTools` iff the latest assistant message requests tools.
pub fn should_continue(state: &ConversationState) -> LoopState {
    match state.last_assistant() {
        Some(Message::Assistant { tool_calls, .. }) if !tool_calls.is_empty() => LoopState::RunTools,
        _ => LoopState::Exit,
    }
}

/// After the tool step: `Exit` once any tool in the session raised `terminate`.
pub fn after_tools(state: &ConversationState) -> LoopState {
    if state.tool_results().any(|r| r.terminate) {
        LoopState::Exit
    } else {
        LoopState::AskModel
    }
}
