//! Simple chat: each user line is sent alone; nothing is remembered between turns.

use std::sync::Arc;
use std::time::Duration;

use langgraph::{
    AgentError, CompilationError, CompiledStateGraph, ConversationState, LlmClient, StateGraph,
    ThinkNode, END, START,
};
use tracing::warn;

use crate::input::UserInput;

/// Prompt shown before each user turn.
pub const INPUT_PROMPT: &str = "Enter: ";
/// Line that ends the chat loops.
pub const EXIT_WORD: &str = "exit";

/// Single-node graph `START -> chat -> END`; also used by the memory chat.
pub fn chat_graph(
    llm: Box<dyn LlmClient>,
    timeout: Duration,
) -> Result<CompiledStateGraph<ConversationState>, CompilationError> {
    let chat = ThinkNode::new(llm).with_id("chat").with_timeout(timeout);
    let mut graph = StateGraph::<ConversationState>::new();
    graph
        .add_node("chat", Arc::new(chat))
        .add_edge(START, "chat")
        .add_edge("chat", END);
    graph.compile()
}

/// Stateless chat session.
pub struct SimpleChat {
    graph: CompiledStateGraph<ConversationState>,
}

impl SimpleChat {
    pub fn new(llm: Box<dyn LlmClient>, timeout: Duration) -> Result<Self, CompilationError> {
        Ok(Self {
            graph: chat_graph(llm, timeout)?,
        })
    }

    /// One turn: the model sees only `line`.
    pub async fn turn(&self, line: &str) -> Result<String, AgentError> {
        let out = self.graph.invoke(ConversationState::from_user(line)).await?;
        Ok(out.last_assistant_content().to_string())
    }

    /// Reads lines until `exit` or end of input, printing each reply.
    ///
    /// A model-service error is shown and the turn skipped; the loop keeps going.
    pub async fn run(&self, input: &dyn UserInput) -> std::io::Result<usize> {
        let mut turns = 0;
        while let Some(line) = input.read_line(INPUT_PROMPT).await? {
            if line.trim() == EXIT_WORD {
                break;
            }
            match self.turn(&line).await {
                Ok(reply) => {
                    turns += 1;
                    println!("\nAI: {reply}");
                }
                Err(e) => {
                    warn!(error = %e, "chat turn failed");
                    eprintln!("\nError: {e}");
                }
            }
        }
        Ok(turns)
    }
}

#[cfg(test)]
mod tests {
    use langgraph::{Message, MockLlm};

    use super::*;
    use crate::input::ScriptedInput;

    #[tokio::test]
    async fn each_turn_sends_only_current_message() {
        let llm = Arc::new(MockLlm::with_no_tool_calls("hi!"));
        let chat = SimpleChat::new(Box::new(llm.clone()), Duration::from_secs(5)).unwrap();
        let input = ScriptedInput::new(["hello", "my name is Ann", "exit", "never read"]);
        let turns = chat.run(&input).await.unwrap();
        assert_eq!(turns, 2);
        let reqs = llm.requests();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[1], vec![Message::user("my name is Ann")]);
        assert_eq!(input.prompts().len(), 3);
    }
}
