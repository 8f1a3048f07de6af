//! Think node: read messages, call LLM, append the assistant message with its tool calls.
//!
//! ThinkNode holds an LLM client (e.g. MockLlm or ChatOpenAI) and an optional system
//! prompt, implements `Node<ConversationState>`; run sends the system prompt plus the
//! whole history, then appends one `Message::Assistant`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::{LlmClient, LlmError};
use crate::message::Message;
use crate::state::ConversationState;

/// Default deadline for one model call.
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(60);

/// System prompt source for ThinkNode.
#[derive(Clone, Default)]
pub enum SystemPrompt {
    #[default]
    None,
    Static(String),
    /// Evaluated before every model call (e.g. to embed the current document).
    Dynamic(Arc<dyn Fn() -> String + Send + Sync>),
}

impl SystemPrompt {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        SystemPrompt::Dynamic(Arc::new(f))
    }

    fn render(&self) -> Option<String> {
        match self {
            SystemPrompt::None => None,
            SystemPrompt::Static(s) => Some(s.clone()),
            SystemPrompt::Dynamic(f) => Some(f()),
        }
    }
}

/// Think node: one step that produces the assistant message and its tool calls.
///
/// Every call resends the full history, so a session of n turns costs O(n²) in
/// transmitted messages. Nothing is truncated or summarized.
///
/// Tool calls the service returns without an id get `call_<turn>_<index>`, so each
/// `ToolResult` can be correlated with its request.
///
/// **Interaction**: Implements `Node<ConversationState>`; used by StateGraph. Consumes
/// `LlmClient`; `LlmError` (including the deadline) propagates as `AgentError::Llm`.
pub struct ThinkNode {
    id: String,
    llm: Box<dyn LlmClient>,
    system_prompt: SystemPrompt,
    timeout: Duration,
}

impl ThinkNode {
    /// Builds a Think node with the given LLM client, id `"agent"`.
    pub fn new(llm: Box<dyn LlmClient>) -> Self {
        Self {
            id: "agent".to_string(),
            llm,
            system_prompt: SystemPrompt::None,
            timeout: DEFAULT_LLM_TIMEOUT,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: SystemPrompt) -> Self {
        self.system_prompt = prompt;
        self
    }

    /// Deadline for each model call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Calls the model once and appends its reply to `state`.
    pub async fn think(&self, mut state: ConversationState) -> Result<ConversationState, AgentError> {
        let mut request = Vec::with_capacity(state.len() + 1);
        if let Some(system) = self.system_prompt.render() {
            request.push(Message::system(system));
        }
        request.extend(state.messages.iter().cloned());

        debug!(node = %self.id, messages = request.len(), "calling model");
        let response = match tokio::time::timeout(self.timeout, self.llm.invoke(&request)).await {
            Ok(r) => r?,
            Err(_) => {
                warn!(node = %self.id, timeout_ms = self.timeout.as_millis() as u64, "model call timed out");
                return Err(LlmError::Timeout(self.timeout.as_millis() as u64).into());
            }
        };

        let turn = state.assistant_turns() + 1;
        let tool_calls = response
            .tool_calls
            .into_iter()
            .enumerate()
            .map(|(i, mut tc)| {
                if tc.id.trim().is_empty() {
                    tc.id = format!("call_{turn}_{i}");
                }
                tc
            })
            .collect::<Vec<_>>();
        debug!(node = %self.id, tool_calls = tool_calls.len(), "model replied");
        state.push(Message::assistant_with_tools(response.content, tool_calls));
        Ok(state)
    }
}

#[async_trait]
impl Node<ConversationState> for ThinkNode {
    fn id(&self) -> &str {
        &self.id
    }

    /// Returns Next::Continue so the outgoing edge (usually `should_continue`) decides.
    async fn run(&self, state: ConversationState) -> Result<(ConversationState, Next), AgentError> {
        let state = self.think(state).await?;
        Ok((state, Next::Continue))
    }
}
