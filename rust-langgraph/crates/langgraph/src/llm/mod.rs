//! LLM 客户端：`LlmClient` trait 与实现。
//!
//! - `LlmClient`: one call with the full message history, returns content plus tool calls
//! - `MockLlm`: scripted responses for tests
//! - `ChatOpenAI`: OpenAI-compatible Chat Completions over HTTP (feature `openai`)
//! - `LlmError`: 调用错误枚举

mod error;
mod mock;
#[cfg(feature = "openai")]
mod openai;

pub use error::LlmError;
pub use mock::MockLlm;
#[cfg(feature = "openai")]
pub use openai::{
    resolve_api_key, ChatOpenAI, OpenAiConfig, API_KEY_VARS, DEFAULT_BASE_URL, DEFAULT_MODEL,
};

use async_trait::async_trait;

use crate::message::Message;
use crate::state::ToolCall;

/// Model reply: assistant text and the tool calls it requests (possibly none).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl LlmResponse {
    /// Plain text reply with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Reply requesting the given tool calls.
    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
        }
    }
}

/// Chat model client.
///
/// Receives the whole ordered history (system message first when present) and returns
/// one assistant reply. Implementations do not retry; transport and service failures
/// come back as `LlmError`.
///
/// **Interaction**: Used by ThinkNode; implemented by `MockLlm` and `ChatOpenAI`.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError>;
}

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for std::sync::Arc<T> {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        (**self).invoke(messages).await
    }
}
