//! Mock LLM for tests and offline runs.
//!
//! Returns scripted responses in order (e.g. first a tool call, then a final answer),
//! records every request it receives, and can simulate latency or a service failure.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::llm::{LlmClient, LlmError, LlmResponse};
use crate::message::Message;
use crate::state::ToolCall;

/// Mock LLM: scripted replies, request capture.
///
/// Each `invoke` pops the next scripted reply; once the script is exhausted the
/// fallback reply (plain text, no tool calls) is returned so loops always end.
///
/// **Interaction**: Implements `LlmClient`; used by ThinkNode in tests.
pub struct MockLlm {
    script: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    fallback: LlmResponse,
    requests: Mutex<Vec<Vec<Message>>>,
    delay: Option<Duration>,
}

impl MockLlm {
    /// Build a mock that replays `responses` in order.
    pub fn scripted(responses: Vec<LlmResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into_iter().map(Ok).collect()),
            fallback: LlmResponse::text("Done."),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Build a mock that always answers with `content` and no tool calls.
    pub fn with_no_tool_calls(content: impl Into<String>) -> Self {
        let mut m = Self::scripted(Vec::new());
        m.fallback = LlmResponse::text(content);
        m
    }

    /// Build a mock whose first reply requests `tool_calls` and second reply is `answer`.
    pub fn first_tools_then_answer(tool_calls: Vec<ToolCall>, answer: impl Into<String>) -> Self {
        Self::scripted(vec![
            LlmResponse::with_tool_calls("", tool_calls),
            LlmResponse::text(answer),
        ])
    }

    /// Build a mock whose every call fails with `error`.
    pub fn failing(error: LlmError) -> Self {
        let m = Self::scripted(Vec::new());
        m.push_error(error);
        m
    }

    /// Appends a failure to the script.
    pub fn push_error(&self, error: LlmError) {
        if let Ok(mut s) = self.script.lock() {
            s.push_back(Err(error));
        }
    }

    /// Sleep before answering (for deadline tests).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set the reply used after the script runs out (builder).
    pub fn with_fallback(mut self, fallback: LlmResponse) -> Self {
        self.fallback = fallback;
        self
    }

    /// Every message list received so far, in call order.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        if let Ok(mut r) = self.requests.lock() {
            r.push(messages.to_vec());
        }
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(reply) => reply,
            None => Ok(self.fallback.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_script_then_fallback() {
        let llm = MockLlm::first_tools_then_answer(vec![ToolCall::new("c1", "add", "{}")], "10");
        let first = llm.invoke(&[Message::user("hi")]).await.unwrap();
        assert_eq!(first.tool_calls.len(), 1);
        let second = llm.invoke(&[]).await.unwrap();
        assert_eq!(second.content, "10");
        let third = llm.invoke(&[]).await.unwrap();
        assert_eq!(third.content, "Done.");
        assert!(third.tool_calls.is_empty());
        assert_eq!(llm.call_count(), 3);
        assert_eq!(llm.requests()[0], vec![Message::user("hi")]);
    }

    #[tokio::test]
    async fn failing_returns_error_once() {
        let llm = MockLlm::failing(LlmError::Network("down".into()));
        assert!(llm.invoke(&[]).await.is_err());
        assert!(llm.invoke(&[]).await.is_ok());
    }
}
