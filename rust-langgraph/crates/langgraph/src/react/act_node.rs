//! Act node: run the tool calls of the latest assistant message, append one result each.
//!
//! ActNode holds a ToolSource, implements `Node<ConversationState>`; run reads
//! `pending_tool_calls()`, calls `call_tool(name, args)` for each in order, and appends
//! one `Message::Tool` per call. Tool failures are recovered into result text.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::message::Message;
use crate::state::{ConversationState, ToolCall, ToolResult};
use crate::tool_source::{ToolCallContent, ToolSource, ToolSourceError};

/// Result text for a call naming a tool the source does not have.
pub const UNKNOWN_TOOL_MESSAGE: &str =
    "Incorrect Tool Name, Please Retry and Select tool from List of Available tools.";

/// Act node: one step that executes tool calls and produces tool results.
///
/// Calls run sequentially, in request order. Each call yields exactly one
/// `ToolResult` carrying the request's id and name, whatever happened:
/// unknown names, malformed arguments and tool failures all become result text the
/// model can react to. With no pending calls the node leaves the state untouched.
///
/// **Interaction**: Implements `Node<ConversationState>`; used by StateGraph. Consumes
/// `ToolSource` (e.g. `TypedToolSource`, MockToolSource).
pub struct ActNode {
    id: String,
    tools: Box<dyn ToolSource>,
}

impl ActNode {
    /// Builds an Act node with the given tool source, id `"tools"`.
    pub fn new(tools: Box<dyn ToolSource>) -> Self {
        Self {
            id: "tools".to_string(),
            tools,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    fn knows(&self, name: &str) -> bool {
        self.tools.list_tools().iter().any(|t| t.name == name)
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        // Name first: an unknown tool gets the fixed message whatever its arguments.
        let outcome = if !self.knows(&call.name) {
            Err(ToolSourceError::NotFound(call.name.clone()))
        } else {
            match parse_arguments(&call.arguments) {
                Ok(args) => self.tools.call_tool(&call.name, args).await,
                Err(e) => Err(e),
            }
        };
        match outcome {
            Ok(ToolCallContent { text, terminate }) => {
                info!(tool = %call.name, call_id = %call.id, terminate, "tool executed");
                let r = ToolResult::new(&call.id, &call.name, text);
                if terminate {
                    r.terminating()
                } else {
                    r
                }
            }
            Err(ToolSourceError::NotFound(name)) => {
                warn!(tool = %name, "model requested unknown tool");
                ToolResult::new(&call.id, &call.name, UNKNOWN_TOOL_MESSAGE)
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool call failed");
                ToolResult::new(&call.id, &call.name, format!("Error: {e}"))
            }
        }
    }
}

/// Arguments as produced by the model; blank means no arguments.
fn parse_arguments(raw: &str) -> Result<Value, ToolSourceError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw).map_err(|e| ToolSourceError::InvalidInput(format!("arguments are not valid JSON: {e}")))
}

#[async_trait]
impl Node<ConversationState> for ActNode {
    fn id(&self) -> &str {
        &self.id
    }

    /// Returns Next::Continue so the outgoing edge (usually `after_tools`) decides.
    async fn run(&self, mut state: ConversationState) -> Result<(ConversationState, Next), AgentError> {
        let calls = state.pending_tool_calls().to_vec();
        for call in &calls {
            let result = self.execute(call).await;
            state.push(Message::tool(result));
        }
        Ok((state, Next::Continue))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::tool_source::{MockToolSource, ToolSpec};

    fn state_with_calls(calls: Vec<ToolCall>) -> ConversationState {
        let mut s = ConversationState::from_user("go");
        s.push(Message::assistant_with_tools("", calls));
        s
    }

    #[tokio::test]
    async fn unknown_tool_is_recovered_and_batch_continues() {
        let tools = MockToolSource::new().with_tool(ToolSpec::new("add", ""), ToolCallContent::text("10"));
        let node = ActNode::new(Box::new(tools));
        let (state, _) = node
            .run(state_with_calls(vec![
                ToolCall::new("c1", "divide", "{}"),
                ToolCall::new("c2", "add", r#"{"a":3,"b":7}"#),
            ]))
            .await
            .unwrap();
        let results = state.latest_tool_results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, UNKNOWN_TOOL_MESSAGE);
        assert_eq!(results[0].call_id, "c1");
        assert_eq!(results[1].content, "10");
        assert_eq!(results[1].name, "add");
    }

    #[tokio::test]
    async fn unknown_tool_with_malformed_arguments_gets_unknown_tool_message() {
        let tools = Arc::new(MockToolSource::new().with_tool(ToolSpec::new("add", ""), ToolCallContent::text("10")));
        let node = ActNode::new(Box::new(tools.clone()));
        let (state, _) = node
            .run(state_with_calls(vec![ToolCall::new("c1", "divide", "{oops")]))
            .await
            .unwrap();
        let results = state.latest_tool_results();
        assert_eq!(results[0].content, UNKNOWN_TOOL_MESSAGE);
        assert_eq!(results[0].name, "divide");
        assert!(tools.calls().is_empty());
    }

    #[tokio::test]
    async fn arguments_reach_the_tool_parsed() {
        let tools = Arc::new(MockToolSource::new().with_tool(ToolSpec::new("add", ""), ToolCallContent::text("10")));
        let node = ActNode::new(Box::new(tools.clone()));
        node.run(state_with_calls(vec![
            ToolCall::new("c1", "add", r#"{"a":3,"b":7}"#),
            ToolCall::new("c2", "add", "  "),
        ]))
        .await
        .unwrap();
        assert_eq!(
            tools.calls(),
            vec![
                ("add".to_string(), serde_json::json!({"a": 3, "b": 7})),
                ("add".to_string(), serde_json::json!({})),
            ]
        );
    }

    #[tokio::test]
    async fn malformed_arguments_and_failures_become_text() {
        let tools = MockToolSource::new()
            .with_tool(ToolSpec::new("ok", ""), ToolCallContent::text("fine"))
            .with_failing_tool(ToolSpec::new("boom", ""), ToolSourceError::Execution("disk full".into()));
        let node = ActNode::new(Box::new(tools));
        let (state, _) = node
            .run(state_with_calls(vec![
                ToolCall::new("c1", "ok", "{not json"),
                ToolCall::new("c2", "boom", ""),
            ]))
            .await
            .unwrap();
        let results = state.latest_tool_results();
        assert!(results[0].content.starts_with("Error: invalid arguments"));
        assert_eq!(results[1].content, "Error: tool execution failed: disk full");
    }

    #[tokio::test]
    async fn no_pending_calls_is_noop() {
        let node = ActNode::new(Box::new(MockToolSource::new()));
        let mut s = ConversationState::from_user("hi");
        s.push(Message::assistant("hello"));
        let (out, next) = node.run(s.clone()).await.unwrap();
        assert_eq!(out, s);
        assert_eq!(next, Next::Continue);
    }

    #[tokio::test]
    async fn terminate_flag_is_carried() {
        let tools = MockToolSource::new().with_tool(ToolSpec::new("save", ""), ToolCallContent::terminating("saved"));
        let node = ActNode::new(Box::new(tools));
        let (state, _) = node
            .run(state_with_calls(vec![ToolCall::new("c1", "save", r#"{"filename":"a"}"#)]))
            .await
            .unwrap();
        assert!(state.latest_tool_results()[0].terminate);
    }
}
