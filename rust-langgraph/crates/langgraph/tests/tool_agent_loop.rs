//! End-to-end tests for the think ⇄ act loop built by `build_tool_agent`.
//!
//! MockLlm scripts the model, a small `ToolSet` enum provides the tools.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use langgraph::llm::LlmError;
use langgraph::react::UNKNOWN_TOOL_MESSAGE;
use langgraph::{
    build_tool_agent, ActNode, AgentError, ConversationState, LlmResponse, Message, MockLlm,
    ParamKind, ToolCall, ToolCallContent, ToolParam, ToolSet, ToolSourceError, ToolSpec,
    ThinkNode, TypedToolSource,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(tag = "tool", content = "args", rename_all = "snake_case")]
enum Calc {
    Add { a: i64, b: i64 },
    Finish {},
}

#[async_trait]
impl ToolSet for Calc {
    type Context = AtomicUsize;

    fn specs() -> Vec<ToolSpec> {
        vec![
            ToolSpec::new("add", "Add two integers")
                .param(ToolParam::required("a", ParamKind::Integer))
                .param(ToolParam::required("b", ParamKind::Integer)),
            ToolSpec::new("finish", "End the session"),
        ]
    }

    async fn invoke(self, calls: &AtomicUsize) -> Result<ToolCallContent, ToolSourceError> {
        calls.fetch_add(1, Ordering::SeqCst);
        match self {
            Calc::Add { a, b } => Ok(ToolCallContent::text((a + b).to_string())),
            Calc::Finish {} => Ok(ToolCallContent::terminating("finished")),
        }
    }
}

fn agent(llm: Arc<MockLlm>) -> langgraph::CompiledStateGraph<ConversationState> {
    let think = ThinkNode::new(Box::new(llm));
    let act = ActNode::new(Box::new(TypedToolSource::<Calc>::new(AtomicUsize::new(0))));
    build_tool_agent(think, act).unwrap()
}

#[tokio::test]
async fn add_then_add_again_then_answer() {
    let llm = Arc::new(MockLlm::scripted(vec![
        LlmResponse::with_tool_calls("", vec![ToolCall::new("call_a", "add", r#"{"a":3,"b":7}"#)]),
        LlmResponse::with_tool_calls("", vec![ToolCall::new("call_b", "add", r#"{"a":10,"b":90}"#)]),
        LlmResponse::text("The result is 100."),
    ]));
    let out = agent(llm.clone())
        .invoke(ConversationState::from_user("Add 3+7, then add 90"))
        .await
        .unwrap();

    let results: Vec<_> = out.tool_results().collect();
    assert_eq!(results.len(), 2);
    assert_eq!((results[0].call_id.as_str(), results[0].content.as_str()), ("call_a", "10"));
    assert_eq!((results[1].call_id.as_str(), results[1].content.as_str()), ("call_b", "100"));
    assert_eq!(out.last_assistant_content(), "The result is 100.");
    assert_eq!(llm.call_count(), 3);
    // user, assistant+call, tool, assistant+call, tool, assistant
    assert_eq!(out.len(), 6);
    // The third request carries the full history so far.
    assert_eq!(llm.requests()[2].len(), 5);
}

#[tokio::test]
async fn no_tool_calls_ends_after_one_model_call() {
    let llm = Arc::new(MockLlm::with_no_tool_calls("Hello there."));
    let out = agent(llm.clone())
        .invoke(ConversationState::from_user("hi"))
        .await
        .unwrap();
    assert_eq!(llm.call_count(), 1);
    assert_eq!(out.messages[1], Message::assistant("Hello there."));
}

#[tokio::test]
async fn terminate_flag_stops_without_another_model_call() {
    let llm = Arc::new(MockLlm::scripted(vec![LlmResponse::with_tool_calls(
        "",
        vec![
            ToolCall::new("c1", "add", r#"{"a":1,"b":1}"#),
            ToolCall::new("c2", "finish", "{}"),
        ],
    )]));
    let out = agent(llm.clone())
        .invoke(ConversationState::from_user("finish"))
        .await
        .unwrap();
    assert_eq!(llm.call_count(), 1);
    assert_eq!(out.tool_results().count(), 2);
    assert!(matches!(out.last(), Some(Message::Tool(r)) if r.terminate));
}

#[tokio::test]
async fn unknown_tool_is_reported_back_to_model() {
    let llm = Arc::new(MockLlm::scripted(vec![
        LlmResponse::with_tool_calls("", vec![ToolCall::new("c1", "divide", r#"{"a":1}"#)]),
        LlmResponse::text("Sorry, I can only add."),
    ]));
    let out = agent(llm.clone())
        .invoke(ConversationState::from_user("divide"))
        .await
        .unwrap();
    let second = &llm.requests()[1];
    assert!(matches!(second.last(), Some(Message::Tool(r)) if r.content == UNKNOWN_TOOL_MESSAGE));
    assert_eq!(out.last_assistant_content(), "Sorry, I can only add.");
}

#[tokio::test]
async fn model_service_error_surfaces_as_agent_error() {
    let llm = Arc::new(MockLlm::failing(LlmError::RateLimit("slow down".into())));
    let err = agent(llm)
        .invoke(ConversationState::from_user("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Llm(LlmError::RateLimit(_))));
}

#[tokio::test]
async fn endless_tool_requests_hit_recursion_limit() {
    let llm = Arc::new(MockLlm::with_no_tool_calls("").with_fallback(LlmResponse::with_tool_calls(
        "",
        vec![ToolCall::new("", "add", r#"{"a":1,"b":1}"#)],
    )));
    let err = agent(llm)
        .invoke(ConversationState::from_user("loop"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::RecursionLimit(25)));
}
