//! Arithmetic agent: one request, solved with `add` / `subtract` / `multiply` tools.

use std::time::Duration;

use async_trait::async_trait;
use langgraph::{
    build_tool_agent, ActNode, AgentError, CompilationError, CompiledStateGraph, ConversationState,
    LlmClient, ParamKind, SystemPrompt, ThinkNode, ToolCallContent, ToolParam, ToolSet,
    ToolSourceError, ToolSpec, TypedToolSource,
};
use serde::Deserialize;

use crate::console::pretty_message;

/// Request used when none is given on the command line.
pub const DEFAULT_PROMPT: &str = "Add 3+7, and the result adding again with 90, and then the result substract with the result of first add operation before, and the result again multiply with 2. And also tell me a joke";

pub const SYSTEM_PROMPT: &str =
    "You are my AI assistant, please answer my question to the best of your ability.";

/// Integer arithmetic tools.
#[derive(Debug, Deserialize)]
#[serde(tag = "tool", content = "args", rename_all = "snake_case")]
pub enum MathTool {
    Add { a: i64, b: i64 },
    Subtract { a: i64, b: i64 },
    Multiply { a: i64, b: i64 },
}

fn two_ints(name: &str, description: &str) -> ToolSpec {
    ToolSpec::new(name, description)
        .param(ToolParam::required("a", ParamKind::Integer))
        .param(ToolParam::required("b", ParamKind::Integer))
}

#[async_trait]
impl ToolSet for MathTool {
    type Context = ();

    fn specs() -> Vec<ToolSpec> {
        vec![
            two_ints("add", "This is addition function that adds 2 numbers together"),
            two_ints("subtract", "Subtraction function"),
            two_ints("multiply", "Multiplication function"),
        ]
    }

    async fn invoke(self, _ctx: &()) -> Result<ToolCallContent, ToolSourceError> {
        let (op, value) = match self {
            MathTool::Add { a, b } => ("add", a.checked_add(b)),
            MathTool::Subtract { a, b } => ("subtract", a.checked_sub(b)),
            MathTool::Multiply { a, b } => ("multiply", a.checked_mul(b)),
        };
        value
            .map(|v| ToolCallContent::text(v.to_string()))
            .ok_or_else(|| ToolSourceError::Execution(format!("{op}: integer overflow")))
    }
}

/// Builds the think ⇄ act graph; `llm` should be bound to `MathTool::specs()`.
pub fn math_agent(
    llm: Box<dyn LlmClient>,
    timeout: Duration,
) -> Result<CompiledStateGraph<ConversationState>, CompilationError> {
    let think = ThinkNode::new(llm)
        .with_id("our_agent")
        .with_timeout(timeout)
        .with_system_prompt(SystemPrompt::Static(SYSTEM_PROMPT.to_string()));
    let act = ActNode::new(Box::new(TypedToolSource::<MathTool>::new(())));
    build_tool_agent(think, act)
}

/// Runs `prompt` to completion, printing every new message as it appears.
pub async fn run_math(
    graph: &CompiledStateGraph<ConversationState>,
    prompt: &str,
) -> Result<ConversationState, AgentError> {
    let initial = ConversationState::from_user(prompt);
    if let Some(m) = initial.last() {
        println!("{}", pretty_message(m));
    }
    let mut printed = initial.len();
    graph
        .invoke_with(initial, |_, state| {
            for m in &state.messages[printed..] {
                println!("{}", pretty_message(m));
            }
            printed = state.len();
        })
        .await
}
