//! Prebuilt tool-calling agent graph (aligns with LangGraph `create_react_agent`).

use std::collections::HashMap;
use std::sync::Arc;

use crate::graph::{CompilationError, CompiledStateGraph, Node, StateGraph, END, START};
use crate::state::ConversationState;

use super::route::{after_tools, should_continue, LoopState};
use super::{ActNode, ThinkNode};

/// Builds `START -> think`, `think -> {act | END}` via `should_continue`,
/// `act -> {think | END}` via `after_tools`.
pub fn build_tool_agent(
    think: ThinkNode,
    act: ActNode,
) -> Result<CompiledStateGraph<ConversationState>, CompilationError> {
    let think_id = <ThinkNode as Node<ConversationState>>::id(&think).to_string();
    let act_id = <ActNode as Node<ConversationState>>::id(&act).to_string();

    let mut graph = StateGraph::<ConversationState>::new();
    graph
        .add_node(think_id.clone(), Arc::new(think))
        .add_node(act_id.clone(), Arc::new(act))
        .add_edge(START, think_id.clone())
        .add_conditional_edges(
            think_id.clone(),
            Arc::new(|s: &ConversationState| should_continue(s).as_str().to_string()),
            HashMap::from([
                (LoopState::RunTools.as_str().to_string(), act_id.clone()),
                (LoopState::Exit.as_str().to_string(), END.to_string()),
            ]),
        )
        .add_conditional_edges(
            act_id,
            Arc::new(|s: &ConversationState| after_tools(s).as_str().to_string()),
            HashMap::from([
                (LoopState::AskModel.as_str().to_string(), think_id),
                (LoopState::Exit.as_str().to_string(), END.to_string()),
            ]),
        );
    graph.compile()
}
