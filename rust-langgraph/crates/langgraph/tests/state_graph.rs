//! Integration tests for StateGraph: compile validation, edges and invoke.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use langgraph::{AgentError, CompilationError, Next, Node, StateGraph, END, START};

#[derive(Debug, Clone, Default)]
struct Counter {
    visits: Vec<String>,
    value: i64,
}

/// Adds `delta` and records its id.
struct AddNode {
    id: &'static str,
    delta: i64,
}

#[async_trait]
impl Node<Counter> for AddNode {
    fn id(&self) -> &str {
        self.id
    }

    async fn run(&self, mut state: Counter) -> Result<(Counter, Next), AgentError> {
        state.value += self.delta;
        state.visits.push(self.id.to_string());
        Ok((state, Next::Continue))
    }
}

struct StopNode;

#[async_trait]
impl Node<Counter> for StopNode {
    fn id(&self) -> &str {
        "stop"
    }

    async fn run(&self, mut state: Counter) -> Result<(Counter, Next), AgentError> {
        state.visits.push("stop".into());
        Ok((state, Next::End))
    }
}

fn add(id: &'static str, delta: i64) -> Arc<dyn Node<Counter>> {
    Arc::new(AddNode { id, delta })
}

#[tokio::test]
async fn compile_fails_when_edge_refers_to_unknown_node() {
    let mut graph = StateGraph::<Counter>::new();
    graph
        .add_node("a", add("a", 1))
        .add_edge(START, "a")
        .add_edge("a", "missing");

    match graph.compile() {
        Err(CompilationError::NodeNotFound(id)) => assert_eq!(id, "missing"),
        other => panic!("expected NodeNotFound, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn compile_requires_entry_edge() {
    let mut graph = StateGraph::<Counter>::new();
    graph.add_node("a", add("a", 1));
    assert!(matches!(graph.compile(), Err(CompilationError::MissingEntry)));
}

#[tokio::test]
async fn compile_rejects_reserved_ids() {
    let mut graph = StateGraph::<Counter>::new();
    graph.add_node(END, add("end", 1)).add_edge(START, END);
    assert!(matches!(graph.compile(), Err(CompilationError::ReservedId(_))));
}

#[tokio::test]
async fn invoke_linear_chain_runs_in_order() {
    let mut graph = StateGraph::<Counter>::new();
    graph
        .add_node("a", add("a", 1))
        .add_node("b", add("b", 10))
        .add_edge(START, "a")
        .add_edge("a", "b")
        .add_edge("b", END);

    let compiled = graph.compile().unwrap();
    let out = compiled.invoke(Counter::default()).await.unwrap();
    assert_eq!(out.value, 11);
    assert_eq!(out.visits, vec!["a", "b"]);
}

#[tokio::test]
async fn conditional_edge_loops_until_router_exits() {
    let mut graph = StateGraph::<Counter>::new();
    graph
        .add_node("inc", add("inc", 1))
        .add_edge(START, "inc")
        .add_conditional_edges(
            "inc",
            Arc::new(|s: &Counter| if s.value < 3 { "again".into() } else { "done".into() }),
            HashMap::from([
                ("again".to_string(), "inc".to_string()),
                ("done".to_string(), END.to_string()),
            ]),
        );

    let compiled = graph.compile().unwrap();
    let mut steps = Vec::new();
    let out = compiled
        .invoke_with(Counter::default(), |id, s| steps.push((id.to_string(), s.value)))
        .await
        .unwrap();
    assert_eq!(out.value, 3);
    assert_eq!(steps, vec![("inc".into(), 1), ("inc".into(), 2), ("inc".into(), 3)]);
}

#[tokio::test]
async fn unmapped_branch_is_no_route() {
    let mut graph = StateGraph::<Counter>::new();
    graph
        .add_node("a", add("a", 1))
        .add_edge(START, "a")
        .add_conditional_edges(
            "a",
            Arc::new(|_: &Counter| "nowhere".to_string()),
            HashMap::from([("done".to_string(), END.to_string())]),
        );
    let err = graph.compile().unwrap().invoke(Counter::default()).await.unwrap_err();
    assert!(matches!(err, AgentError::NoRoute { ref branch, .. } if branch == "nowhere"));
}

#[tokio::test]
async fn node_returning_end_stops_despite_edges() {
    let mut graph = StateGraph::<Counter>::new();
    graph
        .add_node("stop", Arc::new(StopNode))
        .add_node("a", add("a", 1))
        .add_edge(START, "stop")
        .add_edge("stop", "a");
    let out = graph.compile().unwrap().invoke(Counter::default()).await.unwrap();
    assert_eq!(out.visits, vec!["stop"]);
}

#[tokio::test]
async fn recursion_limit_stops_endless_loop() {
    let mut graph = StateGraph::<Counter>::new();
    graph
        .add_node("a", add("a", 1))
        .add_edge(START, "a")
        .add_edge("a", "a");
    let compiled = graph.compile().unwrap().with_recursion_limit(5);
    let err = compiled.invoke(Counter::default()).await.unwrap_err();
    assert!(matches!(err, AgentError::RecursionLimit(5)));
}
