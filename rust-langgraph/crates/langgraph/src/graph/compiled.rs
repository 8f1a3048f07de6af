//! Compiled state graph: immutable, supports invoke only.
//!
//! Built by `StateGraph::compile`. Starts at the target of the `START` edge; after each
//! node, uses the returned `Next` and the node's outgoing edge to choose the next node.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::AgentError;

use super::state_graph::{RouterFn, END, START};
use super::{Next, Node};

/// Default cap on node executions per invoke; aligns with LangGraph's recursion limit.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// Outgoing edge of a node.
pub(crate) enum Edge<S> {
    Direct(String),
    Conditional {
        router: RouterFn<S>,
        path_map: HashMap<String, String>,
    },
}

/// Compiled graph: immutable structure, supports invoke only.
///
/// **Interaction**: Built from `StateGraph`; callers use `invoke(state)` or
/// `invoke_with(state, on_step)` to execute.
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) edges: HashMap<String, Edge<S>>,
    pub(super) recursion_limit: usize,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Overrides the maximum number of node executions per invoke.
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    /// Runs the graph from `START` until a node or edge leads to `END`.
    pub async fn invoke(&self, state: S) -> Result<S, AgentError> {
        self.invoke_with(state, |_, _| {}).await
    }

    /// Runs the graph, calling `on_step(node_id, &state)` after every node.
    ///
    /// Aligns with LangGraph `stream(..., stream_mode="values")`: the callback sees the
    /// full state after each step, which is how the CLIs print progress.
    pub async fn invoke_with<F>(&self, state: S, mut on_step: F) -> Result<S, AgentError>
    where
        F: FnMut(&str, &S) + Send,
    {
        let mut state = state;
        let mut current = match self.resolve(START, &state)? {
            Some(id) => id,
            None => return Ok(state),
        };
        let mut steps = 0usize;

        loop {
            if steps >= self.recursion_limit {
                return Err(AgentError::RecursionLimit(self.recursion_limit));
            }
            steps += 1;

            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| AgentError::ExecutionFailed(format!("unknown node: {current}")))?;
            debug!(node = %current, step = steps, "running node");
            let (new_state, next) = node.run(state).await?;
            state = new_state;
            on_step(&current, &state);

            let target = match next {
                Next::End => None,
                Next::Node(id) => Some(id),
                Next::Continue => self.resolve(&current, &state)?,
            };
            match target {
                Some(id) => {
                    trace!(from = %current, to = %id, "edge");
                    current = id;
                }
                None => {
                    debug!(node = %current, steps, "graph reached END");
                    return Ok(state);
                }
            }
        }
    }

    /// Target of the outgoing edge of `from`; `None` means END.
    fn resolve(&self, from: &str, state: &S) -> Result<Option<String>, AgentError> {
        let to = match self.edges.get(from) {
            None => return Ok(None),
            Some(Edge::Direct(to)) => to.clone(),
            Some(Edge::Conditional { router, path_map }) => {
                let branch = router(state);
                if path_map.is_empty() {
                    branch
                } else {
                    path_map
                        .get(&branch)
                        .cloned()
                        .ok_or_else(|| AgentError::NoRoute {
                            from: from.to_string(),
                            branch: branch.clone(),
                        })?
                }
            }
        };
        if to == END {
            return Ok(None);
        }
        if !self.nodes.contains_key(&to) {
            return Err(AgentError::NoRoute {
                from: from.to_string(),
                branch: to,
            });
        }
        Ok(Some(to))
    }
}
