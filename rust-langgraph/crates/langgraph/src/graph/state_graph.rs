//! State graph builder: nodes, direct edges and conditional edges.
//!
//! Add nodes with `add_node`, wire them with `add_edge(from, to)` (using `START` / `END`)
//! or `add_conditional_edges(from, router, path_map)`, then `compile` to get a
//! `CompiledStateGraph`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::{CompiledStateGraph, Edge, DEFAULT_RECURSION_LIMIT};
use crate::graph::node::Node;

/// Virtual entry node id.
pub const START: &str = "__start__";
/// Virtual exit node id.
pub const END: &str = "__end__";

/// Router used by conditional edges: reads the state, returns a branch key.
pub type RouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// State graph: nodes plus one outgoing edge (direct or conditional) per node.
///
/// Generic over state type `S`. Build with `add_node` / `add_edge` /
/// `add_conditional_edges`, then `compile()` to obtain an executable graph.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: HashMap<String, Edge<S>>,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
        }
    }

    /// Adds a node; replaces any node with the same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Adds a direct edge `from -> to`. A later edge from the same node replaces it.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.insert(from.into(), Edge::Direct(to.into()));
        self
    }

    /// Adds a conditional edge: after `from` runs, `router(&state)` picks a branch key and
    /// `path_map[key]` names the next node (or `END`).
    ///
    /// With an empty `path_map` the branch key itself is taken as the target id.
    pub fn add_conditional_edges(
        &mut self,
        from: impl Into<String>,
        router: RouterFn<S>,
        path_map: HashMap<String, String>,
    ) -> &mut Self {
        self.edges
            .insert(from.into(), Edge::Conditional { router, path_map });
        self
    }

    /// Builds the executable graph.
    ///
    /// Fails when there is no edge from `START`, when a node uses a reserved id, or when
    /// any edge or path target is neither a registered node nor `END`.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        for id in self.nodes.keys() {
            if id == START || id == END {
                return Err(CompilationError::ReservedId(id.clone()));
            }
        }
        if !self.edges.contains_key(START) {
            return Err(CompilationError::MissingEntry);
        }
        let known = |id: &str| id == END || self.nodes.contains_key(id);
        for (from, edge) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            match edge {
                Edge::Direct(to) => {
                    if !known(to) {
                        return Err(CompilationError::NodeNotFound(to.clone()));
                    }
                }
                Edge::Conditional { path_map, .. } => {
                    if let Some(bad) = path_map.values().find(|to| !known(to)) {
                        return Err(CompilationError::NodeNotFound(bad.clone()));
                    }
                }
            }
        }
        Ok(CompiledStateGraph {
            nodes: self.nodes,
            edges: self.edges,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        })
    }
}
