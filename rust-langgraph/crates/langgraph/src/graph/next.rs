//! Next-step result from a graph node: follow the node's edges, jump to a node, or end.

/// Next step after running a node.
///
/// - **Continue**: follow the outgoing edge of the node (direct or conditional); a node
///   without outgoing edge ends the run.
/// - **Node(id)**: jump to the given node, ignoring the node's edges.
/// - **End**: stop; return current state as final result.
///
/// **Interaction**: Returned by `Node::run`; consumed by `CompiledStateGraph::invoke`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    /// Follow the edges registered for this node.
    Continue,
    /// Run the node with the given id next.
    Node(String),
    /// Stop and return the current state.
    End,
}
