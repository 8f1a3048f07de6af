//! Graph node trait: one step in a StateGraph.
//!
//! Receives state `S`, returns updated `S` and `Next` (continue, jump, or end).
//! Aligns with LangGraph node `(state) -> partial`, except the full state is returned.

use async_trait::async_trait;

use crate::error::AgentError;

use super::Next;

/// One step in a graph: state in, (state out, next step).
///
/// Return `Next::Continue` to let the graph's edges decide; the conditional edges of
/// the tool-calling loop are expressed that way. `Next::End` lets a node stop the run
/// on its own (e.g. when interactive input is exhausted).
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Node id (e.g. `"agent"`, `"tools"`), used in logs.
    fn id(&self) -> &str;

    async fn run(&self, state: S) -> Result<(S, Next), AgentError>;
}
