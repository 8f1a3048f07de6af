//! State graph: nodes + direct and conditional edges, compile and invoke.
//!
//! Aligns with LangGraph `StateGraph`: add nodes and edges (from `START`, to `END`),
//! route with `add_conditional_edges`, compile, then invoke with state.

mod compile_error;
mod compiled;
mod next;
mod node;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::{CompiledStateGraph, DEFAULT_RECURSION_LIMIT};
pub use next::Next;
pub use node::Node;
pub use state_graph::{RouterFn, StateGraph, END, START};
