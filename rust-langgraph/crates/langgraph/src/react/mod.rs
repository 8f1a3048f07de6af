//! Tool-calling agent loop: Think and Act nodes plus the loop controller.
//!
//! ThinkNode asks the model, ActNode runs the requested tools, and the routing
//! functions in `route` decide between them. `build_tool_agent` wires the usual
//! think ⇄ act graph.

mod act_node;
mod prebuilt;
mod route;
mod think_node;

pub use act_node::{ActNode, UNKNOWN_TOOL_MESSAGE};
pub use prebuilt::build_tool_agent;
pub use route::{after_tools, should_continue, LoopState};
pub use think_node::{SystemPrompt, ThinkNode, DEFAULT_LLM_TIMEOUT};
