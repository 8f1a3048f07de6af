//! ai-agents: conversational tool-calling agents on langgraph.
//!
//! Five agents share one runtime: a document drafter, a memory-keeping chat, a RAG
//! question answerer, an arithmetic tool agent and a stateless chat.

pub mod arithmetic;
pub mod config;
pub mod console;
pub mod drafter;
pub mod input;
pub mod memory_chat;
pub mod rag;
pub mod simple_chat;

pub use arithmetic::{math_agent, run_math, MathTool};
pub use config::{Config, LlmArgs};
pub use drafter::{DocumentContext, Drafter, DrafterTool};
pub use input::{ScriptedInput, StdinInput, UserInput};
pub use memory_chat::{format_transcript, write_transcript, MemoryChat};
pub use rag::{build_retriever, RagAgent, RagError, RagOptions, RagTool};
pub use simple_chat::SimpleChat;
