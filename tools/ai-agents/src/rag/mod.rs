//! RAG agent: answers questions about one document through `retriever_tool`.
//!
//! Pipeline: load (`loader`) -> split (`splitter`) -> embed into an in-memory index
//! (`retriever`, optionally cached as JSON) -> think ⇄ act graph per question.
//!
//! **Interaction**: `main` builds the retriever with `OpenAiEmbedder` and the agent
//! with `ChatOpenAI` bound to `RagTool::specs()`.

mod loader;
mod retriever;
mod splitter;

pub use loader::load_document;
pub use retriever::{format_hits, RagContext, RagIndex, RagTool, Retriever, DEFAULT_TOP_K};
pub use splitter::{TextSplitter, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use langgraph::memory::{Embedder, EmbedderError};
use langgraph::react::UNKNOWN_TOOL_MESSAGE;
use langgraph::{
    build_tool_agent, ActNode, AgentError, CompilationError, CompiledStateGraph, ConversationState,
    LlmClient, SystemPrompt, ThinkNode, TypedToolSource,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::input::UserInput;

/// Prompt shown before each question.
pub const INPUT_PROMPT: &str = "\nWhat is your question: ";

/// Errors while preparing the document index.
#[derive(Debug, Error)]
pub enum RagError {
    #[error("load failed: {0}")]
    Load(String),
    #[error("invalid settings: {0}")]
    Config(String),
    #[error("index cache: {0}")]
    Index(String),
    #[error(transparent)]
    Embed(#[from] EmbedderError),
}

/// Settings for building the retriever.
#[derive(Debug, Clone)]
pub struct RagOptions {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    /// Recorded in the index cache; a different model forces a rebuild.
    pub embedding_model: String,
}

impl Default for RagOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            embedding_model: String::new(),
        }
    }
}

/// Loads, splits and embeds `document`, reusing `index_path` when it holds a matching
/// index and writing it otherwise.
pub async fn build_retriever(
    document: &Path,
    embedder: Arc<dyn Embedder>,
    options: &RagOptions,
    index_path: Option<&Path>,
) -> Result<Retriever, RagError> {
    let source = document.display().to_string();
    if let Some(path) = index_path.filter(|p| p.exists()) {
        match RagIndex::load(path) {
            Ok(index)
                if index.matches(
                    &source,
                    &options.embedding_model,
                    options.chunk_size,
                    options.chunk_overlap,
                ) =>
            {
                info!(path = %path.display(), chunks = index.entries.len(), "reusing index cache");
                return Ok(Retriever::from_entries(embedder, index.entries, options.top_k));
            }
            Ok(_) => info!(path = %path.display(), "index cache is stale, rebuilding"),
            Err(e) => warn!(error = %e, "ignoring unreadable index cache"),
        }
    }

    let splitter = TextSplitter::new(options.chunk_size, options.chunk_overlap)?;
    let text = load_document(document)?;
    let chunks = splitter.split(&text);
    println!("Document loaded and split into {} chunks.", chunks.len());
    let retriever = Retriever::build(embedder, chunks, options.top_k).await?;

    if let Some(path) = index_path {
        RagIndex {
            source,
            embedding_model: options.embedding_model.clone(),
            chunk_size: options.chunk_size,
            chunk_overlap: options.chunk_overlap,
            entries: retriever.entries(),
        }
        .save(path)?;
        info!(path = %path.display(), "index cache written");
    }
    Ok(retriever)
}

/// System prompt naming the document's subject.
pub fn system_prompt(subject: &str) -> String {
    format!(
        "You are an intelligent AI assistant who answers questions about {subject} based on the document loaded into your knowledge base.\n\
         Use the retriever tool available to answer questions about the document. You can make multiple calls if needed.\n\
         If you need to look up some information before asking a follow up question, you are allowed to do that!\n\
         Please always cite the specific parts of the documents you use in your answers."
    )
}

/// Question-answering session; every question starts a fresh conversation.
pub struct RagAgent {
    graph: CompiledStateGraph<ConversationState>,
}

impl RagAgent {
    /// `llm` should already be bound to `RagTool::specs()`.
    pub fn new(
        llm: Box<dyn LlmClient>,
        retriever: Retriever,
        subject: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CompilationError> {
        let subject = subject.into();
        let think = ThinkNode::new(llm)
            .with_id("llm")
            .with_timeout(timeout)
            .with_system_prompt(SystemPrompt::Static(system_prompt(&subject)));
        let act = ActNode::new(Box::new(TypedToolSource::<RagTool>::new(RagContext {
            retriever,
            subject,
        })))
        .with_id("retriever");
        Ok(Self {
            graph: build_tool_agent(think, act)?,
        })
    }

    /// Answers one question, printing tool progress as it goes.
    pub async fn ask(&self, question: &str) -> Result<String, AgentError> {
        let out = self
            .graph
            .invoke_with(ConversationState::from_user(question), |node, state| {
                if node == "retriever" {
                    print_tool_progress(state);
                }
            })
            .await?;
        Ok(out.last_assistant_content().to_string())
    }

    /// Reads questions until `exit` / `quit` (any case) or end of input.
    ///
    /// A model-service error is shown and the question skipped.
    pub async fn run(&self, input: &dyn UserInput) -> std::io::Result<()> {
        println!("\n=== RAG AGENT ===");
        while let Some(line) = input.read_line(INPUT_PROMPT).await? {
            if is_exit(&line) {
                break;
            }
            match self.ask(&line).await {
                Ok(answer) => {
                    println!("\n=== ANSWER ===");
                    println!("{answer}");
                }
                Err(e) => {
                    warn!(error = %e, "question failed");
                    eprintln!("\nError: {e}");
                }
            }
        }
        Ok(())
    }
}

/// `exit` or `quit`, ignoring case and surrounding whitespace.
pub fn is_exit(line: &str) -> bool {
    let l = line.trim();
    l.eq_ignore_ascii_case("exit") || l.eq_ignore_ascii_case("quit")
}

fn print_tool_progress(state: &ConversationState) {
    let calls = state.last_assistant().map(|m| m.tool_calls()).unwrap_or(&[]);
    for result in state.latest_tool_results() {
        let query = calls
            .iter()
            .find(|c| c.id == result.call_id)
            .and_then(|c| serde_json::from_str::<serde_json::Value>(&c.arguments).ok())
            .and_then(|v| v.get("query").and_then(|q| q.as_str()).map(String::from))
            .unwrap_or_else(|| "No query provided".to_string());
        println!("Calling Tool: {} with query: {}", result.name, query);
        if result.content == UNKNOWN_TOOL_MESSAGE {
            println!("\nTool: {} does not exist.", result.name);
        } else {
            println!("Result length: {}", result.content.chars().count());
        }
    }
    println!("Tools Execution Complete. Back to the model!");
}
