//! Drafter: a writing assistant that edits one document through `update` / `save` tools.
//!
//! Graph: `START -> agent -> tools`, then `after_tools` routes back to `agent` or to
//! `END` once `save` succeeded. The agent node greets first, then reads one user line
//! per step; end of input ends the session.
//!
//! **Interaction**: `main` builds a `Drafter` with `ChatOpenAI` bound to
//! `DrafterTool::specs()`; tests use `MockLlm` and `ScriptedInput`.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use langgraph::{
    after_tools, ActNode, AgentError, CompilationError, CompiledStateGraph, ConversationState,
    LlmClient, LoopState, Message, Next, Node, ParamKind, StateGraph, SystemPrompt, ThinkNode,
    ToolCallContent, ToolParam, ToolSet, ToolSourceError, ToolSpec, TypedToolSource, END, START,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::console::tool_names;
use crate::input::UserInput;

/// First user turn, sent without reading input.
pub const GREETING: &str = "I'm ready to help you update a document. What would you like to create?";

/// Prompt shown before each later user turn.
pub const INPUT_PROMPT: &str = "\nWhat would you like to do with the document? ";

/// Interactive sessions run many turns; each turn is two node steps.
pub const DRAFTER_RECURSION_LIMIT: usize = 1_000;

const EMPTY_DOCUMENT: &str =
    "Error: Document is empty. Please update the document first before saving.";

/// The document being drafted, shared by the tools and the system prompt.
///
/// Lives for one session. Cloning shares the same content; the mutex serializes
/// updates and saves.
#[derive(Debug, Clone, Default)]
pub struct DocumentContext {
    content: Arc<Mutex<String>>,
    dir: PathBuf,
}

impl DocumentContext {
    /// Empty document saved under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            content: Arc::default(),
            dir: dir.into(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        self.content.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn content(&self) -> String {
        self.lock().clone()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Replaces the whole document.
    pub fn update(&self, content: impl Into<String>) -> ToolCallContent {
        let mut doc = self.lock();
        *doc = content.into();
        info!(len = doc.len(), "document updated");
        ToolCallContent::text(format!(
            "Your document has been updated successfully! The current document is:\n{}",
            *doc
        ))
    }

    /// Writes the document to `<dir>/<filename>.txt`; success ends the session.
    pub fn save(&self, filename: &str) -> ToolCallContent {
        let doc = self.lock();
        if doc.is_empty() {
            return ToolCallContent::text(EMPTY_DOCUMENT);
        }
        let filename = normalize_filename(filename);
        // Only a bare file name; anything with a path component would leave `dir`.
        if Path::new(&filename).file_name() != Some(OsStr::new(&filename)) {
            warn!(filename = %filename, "rejected save outside document dir");
            return ToolCallContent::text(format!(
                "Error saving document: '{filename}' must be a plain file name"
            ));
        }
        let path = self.dir.join(&filename);
        match std::fs::write(&path, doc.as_bytes()) {
            Ok(()) => {
                info!(path = %path.display(), "document saved");
                println!("\nDocument has been saved to: '{filename}'");
                ToolCallContent::terminating(format!(
                    "Your document has been saved successfully to '{filename}'"
                ))
            }
            Err(e) => ToolCallContent::text(format!("Error saving document: {e}")),
        }
    }
}

/// Appends `.txt` unless already present.
pub fn normalize_filename(name: &str) -> String {
    if name.ends_with(".txt") {
        name.to_string()
    } else {
        format!("{name}.txt")
    }
}

/// System prompt embedding the current document.
pub fn system_prompt(document: &str) -> String {
    format!(
        "You are Drafter, a helpful writing assistant. You help the user update and modify documents.\n\n\
         - If the user wants to create, update or modify content, use the 'update' tool with the complete updated content.\n\
         - If the user wants to save and finish, use the 'save' tool (only after content is updated).\n\
         - Always show the current document state after modifications.\n\
         - The document must have content before it can be saved.\n\n\
         The current document content is: {document}"
    )
}

/// The drafter's tools.
#[derive(Debug, Deserialize)]
#[serde(tag = "tool", content = "args", rename_all = "snake_case")]
pub enum DrafterTool {
    Update { content: String },
    Save { filename: String },
}

#[async_trait]
impl ToolSet for DrafterTool {
    type Context = DocumentContext;

    fn specs() -> Vec<ToolSpec> {
        vec![
            ToolSpec::new("update", "Updates the document with the provided content.").param(
                ToolParam::required("content", ParamKind::String)
                    .describe("The complete updated document"),
            ),
            ToolSpec::new(
                "save",
                "Save the current document to a text file and finish the process.",
            )
            .param(ToolParam::required("filename", ParamKind::String).describe("Name for the text file")),
        ]
    }

    async fn invoke(self, doc: &DocumentContext) -> Result<ToolCallContent, ToolSourceError> {
        Ok(match self {
            DrafterTool::Update { content } => doc.update(content),
            DrafterTool::Save { filename } => doc.save(&filename),
        })
    }
}

/// Agent node: adds the next user turn, then asks the model.
struct DrafterAgentNode {
    think: ThinkNode,
    input: Arc<dyn UserInput>,
}

#[async_trait]
impl Node<ConversationState> for DrafterAgentNode {
    fn id(&self) -> &str {
        "agent"
    }

    async fn run(&self, mut state: ConversationState) -> Result<(ConversationState, Next), AgentError> {
        let turn = if state.is_empty() {
            GREETING.to_string()
        } else {
            match self
                .input
                .read_line(INPUT_PROMPT)
                .await
                .map_err(|e| AgentError::ExecutionFailed(format!("read input: {e}")))?
            {
                Some(line) => {
                    println!("\nUSER: {line}");
                    line
                }
                None => {
                    debug!("end of input, drafter stops");
                    return Ok((state, Next::End));
                }
            }
        };
        state.push(Message::user(turn));
        let state = self.think.think(state).await?;
        Ok((state, Next::Continue))
    }
}

/// Drafter session: graph plus its document.
pub struct Drafter {
    graph: CompiledStateGraph<ConversationState>,
    document: DocumentContext,
}

impl Drafter {
    /// `llm` should already be bound to `DrafterTool::specs()`.
    pub fn new(
        llm: Box<dyn LlmClient>,
        input: Arc<dyn UserInput>,
        document: DocumentContext,
        timeout: Duration,
    ) -> Result<Self, CompilationError> {
        let prompt_doc = document.clone();
        let think = ThinkNode::new(llm)
            .with_timeout(timeout)
            .with_system_prompt(SystemPrompt::dynamic(move || system_prompt(&prompt_doc.content())));
        let agent = DrafterAgentNode { think, input };
        let tools = ActNode::new(Box::new(TypedToolSource::<DrafterTool>::new(document.clone())));

        let mut graph = StateGraph::<ConversationState>::new();
        graph
            .add_node("agent", Arc::new(agent))
            .add_node("tools", Arc::new(tools))
            .add_edge(START, "agent")
            .add_edge("agent", "tools")
            .add_conditional_edges(
                "tools",
                Arc::new(|s: &ConversationState| after_tools(s).as_str().to_string()),
                HashMap::from([
                    (LoopState::AskModel.as_str().to_string(), "agent".to_string()),
                    (LoopState::Exit.as_str().to_string(), END.to_string()),
                ]),
            );
        let graph = graph.compile()?.with_recursion_limit(DRAFTER_RECURSION_LIMIT);
        Ok(Self { graph, document })
    }

    pub fn document(&self) -> &DocumentContext {
        &self.document
    }

    /// Runs the session to completion, printing each AI turn and tool result.
    pub async fn run(&self) -> Result<ConversationState, AgentError> {
        println!("\n====== DRAFTER ======");
        let result = self
            .graph
            .invoke_with(ConversationState::new(), |node, state| match node {
                "agent" => {
                    if let Some(m @ Message::Assistant { .. }) = state.last() {
                        println!("\nAI: {}", m.content());
                        let names = tool_names(m);
                        if !names.is_empty() {
                            println!("USING TOOLS: {names:?}");
                        }
                    }
                }
                "tools" => {
                    for r in state.latest_tool_results() {
                        println!("\nTOOL RESULT: {}", r.content);
                    }
                }
                _ => {}
            })
            .await;
        println!("\n====== DRAFTER FINISHED ======");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_filename_is_idempotent() {
        assert_eq!(normalize_filename("notes"), "notes.txt");
        assert_eq!(normalize_filename("notes.txt"), "notes.txt");
        assert_eq!(normalize_filename(&normalize_filename("a.md")), "a.md.txt");
    }

    #[test]
    fn save_on_empty_document_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let doc = DocumentContext::new(dir.path());
        let out = doc.save("x");
        assert_eq!(out.text, EMPTY_DOCUMENT);
        assert!(!out.terminate);
        assert!(!dir.path().join("x.txt").exists());
    }

    #[test]
    fn update_then_save_writes_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let doc = DocumentContext::new(dir.path());
        let out = doc.update("Dear team,\nhello.");
        assert!(out.text.ends_with("The current document is:\nDear team,\nhello."));
        let out = doc.save("letter");
        assert!(out.terminate);
        assert_eq!(out.text, "Your document has been saved successfully to 'letter.txt'");
        let written = std::fs::read_to_string(dir.path().join("letter.txt")).unwrap();
        assert_eq!(written, "Dear team,\nhello.");
    }

    #[test]
    fn save_rejects_names_leaving_the_dir() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("docs");
        std::fs::create_dir(&inner).unwrap();
        let doc = DocumentContext::new(&inner);
        doc.update("text");
        let escape = dir.path().join("abs").display().to_string();
        for name in ["../up", "sub/note", escape.as_str()] {
            let out = doc.save(name);
            assert!(out.text.starts_with("Error saving document: "), "{name}: {}", out.text);
            assert!(!out.terminate);
        }
        assert!(!dir.path().join("up.txt").exists());
        assert!(!dir.path().join("abs.txt").exists());
        assert!(doc.save("note").terminate);
    }

    #[test]
    fn save_failure_is_reported_without_terminating() {
        let dir = tempfile::tempdir().unwrap();
        let doc = DocumentContext::new(dir.path().join("missing-subdir"));
        doc.update("text");
        let out = doc.save("a");
        assert!(out.text.starts_with("Error saving document: "));
        assert!(!out.terminate);
    }

    #[test]
    fn system_prompt_embeds_document() {
        assert!(system_prompt("draft v2").ends_with("The current document content is: draft v2"));
    }
}
