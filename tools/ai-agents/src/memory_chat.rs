//! Memory chat: the whole history goes to the model every turn, and a transcript
//! is written when the session ends.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use langgraph::{AgentError, CompilationError, CompiledStateGraph, ConversationState, LlmClient, Message};
use tracing::{info, warn};

use crate::input::UserInput;
use crate::simple_chat::{chat_graph, EXIT_WORD, INPUT_PROMPT};

/// Default transcript file.
pub const DEFAULT_LOG_FILE: &str = "logging.txt";

/// Transcript text: header, `You:` / `AI:` lines, footer.
///
/// System and tool messages are left out.
pub fn format_transcript(state: &ConversationState) -> String {
    let mut out = String::from("Your Conversational Log:\n");
    for m in &state.messages {
        match m {
            Message::User(text) => {
                out.push_str(&format!("You: {text}\n"));
            }
            Message::Assistant { content, .. } => {
                out.push_str(&format!("AI: {content}\n\n"));
            }
            Message::System(_) | Message::Tool(_) => {}
        }
    }
    out.push_str("End of Conversation");
    out
}

/// Writes `format_transcript(state)` to `path`, replacing any previous file.
pub fn write_transcript(path: &Path, state: &ConversationState) -> Result<()> {
    std::fs::write(path, format_transcript(state))
        .with_context(|| format!("write transcript {}", path.display()))
}

/// Chat session that keeps its history.
pub struct MemoryChat {
    graph: CompiledStateGraph<ConversationState>,
    history: ConversationState,
    log_path: PathBuf,
}

impl MemoryChat {
    pub fn new(
        llm: Box<dyn LlmClient>,
        timeout: Duration,
        log_path: impl Into<PathBuf>,
    ) -> Result<Self, CompilationError> {
        Ok(Self {
            graph: chat_graph(llm, timeout)?,
            history: ConversationState::new(),
            log_path: log_path.into(),
        })
    }

    pub fn history(&self) -> &ConversationState {
        &self.history
    }

    /// Appends `line`, runs the model on the full history and keeps its reply.
    ///
    /// On failure the history is left as it was before the turn.
    pub async fn turn(&mut self, line: &str) -> Result<String, AgentError> {
        let mut state = self.history.clone();
        state.push(Message::user(line));
        let out = self.graph.invoke(state).await?;
        self.history = out;
        Ok(self.history.last_assistant_content().to_string())
    }

    /// Reads lines until `exit` or end of input, then writes the transcript.
    ///
    /// A model-service error ends the session; the transcript of the turns so far
    /// is still written.
    pub async fn run(&mut self, input: &dyn UserInput) -> Result<()> {
        while let Some(line) = input.read_line(INPUT_PROMPT).await? {
            if line.trim() == EXIT_WORD {
                break;
            }
            match self.turn(&line).await {
                Ok(reply) => {
                    println!("\nAI: {reply}");
                }
                Err(e) => {
                    warn!(error = %e, "chat turn failed, ending session");
                    eprintln!("\nError: {e}");
                    break;
                }
            }
        }
        write_transcript(&self.log_path, &self.history)?;
        info!(path = %self.log_path.display(), messages = self.history.len(), "transcript written");
        println!("Conversation saved to {}", self.log_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_format() {
        let mut s = ConversationState::from_user("hi");
        s.push(Message::assistant("hello"));
        s.push(Message::user("bye"));
        s.push(Message::assistant("see you"));
        assert_eq!(
            format_transcript(&s),
            "Your Conversational Log:\nYou: hi\nAI: hello\n\nYou: bye\nAI: see you\n\nEnd of Conversation"
        );
    }

    #[test]
    fn empty_transcript_has_header_and_footer() {
        assert_eq!(
            format_transcript(&ConversationState::new()),
            "Your Conversational Log:\nEnd of Conversation"
        );
    }
}
