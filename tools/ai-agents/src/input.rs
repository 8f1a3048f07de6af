//! Line input for interactive agents: stdin in the CLI, a script in tests.

use std::collections::VecDeque;
use std::io::Write;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

/// Source of user turns.
///
/// **Interaction**: Read by the drafter's agent node and by the chat / rag loops.
#[async_trait]
pub trait UserInput: Send + Sync {
    /// Shows `prompt` and returns the next line without its line ending;
    /// `None` at end of input.
    async fn read_line(&self, prompt: &str) -> std::io::Result<Option<String>>;
}

/// Reads lines from the process's stdin; prompts go to stdout.
pub struct StdinInput {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl StdinInput {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserInput for StdinInput {
    async fn read_line(&self, prompt: &str) -> std::io::Result<Option<String>> {
        {
            let mut out = std::io::stdout();
            out.write_all(prompt.as_bytes())?;
            out.flush()?;
        }
        let mut lines = self.lines.lock().await;
        let line = lines.next_line().await?;
        Ok(line.map(|l| l.trim_end_matches('\r').to_string()))
    }
}

/// Replays fixed lines, then reports end of input. Records every prompt shown.
#[derive(Default)]
pub struct ScriptedInput {
    lines: std::sync::Mutex<VecDeque<String>>,
    prompts: std::sync::Mutex<Vec<String>>,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: std::sync::Mutex::new(lines.into_iter().map(Into::into).collect()),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl UserInput for ScriptedInput {
    async fn read_line(&self, prompt: &str) -> std::io::Result<Option<String>> {
        if let Ok(mut p) = self.prompts.lock() {
            p.push(prompt.to_string());
        }
        Ok(self.lines.lock().ok().and_then(|mut l| l.pop_front()))
    }
}
