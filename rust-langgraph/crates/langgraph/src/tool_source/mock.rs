//! Mock tool source for tests: fixed replies per tool, call capture.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// Mock ToolSource: each registered tool answers with a fixed reply.
///
/// **Interaction**: Used as `Box<dyn ToolSource>` by ActNode in tests.
#[derive(Default)]
pub struct MockToolSource {
    specs: Vec<ToolSpec>,
    replies: HashMap<String, Result<ToolCallContent, ToolSourceError>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockToolSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `spec` answering with `reply`.
    pub fn with_tool(mut self, spec: ToolSpec, reply: ToolCallContent) -> Self {
        self.replies.insert(spec.name.clone(), Ok(reply));
        self.specs.push(spec);
        self
    }

    /// Registers `spec` whose every call fails with `error`.
    pub fn with_failing_tool(mut self, spec: ToolSpec, error: ToolSourceError) -> Self {
        self.replies.insert(spec.name.clone(), Err(error));
        self.specs.push(spec);
        self
    }

    /// `(name, arguments)` of every call, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ToolSource for MockToolSource {
    fn list_tools(&self) -> Vec<ToolSpec> {
        self.specs.clone()
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        if let Ok(mut c) = self.calls.lock() {
            c.push((name.to_string(), arguments));
        }
        self.replies
            .get(name)
            .cloned()
            .unwrap_or_else(|| Err(ToolSourceError::NotFound(name.to_string())))
    }
}
