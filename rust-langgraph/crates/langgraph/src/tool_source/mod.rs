//! Tool source abstraction: list tools and call a tool.
//!
//! ReAct/Agent depends on `ToolSource` instead of a concrete tool registry.
//! Implementations: `TypedToolSource<T>` (a closed `ToolSet` enum, used by every agent)
//! and `MockToolSource` (tests).

mod mock;
mod typed;

pub use mock::MockToolSource;
pub use typed::{ToolSet, TypedToolSource};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// JSON type of one tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Integer,
    Number,
    String,
    Boolean,
}

impl ParamKind {
    /// JSON Schema `type` keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::String => "string",
            ParamKind::Boolean => "boolean",
        }
    }
}

/// One named parameter of a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolParam {
    pub name: String,
    pub kind: ParamKind,
    pub description: Option<String>,
    pub required: bool,
}

impl ToolParam {
    pub fn required(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind)
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Tool specification: name, description and typed parameters.
///
/// The JSON Schema sent to the model is derived from `params` (`input_schema`).
///
/// **Interaction**: Returned by `ToolSource::list_tools()`; bound to the LLM client
/// (`ChatOpenAI::with_tools`) so the model can request calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    /// Tool name the model uses in `tool_calls`.
    pub name: String,
    /// Human-readable description for the LLM.
    pub description: String,
    pub params: Vec<ToolParam>,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
        }
    }

    /// Adds a parameter (builder).
    pub fn param(mut self, param: ToolParam) -> Self {
        self.params.push(param);
        self
    }

    /// JSON Schema object for the arguments, e.g.
    /// `{"type":"object","properties":{"a":{"type":"integer"}},"required":["a"]}`.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for p in &self.params {
            let mut prop = json!({ "type": p.kind.as_str() });
            if let Some(d) = &p.description {
                prop["description"] = Value::String(d.clone());
            }
            properties.insert(p.name.clone(), prop);
        }
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Result of a single tool call.
///
/// `terminate` asks the loop controller to stop once the current batch has run.
///
/// **Interaction**: Returned by `ToolSource::call_tool()`; ActNode maps this to
/// `ToolResult` and appends it to `ConversationState::messages`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallContent {
    /// Result text shown to the model.
    pub text: String,
    pub terminate: bool,
}

impl ToolCallContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            terminate: false,
        }
    }

    /// Result that ends the session after this batch.
    pub fn terminating(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            terminate: true,
        }
    }
}

/// Errors from listing or calling tools.
///
/// **Interaction**: Returned by `ToolSource::call_tool()`; ActNode turns every variant
/// into result text so the model can retry.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ToolSourceError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("tool execution failed: {0}")]
    Execution(String),
}

/// Tool source: list tools and call a tool.
///
/// Think side uses `list_tools()` to bind tools to the model; ActNode uses
/// `call_tool(name, args)`.
///
/// **Interaction**: Used by ActNode (call_tool) and agent builders (list_tools).
#[async_trait]
pub trait ToolSource: Send + Sync {
    /// List available tools.
    fn list_tools(&self) -> Vec<ToolSpec>;

    /// Call a tool by name with JSON arguments.
    async fn call_tool(&self, name: &str, arguments: Value)
        -> Result<ToolCallContent, ToolSourceError>;
}

#[async_trait]
impl<T: ToolSource + ?Sized> ToolSource for std::sync::Arc<T> {
    fn list_tools(&self) -> Vec<ToolSpec> {
        (**self).list_tools()
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        (**self).call_tool(name, arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_schema_lists_required_params() {
        let spec = ToolSpec::new("save", "Save the document")
            .param(ToolParam::required("filename", ParamKind::String).describe("Name for the text file"))
            .param(ToolParam::optional("overwrite", ParamKind::Boolean));
        let schema = spec.input_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["filename"]["type"], "string");
        assert_eq!(
            schema["properties"]["filename"]["description"],
            "Name for the text file"
        );
        assert_eq!(schema["properties"]["overwrite"]["type"], "boolean");
        assert_eq!(schema["required"], json!(["filename"]));
    }

    #[test]
    fn schema_without_params_is_empty_object() {
        let schema = ToolSpec::new("noop", "").input_schema();
        assert_eq!(schema["properties"], json!({}));
        assert_eq!(schema["required"], json!([]));
    }
}
