//! Closed tool sets: an enum of tool requests dispatched by one exhaustive `match`.
//!
//! A `ToolSet` is deserialized from `{"tool": <name>, "args": {...}}`, so an agent's tools
//! are declared as serde-tagged enum variants:
//!
//! ```ignore
//! #[derive(Deserialize)]
//! #[serde(tag = "tool", content = "args", rename_all = "snake_case")]
//! enum MathTool {
//!     Add { a: i64, b: i64 },
//!     Subtract { a: i64, b: i64 },
//! }
//! ```
//!
//! `TypedToolSource<T>` adapts such a set to `ToolSource` and owns its session context.

use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::{ToolCallContent, ToolSource, ToolSourceError, ToolSpec};

/// A closed set of tools.
///
/// **Interaction**: Wrapped by `TypedToolSource<T>`; `invoke` runs with the context the
/// source owns (e.g. the drafter's document).
#[async_trait]
pub trait ToolSet: DeserializeOwned + Send + 'static {
    /// Session state the tools read or mutate.
    type Context: Send + Sync + 'static;

    /// Specs of every variant, in the order shown to the model.
    fn specs() -> Vec<ToolSpec>;

    /// Runs this request against `ctx`.
    async fn invoke(self, ctx: &Self::Context) -> Result<ToolCallContent, ToolSourceError>;
}

/// `ToolSource` over a `ToolSet` enum.
pub struct TypedToolSource<T: ToolSet> {
    context: T::Context,
    specs: Vec<ToolSpec>,
    _set: PhantomData<fn() -> T>,
}

impl<T: ToolSet> TypedToolSource<T> {
    pub fn new(context: T::Context) -> Self {
        Self {
            context,
            specs: T::specs(),
            _set: PhantomData,
        }
    }

    pub fn context(&self) -> &T::Context {
        &self.context
    }

    /// Parses `name` + `arguments` into a request. Unknown names yield `NotFound`;
    /// arguments that do not fit the variant yield `InvalidInput`.
    pub fn parse(&self, name: &str, arguments: Value) -> Result<T, ToolSourceError> {
        if !self.specs.iter().any(|s| s.name == name) {
            return Err(ToolSourceError::NotFound(name.to_string()));
        }
        let args = if arguments.is_null() { json!({}) } else { arguments };
        serde_json::from_value(json!({ "tool": name, "args": args }))
            .map_err(|e| ToolSourceError::InvalidInput(format!("{name}: {e}")))
    }
}

#[async_trait]
impl<T: ToolSet> ToolSource for TypedToolSource<T> {
    fn list_tools(&self) -> Vec<ToolSpec> {
        self.specs.clone()
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let request = self.parse(name, arguments)?;
        request.invoke(&self.context).await
    }
}
