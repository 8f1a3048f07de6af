//! OpenAI 兼容的 LLM 客户端（Chat Completions API），支持 tool calling。
//!
//! Works against any OpenAI-compatible endpoint; the defaults target Google's
//! Gemini OpenAI-compatible API (`gemini-2.0-flash`).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{LlmClient, LlmError, LlmResponse};
use crate::message::Message;
use crate::state::ToolCall;
use crate::tool_source::ToolSpec;

/// Default base URL: Gemini's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
/// Default chat model.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Variables checked for the API key, in order.
pub const API_KEY_VARS: [&str; 3] = ["LLM_API_KEY", "GOOGLE_API_KEY", "OPENAI_API_KEY"];

/// First non-blank value among `API_KEY_VARS`, trimmed. `lookup` is usually
/// `|k| std::env::var(k).ok()`.
pub fn resolve_api_key(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|k| lookup(k))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// OpenAI 兼容配置。
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API Key.
    pub api_key: String,
    /// Base URL without trailing slash, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// 模型 ID，如 `gemini-2.0-flash`、`gpt-4o-mini`。
    pub model: String,
    /// Sampling temperature; omitted from the request when `None`.
    pub temperature: Option<f32>,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// 请求体中 messages 项（OpenAI 格式）。
#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: WireFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction,
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct RequestBody {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

fn to_wire(message: &Message) -> WireMessage {
    let mut wire = WireMessage {
        role: message.role().as_str(),
        content: Some(message.content().to_string()),
        tool_calls: None,
        tool_call_id: None,
        name: None,
    };
    match message {
        Message::Assistant { content, tool_calls } if !tool_calls.is_empty() => {
            if content.is_empty() {
                wire.content = None;
            }
            wire.tool_calls = Some(
                tool_calls
                    .iter()
                    .map(|tc| WireToolCall {
                        id: Some(tc.id.clone()),
                        kind: function_type(),
                        function: WireFunctionCall {
                            name: tc.name.clone(),
                            arguments: tc.arguments.clone(),
                        },
                    })
                    .collect(),
            );
        }
        Message::Tool(r) => {
            wire.tool_call_id = Some(r.call_id.clone());
            wire.name = Some(r.name.clone());
        }
        _ => {}
    }
    wire
}

fn parse_response(text: &str) -> Result<LlmResponse, LlmError> {
    let parsed: ResponseBody =
        serde_json::from_str(text).map_err(|e| LlmError::Parsing(format!("{e}: {text}")))?;
    let message = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Parsing("response has no choices".to_string()))?
        .message;
    let tool_calls = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| ToolCall {
            id: tc.id.unwrap_or_default(),
            name: tc.function.name,
            arguments: tc.function.arguments,
        })
        .collect();
    Ok(LlmResponse {
        content: message.content.unwrap_or_default(),
        tool_calls,
    })
}

/// OpenAI-compatible Chat Completions client implementing `LlmClient`.
///
/// Optionally bound to a tool list (`with_tools`) so the model may answer with
/// `tool_calls`. Aligns with LangChain's `llm.bind_tools(tools)`.
///
/// **Interaction**: Implements `LlmClient`; used by ThinkNode.
#[derive(Debug, Clone)]
pub struct ChatOpenAI {
    config: OpenAiConfig,
    client: reqwest::Client,
    tools: Vec<ToolSpec>,
}

impl ChatOpenAI {
    /// 使用给定配置构造客户端。
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            tools: Vec::new(),
        }
    }

    /// Set tools for this client (enables tool_calls in responses).
    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    fn build_body(&self, messages: &[Message]) -> RequestBody {
        RequestBody {
            model: self.config.model.clone(),
            messages: messages.iter().map(to_wire).collect(),
            tools: self
                .tools
                .iter()
                .map(|t| WireTool {
                    kind: "function",
                    function: WireFunction {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: t.input_schema(),
                    },
                })
                .collect(),
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, LlmError> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let body = self.build_body(messages);
        debug!(model = %self.config.model, messages = messages.len(), tools = self.tools.len(), "chat completion request");
        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    LlmError::Network(e.to_string())
                }
            })?;
        let status = res.status();
        let text = res
            .text()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(LlmError::from_status(status.as_u16(), text));
        }
        parse_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ToolResult;
    use crate::tool_source::{ParamKind, ToolParam};

    #[test]
    fn body_serializes_tool_messages_and_tools() {
        let llm = ChatOpenAI::new(OpenAiConfig::new("k")).with_tools(vec![ToolSpec::new(
            "add",
            "adds two numbers",
        )
        .param(ToolParam::required("a", ParamKind::Integer))
        .param(ToolParam::required("b", ParamKind::Integer))]);
        let messages = vec![
            Message::system("sys"),
            Message::user("add 3 and 7"),
            Message::assistant_with_tools("", vec![ToolCall::new("c1", "add", r#"{"a":3,"b":7}"#)]),
            Message::tool(ToolResult::new("c1", "add", "10")),
        ];
        let v = serde_json::to_value(llm.build_body(&messages)).unwrap();
        assert_eq!(v["model"], "gemini-2.0-flash");
        assert_eq!(v["messages"][0]["role"], "system");
        assert!(v["messages"][2].get("content").is_none());
        assert_eq!(v["messages"][2]["tool_calls"][0]["id"], "c1");
        assert_eq!(v["messages"][2]["tool_calls"][0]["type"], "function");
        assert_eq!(v["messages"][3]["role"], "tool");
        assert_eq!(v["messages"][3]["tool_call_id"], "c1");
        assert_eq!(v["tools"][0]["function"]["name"], "add");
        assert_eq!(v["tools"][0]["function"]["parameters"]["required"][1], "b");
        assert!(v.get("temperature").is_none());
    }

    #[test]
    fn parse_response_with_tool_calls() {
        let text = r#"{"choices":[{"message":{"role":"assistant","content":null,
            "tool_calls":[{"id":"call_1","type":"function","function":{"name":"add","arguments":"{\"a\":3,\"b\":7}"}}]}}]}"#;
        let r = parse_response(text).unwrap();
        assert_eq!(r.content, "");
        assert_eq!(r.tool_calls, vec![ToolCall::new("call_1", "add", r#"{"a":3,"b":7}"#)]);
    }

    #[test]
    fn parse_response_without_id_leaves_it_empty() {
        let text = r#"{"choices":[{"message":{"content":"x","tool_calls":[{"function":{"name":"save","arguments":"{}"}}]}}]}"#;
        let r = parse_response(text).unwrap();
        assert_eq!(r.tool_calls[0].id, "");
        assert_eq!(r.content, "x");
    }

    #[test]
    fn parse_response_without_choices_fails() {
        let err = parse_response(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, LlmError::Parsing(_)));
    }

    #[test]
    fn blank_api_key_falls_through_to_next_variable() {
        let vars = [("LLM_API_KEY", "  "), ("GOOGLE_API_KEY", " gkey "), ("OPENAI_API_KEY", "okey")];
        let lookup = |k: &str| vars.iter().find(|(n, _)| *n == k).map(|(_, v)| v.to_string());
        assert_eq!(resolve_api_key(lookup).as_deref(), Some("gkey"));
        assert_eq!(resolve_api_key(|_| Some(String::new())), None);
        assert_eq!(resolve_api_key(|_| None), None);
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let cfg = OpenAiConfig::new("k").with_base_url("http://localhost:8080/v1/");
        assert_eq!(cfg.base_url, "http://localhost:8080/v1");
    }
}
