//! Configuration: API key, endpoint, model and deadline for the model service.
//!
//! **Interaction**: Used by `main` to build `ChatOpenAI` / `OpenAiEmbedder`.
//! CLI flags fall back to environment variables; the API key is read from the
//! environment only (`.env` is loaded by `main` before this runs).

use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use langgraph::llm::{resolve_api_key, API_KEY_VARS, DEFAULT_BASE_URL, DEFAULT_MODEL};
use langgraph::memory::DEFAULT_EMBEDDING_MODEL;
use langgraph::OpenAiConfig;

/// Model service flags shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct LlmArgs {
    /// OpenAI-compatible base URL
    #[arg(long, global = true, env = "LLM_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Chat model name
    #[arg(long, global = true, env = "LLM_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Embedding model name (rag)
    #[arg(long, global = true, env = "EMBEDDING_MODEL", default_value = DEFAULT_EMBEDDING_MODEL)]
    pub embedding_model: String,

    /// Sampling temperature; provider default when unset
    #[arg(long, global = true)]
    pub temperature: Option<f32>,

    /// Deadline for each model call, in seconds
    #[arg(long, global = true, default_value_t = 60)]
    pub timeout_secs: u64,
}

/// Resolved configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub llm: OpenAiConfig,
    pub embedding_model: String,
    pub timeout: Duration,
}

impl Config {
    /// Resolves config from environment and CLI. Caller should run
    /// `dotenv::dotenv().ok()` before this.
    pub fn from_env_and_args(args: &LlmArgs) -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok(), args)
    }

    /// Key from the first non-blank of `API_KEY_VARS` as returned by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, args: &LlmArgs) -> Result<Self> {
        Self::from_parts(resolve_api_key(lookup).unwrap_or_default(), args)
    }

    /// Same as `from_env_and_args` with an explicit key.
    pub fn from_parts(api_key: String, args: &LlmArgs) -> Result<Self> {
        if api_key.is_empty() {
            bail!(
                "no API key: set one of {} (in .env or environment)",
                API_KEY_VARS.join(", ")
            );
        }
        if args.timeout_secs == 0 {
            bail!("--timeout-secs must be at least 1");
        }
        let timeout = Duration::from_secs(args.timeout_secs);
        let mut llm = OpenAiConfig::new(api_key)
            .with_base_url(args.base_url.trim())
            .with_model(args.model.trim())
            .with_timeout(timeout);
        if let Some(t) = args.temperature {
            llm = llm.with_temperature(t);
        }
        Ok(Self {
            llm,
            embedding_model: args.embedding_model.trim().to_string(),
            timeout,
        })
    }
}
