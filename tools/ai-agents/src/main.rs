//! CLI for ai-agents: pick an agent, build its graph and run it on the terminal.
//!
//! Loads `.env`, resolves `ai_agents::Config`, sets up tracing on stderr, then
//! dispatches to the subcommand.

use std::path::PathBuf;
use std::sync::Arc;

use ai_agents::memory_chat::DEFAULT_LOG_FILE;
use ai_agents::rag::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_TOP_K};
use ai_agents::{
    arithmetic, build_retriever, Config, DocumentContext, Drafter, DrafterTool, LlmArgs, MathTool,
    MemoryChat, RagAgent, RagOptions, RagTool, SimpleChat, StdinInput,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use langgraph::memory::OpenAiEmbedder;
use langgraph::{ChatOpenAI, ToolSet};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ai-agents")]
#[command(about = "Conversational tool-calling agents (Gemini / OpenAI-compatible)")]
struct Cli {
    #[command(flatten)]
    llm: LlmArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Draft a document with update/save tools
    Draft {
        /// Directory the document is saved into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Chat with memory; writes a transcript on exit
    Chat {
        /// Transcript file
        #[arg(long, default_value = DEFAULT_LOG_FILE)]
        log: PathBuf,
    },
    /// Ask questions about a PDF or text document
    Rag {
        /// Document to index (.pdf or plain text)
        #[arg(long)]
        document: PathBuf,
        /// JSON index cache; reused when it matches, written otherwise
        #[arg(long)]
        index: Option<PathBuf>,
        /// What the document is about (used in prompts); defaults to the file stem
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
        #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
        chunk_overlap: usize,
    },
    /// Solve an arithmetic request with add/subtract/multiply tools
    Math {
        /// Request text; a multi-step default is used when omitted
        prompt: Option<String>,
    },
    /// Stateless chat: every line is sent alone
    Simple,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing();

    let cfg = Config::from_env_and_args(&cli.llm)?;
    let chat_llm = || ChatOpenAI::new(cfg.llm.clone());

    match cli.command {
        Command::Draft { dir } => {
            let llm = chat_llm().with_tools(DrafterTool::specs());
            let drafter = Drafter::new(
                Box::new(llm),
                Arc::new(StdinInput::new()),
                DocumentContext::new(dir),
                cfg.timeout,
            )
            .context("build drafter graph")?;
            if let Err(e) = drafter.run().await {
                eprintln!("\nError: {e}");
            }
        }
        Command::Chat { log } => {
            let mut chat = MemoryChat::new(Box::new(chat_llm()), cfg.timeout, log)
                .context("build chat graph")?;
            chat.run(&StdinInput::new()).await?;
        }
        Command::Rag {
            document,
            index,
            subject,
            top_k,
            chunk_size,
            chunk_overlap,
        } => {
            let embedder = Arc::new(OpenAiEmbedder::new(cfg.llm.clone(), cfg.embedding_model.clone()));
            let options = RagOptions {
                chunk_size,
                chunk_overlap,
                top_k,
                embedding_model: cfg.embedding_model.clone(),
            };
            let retriever = build_retriever(&document, embedder, &options, index.as_deref())
                .await
                .with_context(|| format!("index {}", document.display()))?;
            let subject = subject.unwrap_or_else(|| {
                document
                    .file_stem()
                    .map(|s| s.to_string_lossy().replace(['_', '-'], " "))
                    .unwrap_or_else(|| "loaded".to_string())
            });
            let llm = chat_llm().with_tools(RagTool::specs());
            let agent = RagAgent::new(Box::new(llm), retriever, subject, cfg.timeout)
                .context("build rag graph")?;
            agent.run(&StdinInput::new()).await?;
        }
        Command::Math { prompt } => {
            let llm = chat_llm().with_tools(MathTool::specs());
            let graph = arithmetic::math_agent(Box::new(llm), cfg.timeout).context("build math graph")?;
            let prompt = prompt.unwrap_or_else(|| arithmetic::DEFAULT_PROMPT.to_string());
            if let Err(e) = arithmetic::run_math(&graph, &prompt).await {
                eprintln!("\nError: {e}");
            }
        }
        Command::Simple => {
            let chat = SimpleChat::new(Box::new(chat_llm()), cfg.timeout).context("build chat graph")?;
            chat.run(&StdinInput::new()).await?;
        }
    }
    Ok(())
}
