//! Retriever: embeds chunks into an in-memory index and returns the top k for a query.
//!
//! The index can be cached as JSON (`RagIndex`) and reused while the source document,
//! embedding model and chunking settings stay the same.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use langgraph::memory::{Embedder, InMemoryVectorStore, SearchHit, VectorEntry};
use langgraph::{ParamKind, ToolCallContent, ToolParam, ToolSet, ToolSourceError, ToolSpec};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::RagError;

pub const DEFAULT_TOP_K: usize = 5;

/// Serialized index: chunk vectors plus what they were built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagIndex {
    pub source: String,
    pub embedding_model: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub entries: Vec<VectorEntry>,
}

impl RagIndex {
    pub fn load(path: &Path) -> Result<Self, RagError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| RagError::Index(format!("read {}: {e}", path.display())))?;
        serde_json::from_str(&text).map_err(|e| RagError::Index(format!("parse {}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<(), RagError> {
        let text = serde_json::to_string(self).map_err(|e| RagError::Index(e.to_string()))?;
        std::fs::write(path, text).map_err(|e| RagError::Index(format!("write {}: {e}", path.display())))
    }

    /// True when this index was built with the given settings.
    pub fn matches(&self, source: &str, embedding_model: &str, chunk_size: usize, chunk_overlap: usize) -> bool {
        self.source == source
            && self.embedding_model == embedding_model
            && self.chunk_size == chunk_size
            && self.chunk_overlap == chunk_overlap
    }
}

/// Top-k cosine retriever over document chunks.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    store: InMemoryVectorStore,
    top_k: usize,
}

impl Retriever {
    /// Embeds every chunk.
    pub async fn build(embedder: Arc<dyn Embedder>, chunks: Vec<String>, top_k: usize) -> Result<Self, RagError> {
        let vectors = embedder.embed_batch(&chunks).await?;
        let store = InMemoryVectorStore::new();
        for (chunk, vector) in chunks.into_iter().zip(vectors) {
            store.add(chunk, vector);
        }
        info!(chunks = store.len(), "vector index built");
        Ok(Self { embedder, store, top_k })
    }

    /// Reuses vectors from a cached index.
    pub fn from_entries(embedder: Arc<dyn Embedder>, entries: Vec<VectorEntry>, top_k: usize) -> Self {
        Self {
            embedder,
            store: InMemoryVectorStore::from_entries(entries),
            top_k,
        }
    }

    pub fn entries(&self) -> Vec<VectorEntry> {
        self.store.entries()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Most similar chunks for `query`, best first.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchHit>, RagError> {
        if self.store.is_empty() {
            return Ok(Vec::new());
        }
        let vector = self.embedder.embed(query).await?;
        let hits = self.store.search(&vector, self.top_k);
        debug!(query, hits = hits.len(), "retrieved");
        Ok(hits)
    }
}

/// `Document 1:\n<chunk>` blocks separated by a blank line.
pub fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, h)| format!("Document {}:\n{}", i + 1, h.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Retriever plus the name of the document it searches.
pub struct RagContext {
    pub retriever: Retriever,
    pub subject: String,
}

/// The RAG agent's single tool.
#[derive(Debug, Deserialize)]
#[serde(tag = "tool", content = "args", rename_all = "snake_case")]
pub enum RagTool {
    RetrieverTool { query: String },
}

#[async_trait]
impl ToolSet for RagTool {
    type Context = RagContext;

    fn specs() -> Vec<ToolSpec> {
        vec![ToolSpec::new(
            "retriever_tool",
            "This tool searches and returns information from the loaded document.",
        )
        .param(ToolParam::required("query", ParamKind::String).describe("What to look up"))]
    }

    async fn invoke(self, ctx: &RagContext) -> Result<ToolCallContent, ToolSourceError> {
        match self {
            RagTool::RetrieverTool { query } => {
                let hits = ctx
                    .retriever
                    .retrieve(&query)
                    .await
                    .map_err(|e| ToolSourceError::Execution(e.to_string()))?;
                if hits.is_empty() {
                    return Ok(ToolCallContent::text(format!(
                        "I found no relevant information in the {} document.",
                        ctx.subject
                    )));
                }
                Ok(ToolCallContent::text(format_hits(&hits)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use langgraph::memory::MockEmbedder;
    use langgraph::{ToolSource, TypedToolSource};
    use serde_json::json;

    use super::*;

    fn chunks() -> Vec<String> {
        vec![
            "The stock market rose in March".to_string(),
            "Bananas are yellow fruit".to_string(),
            "Tech stocks led the market rally".to_string(),
        ]
    }

    #[tokio::test]
    async fn retrieve_ranks_shared_words_first() {
        let r = Retriever::build(Arc::new(MockEmbedder::new(1024)), chunks(), 2).await.unwrap();
        let hits = r.retrieve("stock market").await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].content, chunks()[0]);
        assert!(hits.iter().all(|h| !h.content.contains("Bananas")));
    }

    #[tokio::test]
    async fn retriever_tool_formats_documents() {
        let retriever = Retriever::build(Arc::new(MockEmbedder::default()), chunks(), 2).await.unwrap();
        let src = TypedToolSource::<RagTool>::new(RagContext {
            retriever,
            subject: "market".into(),
        });
        let out = src
            .call_tool("retriever_tool", json!({"query": "market"}))
            .await
            .unwrap();
        assert!(out.text.starts_with("Document 1:\n"));
        assert!(out.text.contains("\n\nDocument 2:\n"));
    }

    #[tokio::test]
    async fn empty_index_reports_no_information() {
        let retriever = Retriever::from_entries(Arc::new(MockEmbedder::default()), Vec::new(), 5);
        let src = TypedToolSource::<RagTool>::new(RagContext {
            retriever,
            subject: "stock market performance story 2025".into(),
        });
        let out = src
            .call_tool("retriever_tool", json!({"query": "anything"}))
            .await
            .unwrap();
        assert_eq!(
            out.text,
            "I found no relevant information in the stock market performance story 2025 document."
        );
    }

    #[test]
    fn index_round_trips_through_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        let index = RagIndex {
            source: "doc.pdf".into(),
            embedding_model: "m".into(),
            chunk_size: 1000,
            chunk_overlap: 200,
            entries: vec![VectorEntry {
                content: "x".into(),
                vector: vec![0.5, 0.25],
            }],
        };
        index.save(&path).unwrap();
        let loaded = RagIndex::load(&path).unwrap();
        assert_eq!(loaded, index);
        assert!(loaded.matches("doc.pdf", "m", 1000, 200));
        assert!(!loaded.matches("doc.pdf", "other", 1000, 200));
    }
}
