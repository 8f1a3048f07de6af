//! 文本向量化接口，用于语义检索与 RAG。
//!
//! - `Embedder`: embed(text)、embed_batch(texts)
//! - `MockEmbedder`: 测试用，返回固定维度的确定性向量
//! - `OpenAiEmbedder`: OpenAI 兼容 `/embeddings` 接口（feature `openai`）

use async_trait::async_trait;
use thiserror::Error;

/// 文本向量化 trait：将文本转为浮点向量，供 `InMemoryVectorStore` 使用。
///
/// Implementations: `MockEmbedder` (tests), `OpenAiEmbedder` (feature openai).
#[async_trait]
pub trait Embedder: Send + Sync {
    /// 将多条文本转为向量，顺序与输入一致。
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedderError>;

    /// 将一条文本转为向量；默认调用 `embed_batch`。
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedderError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbedderError("empty embedding response".to_string()))
    }
}

/// 向量化失败错误。
#[derive(Debug, Clone, Error, PartialEq)]
#[error("embedder error: {0}")]
pub struct EmbedderError(pub String);

/// Mock 向量化：根据文本生成固定维度的确定性向量，仅用于测试。
///
/// Bag-of-words hashing: each lowercase word bumps one dimension, so texts sharing
/// words score higher under cosine similarity.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimension: usize,
}

impl MockEmbedder {
    /// 新建 mock，向量维度为 `dimension`。
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut out = vec![0.0f32; self.dimension];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let mut h = DefaultHasher::new();
            word.to_lowercase().hash(&mut h);
            out[(h.finish() % self.dimension as u64) as usize] += 1.0;
        }
        out
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedderError> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }
}

#[cfg(feature = "openai")]
pub use openai::{OpenAiEmbedder, DEFAULT_EMBEDDING_MODEL};

#[cfg(feature = "openai")]
mod openai {
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use tracing::debug;

    use super::{Embedder, EmbedderError};
    use crate::llm::OpenAiConfig;

    /// Default embedding model on the Gemini OpenAI-compatible endpoint.
    pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

    /// Inputs per request.
    const BATCH_SIZE: usize = 64;

    #[derive(Serialize)]
    struct EmbeddingRequest<'a> {
        model: &'a str,
        input: &'a [String],
    }

    #[derive(Deserialize)]
    struct EmbeddingResponse {
        data: Vec<EmbeddingData>,
    }

    #[derive(Deserialize)]
    struct EmbeddingData {
        #[serde(default)]
        index: usize,
        embedding: Vec<f32>,
    }

    /// OpenAI 兼容 embeddings 客户端。
    ///
    /// Shares base URL, key and timeout with `OpenAiConfig`; `model` is the embedding model.
    #[derive(Debug, Clone)]
    pub struct OpenAiEmbedder {
        config: OpenAiConfig,
        model: String,
        client: reqwest::Client,
    }

    impl OpenAiEmbedder {
        pub fn new(config: OpenAiConfig, model: impl Into<String>) -> Self {
            Self {
                config,
                model: model.into(),
                client: reqwest::Client::new(),
            }
        }

        pub fn model(&self) -> &str {
            &self.model
        }

        async fn request(&self, input: &[String]) -> Result<Vec<Vec<f32>>, EmbedderError> {
            let url = format!("{}/embeddings", self.config.base_url);
            let res = self
                .client
                .post(&url)
                .bearer_auth(&self.config.api_key)
                .timeout(self.config.timeout)
                .json(&EmbeddingRequest {
                    model: &self.model,
                    input,
                })
                .send()
                .await
                .map_err(|e| EmbedderError(e.to_string()))?;
            let status = res.status();
            let text = res.text().await.map_err(|e| EmbedderError(e.to_string()))?;
            if !status.is_success() {
                return Err(EmbedderError(format!("HTTP {status}: {text}")));
            }
            let mut parsed: EmbeddingResponse =
                serde_json::from_str(&text).map_err(|e| EmbedderError(format!("{e}: {text}")))?;
            if parsed.data.len() != input.len() {
                return Err(EmbedderError(format!(
                    "expected {} embeddings, got {}",
                    input.len(),
                    parsed.data.len()
                )));
            }
            parsed.data.sort_by_key(|d| d.index);
            Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
        }
    }

    #[async_trait]
    impl Embedder for OpenAiEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedderError> {
            let mut out = Vec::with_capacity(texts.len());
            for batch in texts.chunks(BATCH_SIZE) {
                debug!(model = %self.model, inputs = batch.len(), "embedding request");
                out.extend(self.request(batch).await?);
            }
            Ok(out)
        }
    }
}
