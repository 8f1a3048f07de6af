//! Memory: embedder and in-memory vector index for retrieval.

mod embedder;
mod vector_store;

pub use embedder::{Embedder, EmbedderError, MockEmbedder};
#[cfg(feature = "openai")]
pub use embedder::{OpenAiEmbedder, DEFAULT_EMBEDDING_MODEL};
pub use vector_store::{InMemoryVectorStore, SearchHit, VectorEntry};
