//! 内存向量索引：按余弦相似度检索。
//!
//! - `InMemoryVectorStore`: add(content, vector)、search(query, top_k)
//! - `VectorEntry`: 存储项，可序列化以便缓存索引
//! - `SearchHit`: 检索结果（content, score）

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// 单条向量：内容与向量。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorEntry {
    pub content: String,
    pub vector: Vec<f32>,
}

/// 单条检索结果：内容与相似度分数，越高越相关。
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub content: String,
    pub score: f32,
}

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (dot / (na * nb)).clamp(-1.0, 1.0)
}

/// 向量索引：内存中存储 `VectorEntry`，暴力余弦相似度检索。
///
/// Callers use an `Embedder` to produce vectors for `add` and for the query in `search`.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    inner: RwLock<Vec<VectorEntry>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from previously exported entries.
    pub fn from_entries(entries: Vec<VectorEntry>) -> Self {
        Self {
            inner: RwLock::new(entries),
        }
    }

    pub fn add(&self, content: impl Into<String>, vector: Vec<f32>) {
        let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
        guard.push(VectorEntry {
            content: content.into(),
            vector,
        });
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|g| g.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every entry, in insertion order.
    pub fn entries(&self) -> Vec<VectorEntry> {
        self.inner.read().map(|g| g.clone()).unwrap_or_default()
    }

    /// 按查询向量检索最相似的 `top_k` 条，按分数降序；分数相同保持插入顺序。
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<SearchHit> {
        let guard = self.inner.read().unwrap_or_else(|p| p.into_inner());
        let mut scored: Vec<(f32, &VectorEntry)> = guard
            .iter()
            .map(|e| (cosine_similarity(&e.vector, query), e))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(top_k)
            .map(|(score, e)| SearchHit {
                content: e.content.clone(),
                score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_orders_by_similarity() {
        let m = InMemoryVectorStore::new();
        m.add("a", vec![1.0, 0.0, 0.0]);
        m.add("b", vec![0.9, 0.1, 0.0]);
        m.add("c", vec![0.0, 0.0, 1.0]);
        let out = m.search(&[1.0, 0.0, 0.0], 2);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].content, "a");
        assert_eq!(out[1].content, "b");
        assert!(out[0].score >= out[1].score);
    }

    #[test]
    fn mismatched_or_zero_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn entries_round_trip_through_from_entries() {
        let m = InMemoryVectorStore::new();
        m.add("x", vec![0.5, 0.5]);
        let copy = InMemoryVectorStore::from_entries(m.entries());
        assert_eq!(copy.len(), 1);
        assert_eq!(copy.search(&[1.0, 1.0], 5)[0].content, "x");
    }
}
