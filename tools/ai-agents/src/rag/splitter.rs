//! Recursive character splitter (aligns with LangChain `RecursiveCharacterTextSplitter`).
//!
//! Tries separators in order (`"\n\n"`, `"\n"`, `" "`, `""`): pieces that fit are merged
//! into chunks of at most `chunk_size` characters with up to `chunk_overlap`
//! characters carried over; pieces that are still too long are split again with the
//! next separator.

use std::collections::VecDeque;

use super::RagError;

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TextSplitter {
    /// Fails unless `0 < chunk_size` and `chunk_overlap < chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, RagError> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(RagError::Config(format!(
                "chunk overlap ({chunk_overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
            ..Self::default()
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Splits `text` into trimmed, non-empty chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, rest) = match separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s.as_str()))
        {
            Some(i) => (separators[i].as_str(), &separators[i + 1..]),
            None => ("", &separators[separators.len()..]),
        };
        let pieces: Vec<String> = if separator.is_empty() {
            text.chars().map(String::from).collect()
        } else {
            text.split(separator)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect()
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<String> = Vec::new();
        for piece in pieces {
            if char_len(&piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting, separator));
                fitting.clear();
            }
            if rest.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_with(&piece, rest));
            }
        }
        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting, separator));
        }
        chunks
    }

    /// Greedily joins `pieces` with `separator`, keeping a tail of up to
    /// `chunk_overlap` characters as the start of the next chunk.
    fn merge(&self, pieces: &[String], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut out = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        let emit = |current: &VecDeque<&str>, out: &mut Vec<String>| {
            let joined = current.iter().copied().collect::<Vec<_>>().join(separator);
            let trimmed = joined.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        };

        for piece in pieces {
            let len = char_len(piece);
            let joint = if current.is_empty() { 0 } else { sep_len };
            if total + len + joint > self.chunk_size && !current.is_empty() {
                emit(&current, &mut out);
                loop {
                    let joint = if current.is_empty() { 0 } else { sep_len };
                    let too_long = total > 0 && total + len + joint > self.chunk_size;
                    if total <= self.chunk_overlap && !too_long {
                        break;
                    }
                    let Some(first) = current.pop_front() else {
                        break;
                    };
                    let joint = if current.is_empty() { 0 } else { sep_len };
                    total -= char_len(first) + joint;
                }
            }
            let joint = if current.is_empty() { 0 } else { sep_len };
            current.push_back(piece);
            total += len + joint;
        }
        emit(&current, &mut out);
        out
    }
}
