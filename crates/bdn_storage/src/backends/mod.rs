pub mod local;
pub mod memory;

pub use local::LocalDirStorage;
pub use memory::InMemoryStorage;

use bdn_core::{cosine_similarity, IndexedChunk, ScoredChunk};

/// Scores every entry against `embedding` and keeps the best `limit`.
pub(crate) fn rank(entries: &[IndexedChunk], embedding: &[f32], limit: usize) -> Vec<ScoredChunk> {
    let mut scored: Vec<ScoredChunk> = entries
        .iter()
        .map(|entry| ScoredChunk {
            chunk: entry.chunk.clone(),
            score: cosine_similarity(&entry.embedding, embedding),
        })
        .collect();
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
}
