use async_trait::async_trait;
use std::path::PathBuf;
use crate::types::{IndexedChunk, ScoredChunk};
use crate::Result;

#[async_trait]
pub trait VectorStore: Send + Sync {
    fn name(&self) -> &str;

    /// Replace the whole index with `entries`
    async fn replace_all(&self, entries: Vec<IndexedChunk>) -> Result<()>;

    /// Find the chunks closest to `embedding`, best first
    async fn find_similar(&self, embedding: &[f32], limit: usize) -> Result<Vec<ScoredChunk>>;

    async fn count(&self) -> Result<usize>;
}

/// Something that can run a full scrape and persist it as a dated batch file.
#[async_trait]
pub trait BatchProducer: Send + Sync {
    /// Returns the written batch file, or `None` when nothing was scraped.
    async fn scrape_all_news(&self) -> Result<Option<PathBuf>>;
}
