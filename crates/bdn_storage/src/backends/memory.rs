use async_trait::async_trait;
use bdn_core::{IndexedChunk, Result, ScoredChunk, VectorStore};
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::{BackendConfig, StorageBackend};

pub struct MemoryStore {
    collection: String,
    entries: Vec<IndexedChunk>,
}

impl MemoryStore {
    pub fn new(collection: String) -> Self {
        Self {
            collection,
            entries: Vec::new(),
        }
    }

    pub fn replace_all(&mut self, entries: Vec<IndexedChunk>) {
        tracing::debug!("Replacing {} entries in collection {}", entries.len(), self.collection);
        self.entries = entries;
    }

    pub fn find_similar(&self, embedding: &[f32], limit: usize) -> Vec<ScoredChunk> {
        super::rank(&self.entries, embedding, limit)
    }
}

/// Vector index kept only in process memory.
pub struct InMemoryStorage {
    store: Arc<RwLock<MemoryStore>>,
}

impl InMemoryStorage {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::new(config.collection.clone()))),
        }
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    fn get_error_message() -> &'static str {
        "Memory storage should be available"
    }

    async fn open(config: &BackendConfig) -> Result<Self> {
        Ok(Self::new(config))
    }
}

#[async_trait]
impl VectorStore for InMemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn replace_all(&self, entries: Vec<IndexedChunk>) -> Result<()> {
        let mut store = self.store.write().await;
        store.replace_all(entries);
        Ok(())
    }

    async fn find_similar(&self, embedding: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        let store = self.store.read().await;
        Ok(store.find_similar(embedding, limit))
    }


    async fn count(&self) -> Result<usize> {
        Ok(self.store.read().await.entries.len())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use bdn_core::{ChunkMetadata, Source, TextChunk};

    pub(crate) fn entry(id: &str, source: Source, embedding: Vec<f32>) -> IndexedChunk {
        IndexedChunk {
            chunk: TextChunk {
                id: id.to_string(),
                text: format!("chunk {}", id),
                metadata: ChunkMetadata {
                    title: format!("Title {}", id),
                    source,
                    date: "2025-01-02".to_string(),
                    url: format!("https://example.com/{}", id),
                },
                chunk_index: 0,
                start: 0,
            },
            embedding,
        }
    }

    #[tokio::test]
    async fn test_memory_storage_ranks_by_similarity() {
        let storage = InMemoryStorage::new(&BackendConfig::default());
        storage
            .replace_all(vec![
                entry("far", Source::DailyStar, vec![0.0, 1.0]),
                entry("near", Source::ProthomAloEnglish, vec![1.0, 0.1]),
                entry("mid", Source::DailyStar, vec![1.0, 1.0]),
            ])
            .await
            .unwrap();

        let similar = storage.find_similar(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(similar.len(), 2);
        assert_eq!(similar[0].chunk.id, "near");
        assert_eq!(similar[1].chunk.id, "mid");
        assert!(similar[0].score >= similar[1].score);
    }

    #[tokio::test]
    async fn test_replace_all_drops_previous_entries() {
        let storage = InMemoryStorage::new(&BackendConfig::default());
        storage.replace_all(vec![entry("old", Source::DailyStar, vec![1.0])]).await.unwrap();
        storage.replace_all(vec![entry("new", Source::ProthomAloEnglish, vec![1.0])]).await.unwrap();

        assert_eq!(storage.count().await.unwrap(), 1);
        let remaining = storage.find_similar(&[1.0], 10).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].chunk.id, "new");
        assert_eq!(remaining[0].chunk.metadata.source, Source::ProthomAloEnglish);
    }
}
