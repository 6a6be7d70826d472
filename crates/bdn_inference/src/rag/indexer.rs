use std::sync::Arc;
use bdn_core::{Article, InferenceModel, Result, VectorStore};
use tracing::info;
use crate::embeddings::EmbeddingGenerator;
use super::documents::to_documents;
use super::splitter::RecursiveSplitter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    pub articles: usize,
    pub chunks: usize,
}

/// Turns an article batch into the contents of the vector store.
pub struct Indexer {
    splitter: RecursiveSplitter,
    embeddings: EmbeddingGenerator,
    store: Arc<dyn VectorStore>,
}

impl Indexer {
    pub fn new(
        model: Arc<dyn InferenceModel>,
        store: Arc<dyn VectorStore>,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Self {
        Self {
            splitter: RecursiveSplitter::new(chunk_size, chunk_overlap),
            embeddings: EmbeddingGenerator::new(model),
            store,
        }
    }

    /// Composes, splits and embeds `articles`, then replaces the store
    /// contents. The store is left untouched when embedding fails.
    pub async fn process(&self, articles: &[Article]) -> Result<IndexStats> {
        let documents = to_documents(articles);
        let chunks: Vec<_> = documents
            .iter()
            .flat_map(|document| self.splitter.split_document(document))
            .collect();
        info!("✂️ Split {} articles into {} chunks", documents.len(), chunks.len());

        let indexed = self.embeddings.embed_chunks(chunks).await?;
        let stats = IndexStats {
            articles: articles.len(),
            chunks: indexed.len(),
        };

        self.store.replace_all(indexed).await?;
        info!("📚 Vector store ({}) rebuilt with {} chunks", self.store.name(), stats.chunks);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DummyModel;
    use crate::rag::test_support::{article, FailingModel};
    use bdn_core::{Source, TextChunk};
    use bdn_storage::{BackendConfig, InMemoryStorage, StorageBackend};

    async fn store() -> Arc<dyn VectorStore> {
        Arc::new(InMemoryStorage::open(&BackendConfig::default()).await.unwrap())
    }

    async fn chunks_from(store: &Arc<dyn VectorStore>, source: Source) -> Vec<TextChunk> {
        store
            .find_similar(&[1.0], usize::MAX)
            .await
            .unwrap()
            .into_iter()
            .map(|scored| scored.chunk)
            .filter(|chunk| chunk.metadata.source == source)
            .collect()
    }

    #[tokio::test]
    async fn test_process_replaces_store() {
        let store = store().await;
        let indexer = Indexer::new(Arc::new(DummyModel::new()), store.clone(), 1000, 200);

        let long = article("Long read", Source::DailyStar, &"Dhaka traffic. ".repeat(200));
        let short = article("Brief", Source::ProthomAloEnglish, "Short note.");
        let stats = indexer.process(&[long, short.clone()]).await.unwrap();

        assert_eq!(stats.articles, 2);
        assert!(stats.chunks >= 4);
        assert_eq!(store.count().await.unwrap(), stats.chunks);
        assert_eq!(chunks_from(&store, Source::ProthomAloEnglish).await.len(), 1);

        let stats = indexer.process(&[short]).await.unwrap();
        assert_eq!(stats.chunks, 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_embedding_failure_keeps_previous_index() {
        let store = store().await;
        Indexer::new(Arc::new(DummyModel::new()), store.clone(), 1000, 200)
            .process(&[article("Kept", Source::DailyStar, "Body")])
            .await
            .unwrap();

        let failing = Indexer::new(Arc::new(FailingModel), store.clone(), 1000, 200);
        assert!(failing.process(&[article("New", Source::DailyStar, "Body")]).await.is_err());

        let chunks = chunks_from(&store, Source::DailyStar).await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.title, "Kept");
    }
}
