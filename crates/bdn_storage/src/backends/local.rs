use async_trait::async_trait;
use bdn_core::{Error, IndexedChunk, Result, ScoredChunk, VectorStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{info, warn};
use crate::{BackendConfig, StorageBackend};

const INDEX_FILE: &str = "index.json";

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    collection: String,
    built_at: DateTime<Utc>,
    dimensions: usize,
    entries: Vec<IndexedChunk>,
}

/// Vector index persisted as a single JSON document inside a directory.
///
/// The whole index is held in memory for search. `replace_all` writes the
/// new document next to the old one and renames it into place, so readers
/// of the directory see either the previous index or the new one.
pub struct LocalDirStorage {
    dir: PathBuf,
    collection: String,
    entries: RwLock<Vec<IndexedChunk>>,
}

impl LocalDirStorage {
    pub async fn open(config: &BackendConfig) -> Result<Self> {
        let dir = config.location.clone();
        let index_path = dir.join(INDEX_FILE);

        let entries = match fs::read(&index_path).await {
            Ok(raw) => match serde_json::from_slice::<IndexFile>(&raw) {
                Ok(file) if file.collection == config.collection => {
                    info!("📂 Loaded {} indexed chunks from {}", file.entries.len(), index_path.display());
                    file.entries
                }
                Ok(file) => {
                    warn!(
                        "⚠️ Index at {} belongs to collection {}, ignoring",
                        index_path.display(),
                        file.collection
                    );
                    Vec::new()
                }
                Err(e) => {
                    warn!("⚠️ Unreadable index at {}: {}", index_path.display(), e);
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            dir,
            collection: config.collection.clone(),
            entries: RwLock::new(entries),
        })
    }

    async fn persist(&self, entries: &[IndexedChunk]) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;

        let dimensions = entries.first().map(|e| e.embedding.len()).unwrap_or(0);
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimensions) {
            return Err(Error::Storage(format!(
                "Chunk {} has {} dimensions, expected {}",
                bad.chunk.id,
                bad.embedding.len(),
                dimensions
            )));
        }

        let file = IndexFile {
            collection: self.collection.clone(),
            built_at: Utc::now(),
            dimensions,
            entries: entries.to_vec(),
        };
        let raw = serde_json::to_vec(&file)?;

        let tmp_path = self.dir.join(format!("{}.tmp", INDEX_FILE));
        let index_path = self.dir.join(INDEX_FILE);
        fs::write(&tmp_path, raw).await?;
        fs::rename(&tmp_path, &index_path).await?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for LocalDirStorage {
    fn get_error_message() -> &'static str {
        "Index directory should be readable and writable"
    }

    async fn open(config: &BackendConfig) -> Result<Self> {
        LocalDirStorage::open(config).await
    }
}

#[async_trait]
impl VectorStore for LocalDirStorage {
    fn name(&self) -> &str {
        "local"
    }

    async fn replace_all(&self, entries: Vec<IndexedChunk>) -> Result<()> {
        let mut current = self.entries.write().await;
        self.persist(&entries).await?;
        info!("💾 Persisted {} chunks to {}", entries.len(), self.dir.display());
        *current = entries;
        Ok(())
    }

    async fn find_similar(&self, embedding: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
        let entries = self.entries.read().await;
        Ok(super::rank(&entries, embedding, limit))
    }


    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::memory::tests::entry;
    use bdn_core::Source;
    use std::path::Path;
    use tempfile::tempdir;

    fn config(dir: &Path) -> BackendConfig {
        BackendConfig::new(dir.join("chroma_db"), "articles")
    }

    #[tokio::test]
    async fn test_index_survives_reopen() {
        let dir = tempdir().unwrap();
        let storage = LocalDirStorage::open(&config(dir.path())).await.unwrap();
        assert_eq!(storage.count().await.unwrap(), 0);

        storage
            .replace_all(vec![
                entry("a", Source::DailyStar, vec![1.0, 0.0]),
                entry("b", Source::ProthomAloEnglish, vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let reopened = LocalDirStorage::open(&config(dir.path())).await.unwrap();
        assert_eq!(reopened.count().await.unwrap(), 2);
        let similar = reopened.find_similar(&[0.1, 1.0], 1).await.unwrap();
        assert_eq!(similar[0].chunk.id, "b");
        assert!(!dir.path().join("chroma_db").join("index.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_replace_overwrites_previous_index() {
        let dir = tempdir().unwrap();
        let storage = LocalDirStorage::open(&config(dir.path())).await.unwrap();
        storage.replace_all(vec![entry("old", Source::DailyStar, vec![1.0])]).await.unwrap();
        storage.replace_all(vec![entry("new", Source::DailyStar, vec![1.0])]).await.unwrap();

        let reopened = LocalDirStorage::open(&config(dir.path())).await.unwrap();
        let chunks = reopened.find_similar(&[1.0], 10).await.unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk.id, "new");
    }

    #[tokio::test]
    async fn test_mismatched_dimensions_leave_index_untouched() {
        let dir = tempdir().unwrap();
        let storage = LocalDirStorage::open(&config(dir.path())).await.unwrap();
        storage.replace_all(vec![entry("keep", Source::DailyStar, vec![1.0, 0.0])]).await.unwrap();

        let result = storage
            .replace_all(vec![
                entry("x", Source::DailyStar, vec![1.0, 0.0]),
                entry("y", Source::DailyStar, vec![1.0]),
            ])
            .await;
        assert!(result.is_err());
        assert_eq!(storage.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_index_opens_empty() {
        let dir = tempdir().unwrap();
        let index_dir = dir.path().join("chroma_db");
        std::fs::create_dir_all(&index_dir).unwrap();
        std::fs::write(index_dir.join("index.json"), "{ not json").unwrap();

        let storage = LocalDirStorage::open(&config(dir.path())).await.unwrap();
        assert_eq!(storage.count().await.unwrap(), 0);
    }
}
