use async_trait::async_trait;
use bdn_core::config::StorageSettings;
use bdn_core::{Error, Result, VectorStore};
use std::path::PathBuf;
use std::sync::Arc;

pub mod archive;
pub mod backends;

pub use archive::{batch_date, format_display_date, ArticleArchive};
pub use backends::*;

#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn get_error_message() -> &'static str;
    async fn open(config: &BackendConfig) -> Result<Self> where Self: Sized;
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub location: PathBuf,
    pub collection: String,
}

impl BackendConfig {
    pub fn new(location: impl Into<PathBuf>, collection: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            collection: collection.into(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(bdn_core::config::DEFAULT_INDEX_DIR, "articles")
    }
}

async fn open_backend<T: StorageBackend + VectorStore + 'static>(
    config: &BackendConfig,
) -> Result<Arc<dyn VectorStore>> {
    let storage = T::open(config).await.map_err(|e| {
        Error::Storage(format!("{} ({})", e, T::get_error_message()))
    })?;
    Ok(Arc::new(storage))
}

/// Opens the vector store named by `settings.backend`.
pub async fn create_storage(settings: &StorageSettings) -> Result<Arc<dyn VectorStore>> {
    let config = BackendConfig::new(settings.index_dir.clone(), "articles");
    match settings.backend.as_str() {
        "local" => open_backend::<LocalDirStorage>(&config).await,
        "memory" => open_backend::<InMemoryStorage>(&config).await,
        other => Err(Error::Config(format!(
            "Unknown storage backend: {} (available: local, memory)",
            other
        ))),
    }
}

pub mod prelude {
    pub use super::archive::ArticleArchive;
    pub use super::backends::*;
    pub use super::{create_storage, BackendConfig};
}
