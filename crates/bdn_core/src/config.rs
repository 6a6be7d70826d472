use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use crate::{Error, Result};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_INDEX_DIR: &str = "chroma_db";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeSettings {
    pub webdriver_url: String,
    /// Unique links visited per source
    pub max_links: usize,
    pub homepage_delay: Duration,
    pub article_delay: Duration,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            max_links: 20,
            homepage_delay: Duration::from_secs(3),
            article_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RagSettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self { chunk_size: 1000, chunk_overlap: 200, top_k: 5 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    /// `gemini`, `openai`, `deepseek`, `ollama` or `dummy`
    pub provider: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub chat_model: String,
    pub embedding_model: String,
    pub temperature: f32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            api_key: None,
            base_url: None,
            chat_model: "gemini-2.0-flash".to_string(),
            embedding_model: "models/embedding-001".to_string(),
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageSettings {
    /// `local` (persisted directory) or `memory`
    pub backend: String,
    pub data_dir: PathBuf,
    pub index_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: "local".to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            index_dir: PathBuf::from(DEFAULT_INDEX_DIR),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub scrape: ScrapeSettings,
    pub rag: RagSettings,
    pub model: ModelSettings,
    pub storage: StorageSettings,
}

impl AppConfig {
    /// Defaults overridden by `BDN_*` environment variables. A `.env` file in
    /// the working directory is loaded first when present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("WEBDRIVER_URL") {
            config.scrape.webdriver_url = url;
        }
        if let Some(max) = parse_var(&lookup, "BDN_MAX_LINKS")? {
            config.scrape.max_links = max;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "BDN_HOMEPAGE_DELAY_MS")? {
            config.scrape.homepage_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "BDN_ARTICLE_DELAY_MS")? {
            config.scrape.article_delay = Duration::from_millis(ms);
        }

        if let Some(size) = parse_var(&lookup, "BDN_CHUNK_SIZE")? {
            config.rag.chunk_size = size;
        }
        if let Some(overlap) = parse_var(&lookup, "BDN_CHUNK_OVERLAP")? {
            config.rag.chunk_overlap = overlap;
        }
        if let Some(top_k) = parse_var(&lookup, "BDN_TOP_K")? {
            config.rag.top_k = top_k;
        }

        if let Some(provider) = lookup("BDN_MODEL") {
            config.model.provider = provider.to_lowercase();
        }
        config.model.api_key = lookup("BDN_API_KEY").or_else(|| lookup("GOOGLE_API_KEY"));
        config.model.base_url = lookup("BDN_MODEL_URL");
        if let Some(model) = lookup("BDN_CHAT_MODEL") {
            config.model.chat_model = model;
        }
        if let Some(model) = lookup("BDN_EMBEDDING_MODEL") {
            config.model.embedding_model = model;
        }
        if let Some(temperature) = parse_var(&lookup, "BDN_TEMPERATURE")? {
            config.model.temperature = temperature;
        }

        if let Some(backend) = lookup("BDN_STORAGE") {
            config.storage.backend = backend.to_lowercase();
        }
        if let Some(dir) = lookup("BDN_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("BDN_INDEX_DIR") {
            config.storage.index_dir = PathBuf::from(dir);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rag.chunk_size == 0 {
            return Err(Error::Config("chunk size must be greater than zero".to_string()));
        }
        if self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(Error::Config(format!(
                "chunk overlap ({}) must be less than chunk size ({})",
                self.rag.chunk_overlap, self.rag.chunk_size
            )));
        }
        if self.rag.top_k == 0 {
            return Err(Error::Config("top_k must be greater than zero".to_string()));
        }
        if self.scrape.max_links == 0 {
            return Err(Error::Config("max_links must be greater than zero".to_string()));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, raw))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_pipeline_constants() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.rag.chunk_size, 1000);
        assert_eq!(config.rag.chunk_overlap, 200);
        assert_eq!(config.rag.top_k, 5);
        assert_eq!(config.scrape.max_links, 20);
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        assert_eq!(config.storage.index_dir, PathBuf::from("chroma_db"));
        assert!((config.model.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("BDN_MODEL", "Dummy"),
            ("GOOGLE_API_KEY", "secret"),
            ("BDN_TOP_K", "3"),
            ("BDN_ARTICLE_DELAY_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.model.provider, "dummy");
        assert_eq!(config.model.api_key.as_deref(), Some("secret"));
        assert_eq!(config.rag.top_k, 3);
        assert_eq!(config.scrape.article_delay, Duration::ZERO);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(AppConfig::from_lookup(lookup_from(&[("BDN_TOP_K", "many")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("BDN_CHUNK_OVERLAP", "1000")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("BDN_TOP_K", "0")])).is_err());
    }
}
