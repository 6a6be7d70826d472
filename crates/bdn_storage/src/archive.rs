//! Dated article batch files.
//!
//! Every scrape run is written as one JSON array to
//! `{data_dir}/news_articles_{YYYYMMDD}.json`. The current batch is the most
//! recently created file; a second run on the same day replaces that day's
//! file.

use bdn_core::{Article, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::{info, warn};

pub const FILE_PREFIX: &str = "news_articles_";
pub const FILE_EXTENSION: &str = ".json";

#[derive(Debug, Clone)]
pub struct ArticleArchive {
    data_dir: PathBuf,
}

impl ArticleArchive {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn batch_path(&self, date: NaiveDate) -> PathBuf {
        self.data_dir
            .join(format!("{}{}{}", FILE_PREFIX, date.format("%Y%m%d"), FILE_EXTENSION))
    }

    /// Writes `articles` as the batch for `date` and returns the file path.
    pub async fn save_articles(&self, articles: &[Article], date: NaiveDate) -> Result<PathBuf> {
        fs::create_dir_all(&self.data_dir).await?;

        let path = self.batch_path(date);
        if fs::try_exists(&path).await.unwrap_or(false) {
            warn!("⚠️ Overwriting existing batch for {}: {}", date, path.display());
        }

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        articles.serialize(&mut serializer)?;

        fs::write(&path, buf).await?;
        info!("💾 Saved {} articles to {}", articles.len(), path.display());
        Ok(path)
    }

    /// Newest batch file by creation time, `None` when the directory is
    /// missing or holds no batch.
    pub async fn find_latest_news_file(&self) -> Result<Option<PathBuf>> {
        let mut entries = match fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut latest: Option<(SystemTime, PathBuf)> = None;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if !is_batch_file_name(&name) {
                continue;
            }
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let created = metadata
                .created()
                .or_else(|_| metadata.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            let path = entry.path();

            let newer = match &latest {
                None => true,
                Some((best_time, best_path)) => {
                    (created, path.file_name()) > (*best_time, best_path.file_name())
                }
            };
            if newer {
                latest = Some((created, path));
            }
        }

        Ok(latest.map(|(_, path)| path))
    }

    pub async fn load_articles(&self, path: &Path) -> Result<Vec<Article>> {
        let raw = fs::read(path).await?;
        let articles: Vec<Article> = serde_json::from_slice(&raw)?;
        info!("📰 Loaded {} articles from {}", articles.len(), path.display());
        Ok(articles)
    }
}

fn is_batch_file_name(name: &str) -> bool {
    name.starts_with(FILE_PREFIX) && name.ends_with(FILE_EXTENSION)
}

/// Date token embedded in a batch file name.
pub fn batch_date(path: &Path) -> Option<NaiveDate> {
    let name = path.file_name()?.to_str()?;
    let token = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_EXTENSION)?;
    NaiveDate::parse_from_str(token, "%Y%m%d").ok()
}

/// `DD-MM-YYYY`, the format shown as "last updated".
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bdn_core::Source;
    use tempfile::tempdir;

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            source: Source::ProthomAloEnglish,
            date: "2025-01-02".to_string(),
            url: format!("https://en.prothomalo.com/bangladesh/{}", title),
            content: "ঢাকায় বৃষ্টি".to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_missing_data_dir_has_no_latest_file() {
        let dir = tempdir().unwrap();
        let archive = ArticleArchive::new(dir.path().join("data"));
        assert!(archive.find_latest_news_file().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_data_dir_has_no_latest_file() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        let archive = ArticleArchive::new(dir.path());
        assert!(archive.find_latest_news_file().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_latest_file_is_newest_batch() {
        let dir = tempdir().unwrap();
        let archive = ArticleArchive::new(dir.path());
        archive.save_articles(&[article("a")], date(2025, 1, 1)).await.unwrap();
        let second = archive.save_articles(&[article("b")], date(2025, 1, 2)).await.unwrap();

        let latest = archive.find_latest_news_file().await.unwrap().unwrap();
        assert_eq!(latest, second);
        assert!(latest.ends_with("news_articles_20250102.json"));
    }

    #[tokio::test]
    async fn test_save_and_load_preserves_articles() {
        let dir = tempdir().unwrap();
        let archive = ArticleArchive::new(dir.path().join("data"));
        let articles = vec![article("one"), article("two")];
        let path = archive.save_articles(&articles, date(2025, 3, 9)).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("ঢাকায় বৃষ্টি"), "non-ASCII text must not be escaped");
        assert!(raw.contains("\n    {"), "batch files are indented with four spaces");

        let loaded = archive.load_articles(&path).await.unwrap();
        assert_eq!(loaded, articles);
    }

    #[tokio::test]
    async fn test_same_day_batch_is_overwritten() {
        let dir = tempdir().unwrap();
        let archive = ArticleArchive::new(dir.path());
        archive.save_articles(&[article("first")], date(2025, 1, 1)).await.unwrap();
        let path = archive.save_articles(&[article("second")], date(2025, 1, 1)).await.unwrap();

        let loaded = archive.load_articles(&path).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "second");
    }

    #[test]
    fn test_batch_date() {
        let path = Path::new("data/news_articles_20250102.json");
        assert_eq!(batch_date(path), Some(date(2025, 1, 2)));
        assert_eq!(format_display_date(date(2025, 1, 2)), "02-01-2025");
        assert_eq!(batch_date(Path::new("data/news_articles_latest.json")), None);
    }
}
