//! The news assistant session.
//!
//! Owns the index lifecycle (`Unbuilt` until a batch has been indexed) and
//! the conversation history. Rebuilds are serialized by `rebuild`; the store
//! swaps its contents atomically, so concurrent questions see either the old
//! index or the new one.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use bdn_core::config::{AppConfig, RagSettings};
use bdn_core::{BatchProducer, ConversationTurn, InferenceModel, Result, VectorStore};
use bdn_storage::{batch_date, create_storage, format_display_date, ArticleArchive};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};
use crate::models::create_model;
use super::answerer::{Answer, Answerer};
use super::indexer::Indexer;

pub const REFRESH_FAILED_MESSAGE: &str = "Failed to refresh news. No articles were scraped.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexState {
    Unbuilt,
    Built { batch: PathBuf, articles: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssistantStatus {
    pub indexed: bool,
    pub last_updated: Option<String>,
    pub latest_file: Option<String>,
}

#[derive(Default)]
struct Conversation {
    turns: Vec<ConversationTurn>,
    last: Option<(String, Answer)>,
}

pub struct NewsAssistant {
    archive: ArticleArchive,
    producer: Arc<dyn BatchProducer>,
    indexer: Indexer,
    answerer: Answerer,
    state: RwLock<IndexState>,
    rebuild: Mutex<()>,
    conversation: RwLock<Conversation>,
}

impl NewsAssistant {
    pub fn new(
        archive: ArticleArchive,
        producer: Arc<dyn BatchProducer>,
        model: Arc<dyn InferenceModel>,
        store: Arc<dyn VectorStore>,
        rag: &RagSettings,
    ) -> Self {
        Self {
            archive,
            producer,
            indexer: Indexer::new(model.clone(), store.clone(), rag.chunk_size, rag.chunk_overlap),
            answerer: Answerer::new(model, store, rag.top_k),
            state: RwLock::new(IndexState::Unbuilt),
            rebuild: Mutex::new(()),
            conversation: RwLock::new(Conversation::default()),
        }
    }

    /// Wires the configured model and vector store around `producer`.
    pub async fn from_config(config: &AppConfig, producer: Arc<dyn BatchProducer>) -> Result<Self> {
        let model = create_model(&config.model)?;
        let store = create_storage(&config.storage).await?;
        info!("🤖 Using {} model with {} vector store", model.name(), store.name());
        Ok(Self::new(
            ArticleArchive::new(config.storage.data_dir.clone()),
            producer,
            model,
            store,
            &config.rag,
        ))
    }

    /// Cold start: indexes the latest batch when one exists.
    pub async fn initialize(&self) -> Result<()> {
        if self.ensure_index().await? {
            info!("✅ News index ready");
        } else {
            warn!("⚠️ No news data found in {}", self.archive.data_dir().display());
        }
        Ok(())
    }

    pub async fn state(&self) -> IndexState {
        self.state.read().await.clone()
    }

    pub async fn is_indexed(&self) -> bool {
        matches!(*self.state.read().await, IndexState::Built { .. })
    }

    /// Builds from the latest batch if nothing is indexed yet. Returns whether
    /// an index is available afterwards.
    pub async fn ensure_index(&self) -> Result<bool> {
        if self.is_indexed().await {
            return Ok(true);
        }
        let _guard = self.rebuild.lock().await;
        // Another task may have finished a build while this one waited
        if self.is_indexed().await {
            return Ok(true);
        }
        match self.archive.find_latest_news_file().await? {
            Some(path) => {
                self.build_from(&path).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Caller must hold `rebuild`.
    async fn build_from(&self, path: &Path) -> Result<usize> {
        let articles = self.archive.load_articles(path).await?;
        let stats = self.indexer.process(&articles).await?;
        *self.state.write().await = IndexState::Built {
            batch: path.to_path_buf(),
            articles: stats.articles,
        };
        Ok(stats.articles)
    }

    /// Re-scrapes and rebuilds. Leaves the current index in place when the
    /// scrape produced nothing.
    pub async fn refresh(&self) -> Result<String> {
        let _guard = self.rebuild.lock().await;
        info!("🔄 Refreshing news");
        match self.producer.scrape_all_news().await? {
            Some(path) => {
                let count = self.build_from(&path).await?;
                Ok(format!("Successfully refreshed news database with {} articles", count))
            }
            None => {
                warn!("⚠️ Refresh produced no articles, keeping the current index");
                Ok(REFRESH_FAILED_MESSAGE.to_string())
            }
        }
    }

    /// Answers `question`. Never fails; problems are reported in the text.
    pub async fn query(&self, question: &str) -> Answer {
        match self.ensure_index().await {
            Ok(true) => self.answerer.answer(question).await,
            Ok(false) => Answer::no_data(),
            Err(e) => {
                error!("❌ Could not build the news index: {}", e);
                Answer::error(e)
            }
        }
    }

    /// Queries and records both turns. Empty questions are ignored and an
    /// immediate repeat of the previous question returns the previous answer.
    pub async fn converse(&self, question: &str) -> Option<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }
        if let Some((last_question, answer)) = &self.conversation.read().await.last {
            if last_question == question {
                return Some(answer.clone());
            }
        }

        let answer = self.query(question).await;

        let mut conversation = self.conversation.write().await;
        conversation.turns.push(ConversationTurn::user(question));
        conversation.turns.push(ConversationTurn::assistant(answer.answer.clone()));
        conversation.last = Some((question.to_string(), answer.clone()));
        Some(answer)
    }

    pub async fn history(&self) -> Vec<ConversationTurn> {
        self.conversation.read().await.turns.clone()
    }

    pub async fn clear_history(&self) {
        *self.conversation.write().await = Conversation::default();
    }

    /// Date of the latest batch as `DD-MM-YYYY`.
    pub async fn last_updated(&self) -> Result<Option<String>> {
        Ok(self
            .archive
            .find_latest_news_file()
            .await?
            .as_deref()
            .and_then(batch_date)
            .map(format_display_date))
    }

    pub async fn status(&self) -> Result<AssistantStatus> {
        let latest = self.archive.find_latest_news_file().await?;
        Ok(AssistantStatus {
            indexed: self.is_indexed().await,
            last_updated: latest.as_deref().and_then(batch_date).map(format_display_date),
            latest_file: latest.map(|path| path.display().to_string()),
        })
    }
}
