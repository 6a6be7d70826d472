use std::sync::Arc;
use bdn_core::{InferenceModel, Result, ScoredChunk, Source, VectorStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use crate::embeddings::EmbeddingGenerator;

pub const NO_DATA_MESSAGE: &str =
    "No news articles have been loaded yet. Please run the scraper first.";

/// A retrieved chunk as shown next to an answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub source: Source,
    pub url: String,
    pub score: f32,
}

impl From<&ScoredChunk> for SourceRef {
    fn from(scored: &ScoredChunk) -> Self {
        Self {
            title: scored.chunk.metadata.title.clone(),
            source: scored.chunk.metadata.source,
            url: scored.chunk.metadata.url.clone(),
            score: scored.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<SourceRef>,
}

impl Answer {
    pub fn text(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            sources: Vec::new(),
        }
    }

    pub fn no_data() -> Self {
        Self::text(NO_DATA_MESSAGE)
    }

    pub fn error(e: impl std::fmt::Display) -> Self {
        Self::text(format!("Error processing your question: {}", e))
    }
}

pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a helpful assistant specialized in providing information about news from Bangladesh.\n\
         Answer the user's question based on the news articles provided in the context.\n\
         \n\
         If the context doesn't contain relevant information to answer the question,\n\
         politely say that you don't have enough information from recent news to answer.\n\
         \n\
         Always cite your sources by mentioning the news source and providing the URL when available.\n\
         \n\
         Context:\n\
         {}\n\
         \n\
         Question: {}\n",
        context, question
    )
}

/// Top-k retrieval followed by a single generation call.
pub struct Answerer {
    model: Arc<dyn InferenceModel>,
    embeddings: EmbeddingGenerator,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl Answerer {
    pub fn new(model: Arc<dyn InferenceModel>, store: Arc<dyn VectorStore>, top_k: usize) -> Self {
        Self {
            embeddings: EmbeddingGenerator::new(model.clone()),
            model,
            store,
            top_k,
        }
    }

    /// Never fails: errors are reported in the answer text.
    pub async fn answer(&self, question: &str) -> Answer {
        match self.try_answer(question).await {
            Ok(answer) => answer,
            Err(e) => {
                error!("❌ Failed to answer question: {}", e);
                Answer::error(e)
            }
        }
    }

    async fn try_answer(&self, question: &str) -> Result<Answer> {
        let query = self.embeddings.embed_query(question).await?;
        let retrieved = self.store.find_similar(&query, self.top_k).await?;
        debug!("🔍 Retrieved {} chunks for question", retrieved.len());

        let context = retrieved
            .iter()
            .map(|scored| scored.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let answer = self.model.generate_answer(&build_prompt(&context, question)).await?;

        Ok(Answer {
            answer,
            sources: retrieved.iter().map(SourceRef::from).collect(),
        })
    }
}
