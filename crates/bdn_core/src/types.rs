use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Title used when an article page has no usable headline.
pub const NO_TITLE: &str = "No title found";
/// Content used when an article page has no usable body text.
pub const NO_CONTENT: &str = "No content found";

/// News outlets the scrapers know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "The Daily Star")]
    DailyStar,
    #[serde(rename = "Prothom Alo English")]
    ProthomAloEnglish,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::DailyStar, Source::ProthomAloEnglish];

    pub fn name(&self) -> &'static str {
        match self {
            Source::DailyStar => "The Daily Star",
            Source::ProthomAloEnglish => "Prothom Alo English",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Source {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Source::ALL
            .into_iter()
            .find(|source| source.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::Error::Scraping(format!("Unknown news source: {}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub source: Source,
    /// Scrape day, `YYYY-MM-DD`.
    pub date: String,
    pub url: String,
    pub content: String,
}

impl Article {
    pub fn metadata(&self) -> ChunkMetadata {
        ChunkMetadata {
            title: self.title.clone(),
            source: self.source,
            date: self.date.clone(),
            url: self.url.clone(),
        }
    }
}

/// Article fields carried by every chunk cut from that article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub title: String,
    pub source: Source,
    pub date: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    pub id: String,
    pub text: String,
    pub metadata: ChunkMetadata,
    pub chunk_index: usize,
    /// Character offset of `text` inside the composed article text.
    pub start: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub chunk: TextChunk,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: TextChunk,
    pub score: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}
