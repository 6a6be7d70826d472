pub mod answerer;
pub mod assistant;
pub mod documents;
pub mod indexer;
pub mod splitter;

pub use answerer::{Answer, Answerer, SourceRef, NO_DATA_MESSAGE};
pub use assistant::{AssistantStatus, IndexState, NewsAssistant, REFRESH_FAILED_MESSAGE};
pub use documents::{compose, ArticleDocument};
pub use indexer::{IndexStats, Indexer};
pub use splitter::RecursiveSplitter;
