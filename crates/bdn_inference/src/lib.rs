pub mod embeddings;
pub mod models;
pub mod rag;

pub use models::create_model;
pub use rag::{Answer, AssistantStatus, NewsAssistant, SourceRef};

pub mod prelude {
    pub use super::models::create_model;
    pub use super::rag::{Answer, NewsAssistant};
    pub use bdn_core::{Article, Error, Result};
}
