use bdn_core::{Article, ChunkMetadata};

/// An article rendered as indexable text plus the fields each chunk carries.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleDocument {
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl From<&Article> for ArticleDocument {
    fn from(article: &Article) -> Self {
        Self {
            text: compose(article),
            metadata: article.metadata(),
        }
    }
}

pub fn compose(article: &Article) -> String {
    format!(
        "TITLE: {}\n\nSOURCE: {}\nDATE: {}\nURL: {}\n\nCONTENT: {}",
        article.title, article.source, article.date, article.url, article.content
    )
}

pub fn to_documents(articles: &[Article]) -> Vec<ArticleDocument> {
    articles.iter().map(ArticleDocument::from).collect()
}
