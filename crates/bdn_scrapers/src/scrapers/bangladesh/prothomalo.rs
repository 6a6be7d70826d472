use async_trait::async_trait;
use bdn_core::{Article, Result, Source, NO_CONTENT, NO_TITLE};
use scraper::Html;
use crate::scrapers::{utils, Scraper, SourceMetadata};
use super::REGION;

#[derive(Debug, Clone, Default)]
pub struct ProthomAloScraper;

impl ProthomAloScraper {
    pub fn new() -> Self {
        Self
    }

    const BASE_URL: &'static str = "https://en.prothomalo.com";
}

#[async_trait]
impl Scraper for ProthomAloScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            source: Source::ProthomAloEnglish,
            emoji: "📰",
            region: REGION,
        }
    }

    fn home_url(&self) -> &str {
        Self::BASE_URL
    }

    fn link_prefix(&self) -> &str {
        "https://en.prothomalo.com/bangladesh/"
    }

    fn can_handle(&self, url: &str) -> bool {
        utils::parse_url(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h == "en.prothomalo.com"))
            .unwrap_or(false)
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["prothomalo", "pa"]
    }

    fn parse_article(&self, url: &str, html: &str, date: &str) -> Result<Article> {
        let document = Html::parse_document(html);

        let title = utils::first_text(&document, "h1")?.unwrap_or_else(|| NO_TITLE.to_string());

        let containers = utils::parse_selector("div.story-element.story-element-text")?;
        let content = utils::joined_paragraphs(document.select(&containers))?
            .unwrap_or_else(|| NO_CONTENT.to_string());

        Ok(Article {
            title,
            source: Source::ProthomAloEnglish,
            date: date.to_string(),
            url: url.to_string(),
            content,
        })
    }
}
