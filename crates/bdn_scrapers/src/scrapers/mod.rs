use async_trait::async_trait;
use bdn_core::config::ScrapeSettings;
use bdn_core::{Article, Result, Source};
use scraper::Html;
use crate::browser::PageFetcher;

pub mod bangladesh;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceMetadata {
    pub source: Source,
    pub emoji: &'static str,
    pub region: &'static str,
}

#[async_trait]
pub trait Scraper: Send + Sync {
    fn source_metadata(&self) -> SourceMetadata;

    /// Homepage the article links are discovered on
    fn home_url(&self) -> &str;

    /// Prefix an `href` must start with to count as a Bangladesh story
    fn link_prefix(&self) -> &str;

    /// Returns true if this scraper can handle the given URL
    fn can_handle(&self, url: &str) -> bool;

    /// Returns a list of CLI shorthand names for this scraper
    fn cli_names(&self) -> Vec<&str> {
        vec![]
    }

    /// Absolute URL for a matched `href`
    fn resolve_link(&self, href: &str) -> String {
        href.to_string()
    }

    /// Extracts title and body from a rendered article page
    fn parse_article(&self, url: &str, html: &str, date: &str) -> Result<Article>;

    /// Matching links on a homepage, deduplicated in discovery order and
    /// capped to `limit`
    fn extract_article_links(&self, html: &str, limit: usize) -> Vec<String> {
        let document = Html::parse_document(html);
        let prefix = self.link_prefix();
        let hrefs = utils::extract_hrefs(&document)
            .into_iter()
            .filter(|href| href.starts_with(prefix));
        utils::dedup_preserving_order(hrefs)
            .into_iter()
            .take(limit)
            .map(|href| self.resolve_link(&href))
            .collect()
    }

    /// Returns a list of article URLs from the main page
    async fn get_article_urls(
        &self,
        fetcher: &dyn PageFetcher,
        settings: &ScrapeSettings,
    ) -> Result<Vec<String>> {
        let html = fetcher.fetch(self.home_url(), settings.homepage_delay).await?;
        Ok(self.extract_article_links(&html, settings.max_links))
    }

    /// Scrapes an article from the given URL
    async fn scrape_article(
        &self,
        fetcher: &dyn PageFetcher,
        url: &str,
        date: &str,
        settings: &ScrapeSettings,
    ) -> Result<Article> {
        let html = fetcher.fetch(url, settings.article_delay).await?;
        self.parse_article(url, &html, date)
    }
}

pub type ScraperFactory = Box<dyn Fn() -> Box<dyn Scraper> + Send + Sync>;

/// Factories for every supported outlet, in scrape order.
pub fn get_scraper_factories() -> Vec<ScraperFactory> {
    bangladesh::get_scraper_factories()
}

/// Common utilities for scrapers
pub mod utils {
    use super::*;
    use bdn_core::Error;
    use scraper::{ElementRef, Selector};
    use std::collections::HashSet;
    use url::Url;

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
    }

    pub fn parse_selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector)
            .map_err(|e| Error::Scraping(format!("Invalid selector {}: {:?}", selector, e)))
    }

    /// Every `href` attribute of every anchor, in document order.
    pub fn extract_hrefs(document: &Html) -> Vec<String> {
        let Ok(selector) = Selector::parse("a[href]") else {
            return Vec::new();
        };
        document
            .select(&selector)
            .filter_map(|el| el.value().attr("href"))
            .map(|href| href.to_string())
            .collect()
    }

    pub fn dedup_preserving_order<I>(links: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        links
            .into_iter()
            .filter(|link| seen.insert(link.clone()))
            .collect()
    }

    /// Trimmed text of the first element matching `selector`, if non-empty.
    pub fn first_text(document: &Html, selector: &str) -> Result<Option<String>> {
        let selector = parse_selector(selector)?;
        Ok(document
            .select(&selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty()))
    }

    /// Trimmed paragraph texts inside `containers`, joined with single spaces.
    /// `None` when no paragraph carries text.
    pub fn joined_paragraphs<'a, I>(containers: I) -> Result<Option<String>>
    where
        I: IntoIterator<Item = ElementRef<'a>>,
    {
        let paragraph = parse_selector("p")?;
        let parts: Vec<String> = containers
            .into_iter()
            .flat_map(|container| {
                container
                    .select(&paragraph)
                    .map(|p| p.text().collect::<String>().trim().to_string())
                    .collect::<Vec<_>>()
            })
            .filter(|text| !text.is_empty())
            .collect();

        if parts.is_empty() {
            Ok(None)
        } else {
            Ok(Some(parts.join(" ")))
        }
    }
}
