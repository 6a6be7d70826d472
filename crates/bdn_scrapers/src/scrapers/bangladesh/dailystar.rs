use async_trait::async_trait;
use bdn_core::{Article, Result, Source, NO_CONTENT, NO_TITLE};
use scraper::Html;
use crate::scrapers::{utils, Scraper, SourceMetadata};
use super::REGION;

#[derive(Debug, Clone, Default)]
pub struct DailyStarScraper;

impl DailyStarScraper {
    pub fn new() -> Self {
        Self
    }

    const BASE_URL: &'static str = "https://www.thedailystar.net";
}

#[async_trait]
impl Scraper for DailyStarScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            source: Source::DailyStar,
            emoji: "⭐",
            region: REGION,
        }
    }

    fn home_url(&self) -> &str {
        Self::BASE_URL
    }

    fn link_prefix(&self) -> &str {
        "/news/bangladesh/"
    }

    fn can_handle(&self, url: &str) -> bool {
        utils::parse_url(url)
            .ok()
            .and_then(|u| {
                u.host_str()
                    .map(|h| h == "thedailystar.net" || h.ends_with(".thedailystar.net"))
            })
            .unwrap_or(false)
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["dailystar", "ds"]
    }

    fn resolve_link(&self, href: &str) -> String {
        format!("{}{}", Self::BASE_URL, href)
    }

    fn parse_article(&self, url: &str, html: &str, date: &str) -> Result<Article> {
        let document = Html::parse_document(html);

        let title = utils::first_text(&document, "h1")?.unwrap_or_else(|| NO_TITLE.to_string());

        // Only the first container holds the story body
        let container = utils::parse_selector("div.pb-20.clearfix")?;
        let content = utils::joined_paragraphs(document.select(&container).take(1))?
            .unwrap_or_else(|| NO_CONTENT.to_string());

        Ok(Article {
            title,
            source: Source::DailyStar,
            date: date.to_string(),
            url: url.to_string(),
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOMEPAGE: &str = r#"
        <html><body>
          <a href="/news/bangladesh/politics/news-1">One</a>
          <a href="/sports/cricket/news-9">Sports</a>
          <a href="/news/bangladesh/crime/news-2">Two</a>
          <a href="/news/bangladesh/politics/news-1">One again</a>
          <a href="https://www.thedailystar.net/news/bangladesh/x">Absolute</a>
        </body></html>
    "#;

    #[test]
    fn test_can_handle() {
        let scraper = DailyStarScraper::new();
        assert!(scraper.can_handle("https://www.thedailystar.net/news/bangladesh/a"));
        assert!(!scraper.can_handle("https://en.prothomalo.com/bangladesh/a"));
        assert!(!scraper.can_handle("not a url"));
        assert!(scraper.can_handle("https://thedailystar.net/news/bangladesh/a"));
        assert!(!scraper.can_handle("https://notthedailystar.net/news/bangladesh/a"));
        assert!(!scraper.can_handle("https://thedailystar.net.example.com/news/bangladesh/a"));
    }

    #[test]
    fn test_extract_article_links() {
        let scraper = DailyStarScraper::new();
        let links = scraper.extract_article_links(HOMEPAGE, 20);
        assert_eq!(
            links,
            vec![
                "https://www.thedailystar.net/news/bangladesh/politics/news-1",
                "https://www.thedailystar.net/news/bangladesh/crime/news-2",
            ]
        );
        assert_eq!(scraper.extract_article_links(HOMEPAGE, 1).len(), 1);
    }

    #[test]
    fn test_parse_article_first_container_only() {
        let html = r#"
            <h1> Flood waters recede in Sylhet </h1>
            <div class="pb-20 clearfix"><p>First paragraph.</p><p> Second paragraph. </p></div>
            <div class="pb-20 clearfix"><p>Related story teaser.</p></div>
        "#;
        let article = DailyStarScraper::new()
            .parse_article("https://www.thedailystar.net/news/bangladesh/a", html, "2025-01-02")
            .unwrap();

        assert_eq!(article.title, "Flood waters recede in Sylhet");
        assert_eq!(article.content, "First paragraph. Second paragraph.");
        assert_eq!(article.source, Source::DailyStar);
        assert_eq!(article.date, "2025-01-02");
    }

    #[test]
    fn test_parse_article_sentinels() {
        let article = DailyStarScraper::new()
            .parse_article("https://www.thedailystar.net/news/bangladesh/a", "<p>stray</p>", "2025-01-02")
            .unwrap();
        assert_eq!(article.title, NO_TITLE);
        assert_eq!(article.content, NO_CONTENT);
    }
}
