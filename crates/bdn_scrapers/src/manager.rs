use async_trait::async_trait;
use bdn_core::config::ScrapeSettings;
use bdn_core::{Article, BatchProducer, Error, Result, Source};
use bdn_storage::ArticleArchive;
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use std::sync::Arc;
use crate::browser::{FetcherFactory, PageFetcher, WebDriverFetcherFactory};
use crate::logging::Logger;
use crate::scrapers::{get_scraper_factories, Scraper, ScraperFactory};

type BoxedScraper = Box<dyn Scraper>;

/// Runs scrapers through a shared browser factory and writes dated batches.
pub struct ScraperManager {
    factories: Vec<ScraperFactory>,
    fetchers: Arc<dyn FetcherFactory>,
    archive: ArticleArchive,
    settings: ScrapeSettings,
}

impl ScraperManager {
    pub fn new(
        fetchers: Arc<dyn FetcherFactory>,
        archive: ArticleArchive,
        settings: ScrapeSettings,
    ) -> Self {
        Self {
            factories: get_scraper_factories(),
            fetchers,
            archive,
            settings,
        }
    }

    /// Manager backed by the WebDriver endpoint named in `settings`.
    pub fn with_webdriver(archive: ArticleArchive, settings: ScrapeSettings) -> Self {
        let fetchers = Arc::new(WebDriverFetcherFactory::new(settings.webdriver_url.clone()));
        Self::new(fetchers, archive, settings)
    }

    pub fn archive(&self) -> &ArticleArchive {
        &self.archive
    }

    pub fn get_scrapers(&self) -> Vec<BoxedScraper> {
        self.factories.iter().map(|f| f()).collect()
    }

    pub fn get_scraper_for_url(&self, url: &str) -> Result<BoxedScraper> {
        for factory in &self.factories {
            let scraper = factory();
            if scraper.can_handle(url) {
                return Ok(scraper);
            }
        }
        Err(Error::Scraping(format!("No scraper found for URL: {}", url)))
    }

    /// Scrapers matching a CLI short name, a display name, or `all`.
    pub fn get_scrapers_for_source(&self, name: &str) -> Result<Vec<BoxedScraper>> {
        let wanted = name.trim().to_lowercase();
        let by_display_name = wanted.parse::<Source>().ok();

        let result: Vec<BoxedScraper> = self
            .get_scrapers()
            .into_iter()
            .filter(|scraper| {
                wanted == "all"
                    || scraper.cli_names().contains(&wanted.as_str())
                    || Some(scraper.source_metadata().source) == by_display_name
            })
            .collect();

        if result.is_empty() {
            return Err(Error::Scraping(format!("Scraper not found: {}", name)));
        }
        Ok(result)
    }

    /// One line per registered scraper for the `list` command.
    pub fn list_scrapers(&self) -> Vec<String> {
        self.get_scrapers()
            .iter()
            .map(|scraper| {
                let meta = scraper.source_metadata();
                format!(
                    "{} {} ({}) [{}]",
                    meta.emoji,
                    meta.source,
                    meta.region,
                    scraper.cli_names().join(", ")
                )
            })
            .collect()
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Scrapes one outlet. Site-level failures are logged and yield no
    /// articles; the browser session is released either way.
    pub async fn scrape_source(&self, scraper: &dyn Scraper) -> Vec<Article> {
        let meta = scraper.source_metadata();
        let logger = Logger::new().with_prefix(format!("{} [{}]", meta.emoji, meta.source));

        let fetcher = match self.fetchers.open().await {
            Ok(fetcher) => fetcher,
            Err(e) => {
                logger.error(&format!("Could not open browser session: {}", e));
                return Vec::new();
            }
        };

        let articles = self.collect_articles(scraper, fetcher.as_ref(), &logger).await;

        if let Err(e) = fetcher.close().await {
            logger.warn(&format!("Failed to close browser session: {}", e));
        }
        articles
    }

    async fn collect_articles(
        &self,
        scraper: &dyn Scraper,
        fetcher: &dyn PageFetcher,
        logger: &Logger,
    ) -> Vec<Article> {
        logger.info(&format!("🔍 Scraping {}", scraper.home_url()));
        let urls = match scraper.get_article_urls(fetcher, &self.settings).await {
            Ok(urls) => urls,
            Err(e) => {
                logger.error(&format!("Failed to load homepage: {}", e));
                return Vec::new();
            }
        };
        logger.info(&format!("Found {} article links", urls.len()));

        let date = Self::today().format("%Y-%m-%d").to_string();
        let mut articles = Vec::with_capacity(urls.len());
        for url in urls {
            match scraper.scrape_article(fetcher, &url, &date, &self.settings).await {
                Ok(article) => {
                    logger.debug(&format!("📰 {} - {}", article.title, url));
                    articles.push(article);
                }
                Err(e) => logger.warn(&format!("Failed to scrape {}: {}", url, e)),
            }
        }
        logger.info(&format!("✅ Scraped {} articles", articles.len()));
        articles
    }

    pub async fn scrape_sources(&self, scrapers: &[BoxedScraper]) -> Vec<Article> {
        let mut all = Vec::new();
        for scraper in scrapers {
            all.extend(self.scrape_source(scraper.as_ref()).await);
        }
        all
    }

    /// Scrapes `scrapers` and saves the result as today's batch. Returns
    /// `None` without touching the data directory when nothing was scraped.
    pub async fn scrape_and_save(&self, scrapers: &[BoxedScraper]) -> Result<Option<PathBuf>> {
        let articles = self.scrape_sources(scrapers).await;
        if articles.is_empty() {
            tracing::warn!("⚠️ No articles were scraped, skipping batch write");
            return Ok(None);
        }
        let path = self.archive.save_articles(&articles, Self::today()).await?;
        Ok(Some(path))
    }

    /// Scrapes a single article URL with whichever scraper claims it.
    pub async fn scrape_url(&self, url: &str) -> Result<Article> {
        let scraper = self.get_scraper_for_url(url)?;
        let fetcher = self.fetchers.open().await?;
        let date = Self::today().format("%Y-%m-%d").to_string();
        let result = scraper
            .scrape_article(fetcher.as_ref(), url, &date, &self.settings)
            .await;
        if let Err(e) = fetcher.close().await {
            tracing::warn!("Failed to close browser session: {}", e);
        }
        result
    }
}

#[async_trait]
impl BatchProducer for ScraperManager {
    async fn scrape_all_news(&self) -> Result<Option<PathBuf>> {
        let scrapers = self.get_scrapers();
        self.scrape_and_save(&scrapers).await
    }
}
