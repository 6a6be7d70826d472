pub mod browser;
pub mod cli;
pub mod logging;
pub mod manager;
pub mod scrapers;

pub use browser::{FetcherFactory, PageFetcher, WebDriverFetcherFactory};
pub use cli::{handle_command, ScraperArgs, ScraperCommands};
pub use manager::ScraperManager;
pub use scrapers::Scraper;

pub mod prelude {
    pub use super::scrapers::Scraper;
    pub use super::ScraperManager;
    pub use bdn_core::{Article, Error, Result};
}
