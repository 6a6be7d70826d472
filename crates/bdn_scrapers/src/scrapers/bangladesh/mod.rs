use crate::scrapers::{Scraper, ScraperFactory};

pub mod dailystar;
pub mod prothomalo;

pub use dailystar::DailyStarScraper;
pub use prothomalo::ProthomAloScraper;

pub const REGION: &str = "Bangladesh";

/// Returns a vector of all available Bangladeshi newspaper scraper factories
pub fn get_scraper_factories() -> Vec<ScraperFactory> {
    vec![
        Box::new(|| Box::new(DailyStarScraper::new()) as Box<dyn Scraper>),
        Box::new(|| Box::new(ProthomAloScraper::new()) as Box<dyn Scraper>),
    ]
}
