//! Page fetching through a WebDriver-controlled Chrome.
//!
//! News homepages render their link lists client side, so pages are loaded
//! in a real browser and read back as HTML after a settle delay.

use async_trait::async_trait;
use bdn_core::{Error, Result};
use std::fmt::Display;
use std::time::Duration;
use thirtyfour::{ChromeCapabilities, ChromiumLikeCapabilities, DesiredCapabilities, WebDriver};
use tracing::{debug, info};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

const CHROME_ARGS: &[&str] = &[
    "--headless",
    "--disable-gpu",
    "--window-size=1920,1080",
    "--no-proxy-server",
    "--proxy-server=direct://",
    "--proxy-bypass-list=*",
];

/// An open browser session.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Navigates to `url`, waits `settle` for client-side rendering and
    /// returns the page source.
    async fn fetch(&self, url: &str, settle: Duration) -> Result<String>;

    /// Releases the session.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Opens browser sessions.
#[async_trait]
pub trait FetcherFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn PageFetcher>>;
}

#[derive(Debug, Clone)]
pub struct WebDriverFetcherFactory {
    webdriver_url: String,
}

impl WebDriverFetcherFactory {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
        }
    }
}

fn browser_err(e: impl Display) -> Error {
    Error::Browser(e.to_string())
}

fn chrome_capabilities() -> Result<ChromeCapabilities> {
    let mut caps = DesiredCapabilities::chrome();
    for arg in CHROME_ARGS {
        caps.add_arg(arg).map_err(browser_err)?;
    }
    caps.add_arg(&format!("--user-agent={}", USER_AGENT)).map_err(browser_err)?;
    caps.add_experimental_option("excludeSwitches", vec!["enable-automation"])
        .map_err(browser_err)?;
    caps.add_experimental_option("useAutomationExtension", false)
        .map_err(browser_err)?;
    Ok(caps)
}

#[async_trait]
impl FetcherFactory for WebDriverFetcherFactory {
    async fn open(&self) -> Result<Box<dyn PageFetcher>> {
        info!("🌐 Setting up Chrome browser via {}", self.webdriver_url);
        let caps = chrome_capabilities()?;
        let driver = WebDriver::new(self.webdriver_url.as_str(), caps)
            .await
            .map_err(browser_err)?;
        Ok(Box::new(WebDriverFetcher { driver }))
    }
}

pub struct WebDriverFetcher {
    driver: WebDriver,
}

#[async_trait]
impl PageFetcher for WebDriverFetcher {
    async fn fetch(&self, url: &str, settle: Duration) -> Result<String> {
        debug!("Navigating to {}", url);
        self.driver.goto(url).await.map_err(browser_err)?;
        tokio::time::sleep(settle).await;
        self.driver.source().await.map_err(browser_err)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.driver.quit().await.map_err(browser_err)?;
        info!("🌐 Browser closed.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_capabilities_build() {
        assert!(chrome_capabilities().is_ok());
    }

    #[test]
    fn test_user_agent_is_desktop_chrome() {
        assert!(USER_AGENT.contains("Chrome/122.0.0.0"));
        assert!(!USER_AGENT.contains("Headless"));
    }
}
