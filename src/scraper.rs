use reqwest::{Client, ClientBuilder};
use scraper::{Html, Selector};
use std::time::Duration;
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::error::{AppError, Result};

const USER_AGENT: &str = concat!("rsa-adcopy/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_SCRAPE_TIMEOUT: Duration = Duration::from_secs(5);

// Compiled once, selectors never change
static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("p").expect("Failed to parse paragraph selector")
});

/// Why a scrape produced no content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeDegraded {
    Timeout,
    Network(String),
    Status(u16),
    Body(String),
}

impl std::fmt::Display for ScrapeDegraded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrapeDegraded::Timeout => write!(f, "timed out"),
            ScrapeDegraded::Network(msg) => write!(f, "network error: {}", msg),
            ScrapeDegraded::Status(code) => write!(f, "HTTP status {}", code),
            ScrapeDegraded::Body(msg) => write!(f, "could not read body: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Fetched(String),
    Degraded(ScrapeDegraded),
}

impl ScrapeOutcome {
    /// The scraped text, empty when the scrape degraded.
    pub fn text(&self) -> &str {
        match self {
            ScrapeOutcome::Fetched(text) => text,
            ScrapeOutcome::Degraded(_) => "",
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, ScrapeOutcome::Degraded(_))
    }
}

/// Fetches landing pages and pulls out their paragraph text.
#[derive(Clone)]
pub struct ContentScraper {
    client: Client,
    timeout: Duration,
}

impl ContentScraper {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(ContentScraper { client, timeout })
    }

    /// Never fails: any problem fetching the page degrades to empty content.
    pub async fn scrape(&self, url: &str) -> ScrapeOutcome {
        let fetch_start = std::time::Instant::now();

        match tokio::time::timeout(self.timeout, self.fetch_html(url)).await {
            Ok(Ok(html)) => {
                let text = extract_paragraphs(&html);
                debug!(url, chars = text.len(), elapsed = ?fetch_start.elapsed(), "scraped landing page");
                ScrapeOutcome::Fetched(text)
            }
            Ok(Err(reason)) => {
                warn!(url, %reason, "landing page scrape degraded");
                ScrapeOutcome::Degraded(reason)
            }
            Err(_) => {
                warn!(url, timeout = ?self.timeout, "landing page scrape timed out");
                ScrapeOutcome::Degraded(ScrapeDegraded::Timeout)
            }
        }
    }

    async fn fetch_html(&self, url: &str) -> std::result::Result<String, ScrapeDegraded> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ScrapeDegraded::Timeout
            } else {
                ScrapeDegraded::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeDegraded::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| ScrapeDegraded::Body(e.to_string()))
    }
}

/// Text of every `<p>` in document order, joined with single spaces.
pub fn extract_paragraphs(html: &str) -> String {
    let document = Html::parse_document(html);

    document.select(&PARAGRAPH_SELECTOR)
        .map(|element| element.text().collect::<String>())
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
