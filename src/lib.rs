pub mod ad;
pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod scraper;
pub mod text;
pub mod validator;

use std::sync::Arc;
use config::Config;
use error::Result;
use llm::{GenerationClient, OpenAiClient};
use pipeline::AdPipeline;
use scraper::ContentScraper;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<AdPipeline>,
    pub generator: Arc<dyn GenerationClient>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let generator = Arc::new(OpenAiClient::from_config(&config)?);
        Self::with_generator(config, generator)
    }

    /// State backed by a caller-supplied generation client.
    pub fn with_generator(config: Config, generator: Arc<dyn GenerationClient>) -> Result<Self> {
        let scraper = ContentScraper::new(config.scrape_timeout)?;

        Ok(AppState {
            config: Arc::new(config),
            pipeline: Arc::new(AdPipeline::new(scraper)),
            generator,
        })
    }
}
