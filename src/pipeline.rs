use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::ad::{AdRequest, GeneratedAdCopy};
use crate::error::{AppError, Result};
use crate::llm::GenerationClient;
use crate::prompt::build_prompt;
use crate::scraper::{ContentScraper, ScrapeOutcome};
use crate::validator::{parse_and_validate, Violation};

/// Result of one submission: usable copy plus whatever was wrong with it.
#[derive(Debug, Clone)]
pub struct AdCopyOutcome {
    pub ad_copy: GeneratedAdCopy,
    pub violations: Vec<Violation>,
    pub scrape_degraded: bool,
}

/// Runs scrape, prompt, generation and validation for a submission.
///
/// Only the latest submission of each session is live: starting a run
/// cancels the one before it in the same session, which then returns
/// [`AppError::Superseded`]. Different sessions never cancel each other.
pub struct AdPipeline {
    scraper: ContentScraper,
    in_flight: Mutex<InFlight>,
}

/// Session used when the caller does not identify itself.
pub const DEFAULT_SESSION: &str = "default";

#[derive(Default)]
struct InFlight {
    next_id: u64,
    by_session: HashMap<String, (u64, CancellationToken)>,
}

impl AdPipeline {
    pub fn new(scraper: ContentScraper) -> Self {
        AdPipeline {
            scraper,
            in_flight: Mutex::new(InFlight::default()),
        }
    }

    pub async fn run(
        &self,
        request: &AdRequest,
        generator: &dyn GenerationClient,
        session: &str,
    ) -> Result<AdCopyOutcome> {
        let (id, token) = self.begin(session);

        let result = tokio::select! {
            _ = token.cancelled() => Err(AppError::Superseded),
            result = self.process(request, generator) => result,
        };

        self.finish(session, id);

        if matches!(result, Err(AppError::Superseded)) {
            warn!(session, "submission superseded by a newer one");
        }
        result
    }

    fn begin(&self, session: &str) -> (u64, CancellationToken) {
        let token = CancellationToken::new();
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let id = in_flight.next_id;
        in_flight.next_id += 1;
        if let Some((_, previous)) = in_flight.by_session.insert(session.to_string(), (id, token.clone())) {
            previous.cancel();
        }
        (id, token)
    }

    fn finish(&self, session: &str, id: u64) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // A newer run may already own the slot
        if in_flight.by_session.get(session).is_some_and(|(current, _)| *current == id) {
            in_flight.by_session.remove(session);
        }
    }

    async fn process(&self, request: &AdRequest, generator: &dyn GenerationClient) -> Result<AdCopyOutcome> {
        let start = Instant::now();

        let scraped = match request.landing_page() {
            Some(url) => self.scraper.scrape(url.as_str()).await,
            None => ScrapeOutcome::Fetched(String::new()),
        };

        let prompt = build_prompt(request, scraped.text());
        info!(
            keywords = request.keywords().len(),
            sentiment = %request.sentiment(),
            prompt_chars = prompt.len(),
            scrape_degraded = scraped.is_degraded(),
            "built generation prompt"
        );

        let raw = generator.generate(&prompt, request.temperature()).await?;
        let validation = parse_and_validate(&raw);

        info!(
            violations = validation.violations.len(),
            elapsed = ?start.elapsed(),
            "ad copy generated"
        );

        Ok(AdCopyOutcome {
            ad_copy: validation.items,
            violations: validation.violations,
            scrape_degraded: scraped.is_degraded(),
        })
    }
}
