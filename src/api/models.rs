use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::ad::Section;
use crate::pipeline::AdCopyOutcome;
use crate::text::capitalize_words;
use crate::validator::Violation;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

/// Raw form fields as the UI collects them. List fields are comma-separated.
#[derive(Deserialize)]
pub struct GenerateRequest {
    pub keywords: String,
    #[serde(default)]
    pub landing_page: Option<String>,
    pub sentiment: String,
    pub usps: String,
    pub ctas: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Key entered by the user, used instead of the configured one.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Identifies the submitting client; a new submission only supersedes
    /// in-flight work of the same session.
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Serialize)]
pub struct DisplayLabels {
    pub headlines: String,
    pub descriptions: String,
    pub paths: String,
    pub sentiment: String,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub headlines: Vec<String>,
    pub descriptions: Vec<String>,
    pub paths: Vec<String>,
    pub violations: Vec<Violation>,
    pub labels: DisplayLabels,
    pub scrape_degraded: bool,
    pub generated_at: DateTime<Utc>,
}

impl GenerateResponse {
    pub fn new(outcome: AdCopyOutcome, sentiment: &str) -> Self {
        let label = |section: Section| {
            format!(
                "{} ({} x {} chars)",
                capitalize_words(section.name()),
                section.target_count(),
                section.max_len()
            )
        };

        GenerateResponse {
            headlines: outcome.ad_copy.headlines,
            descriptions: outcome.ad_copy.descriptions,
            paths: outcome.ad_copy.paths,
            violations: outcome.violations,
            labels: DisplayLabels {
                headlines: label(Section::Headlines),
                descriptions: label(Section::Descriptions),
                paths: label(Section::Paths),
                sentiment: capitalize_words(sentiment),
            },
            scrape_degraded: outcome.scrape_degraded,
            generated_at: Utc::now(),
        }
    }
}
