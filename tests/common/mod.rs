#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rsa_adcopy::config::Config;
use rsa_adcopy::llm::{GenerationClient, GenerationError};

pub const HEADLINES: [&str; 15] = [
    "Fast Shipping On Every Order",
    "Get It Delivered Tomorrow",
    "Ship Smarter, Not Harder",
    "Buy Now And Save Today",
    "Your Parcel, Our Priority",
    "Free Returns, Always",
    "Track Every Package Live",
    "Shipping Made Simple",
    "Delivery You Can Trust",
    "Order Today, Smile Tomorrow",
    "Low Rates, Fast Service",
    "Ship Anywhere In The US",
    "Same Day Dispatch Daily",
    "Happy Customers Nationwide",
    "Start Shipping Right Now",
];

pub const DESCRIPTIONS: [&str; 4] = [
    "Fast, reliable shipping for every order. Buy now and get it at your door tomorrow.",
    "Free returns and live tracking on all parcels. Shipping has never been this easy.",
    "Thousands of happy customers trust us with their deliveries. Join them today.",
    "Low rates, quick dispatch and friendly support. Buy now and ship with confidence.",
];

pub const PATHS: [&str; 2] = ["shipping", "fast-delivery"];

/// A reply in the layout the prompt asks for.
pub fn well_formed_reply() -> String {
    let mut reply = String::from("Headlines:\n");
    for (i, headline) in HEADLINES.iter().enumerate() {
        reply.push_str(&format!("{}. {}\n", i + 1, headline));
    }
    reply.push_str("\nDescriptions:\n");
    for (i, description) in DESCRIPTIONS.iter().enumerate() {
        reply.push_str(&format!("{}. {}\n", i + 1, description));
    }
    reply.push_str("\nPaths:\n");
    for (i, path) in PATHS.iter().enumerate() {
        reply.push_str(&format!("{}. {}\n", i + 1, path));
    }
    reply
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Configuration with short timeouts and no credential.
pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "SCRAPE_TIMEOUT_SECS" => Some("1".to_string()),
        "GENERATION_TIMEOUT_SECS" => Some("5".to_string()),
        _ => None,
    })
    .unwrap()
}

/// Generation client returning a fixed reply and remembering its prompts.
pub struct StubGenerator {
    reply: Result<String, GenerationError>,
    delay: Duration,
    pub prompts: Mutex<Vec<(String, f32)>>,
}

impl StubGenerator {
    pub fn replying(reply: impl Into<String>) -> Self {
        StubGenerator {
            reply: Ok(reply.into()),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: GenerationError) -> Self {
        StubGenerator {
            reply: Err(error),
            delay: Duration::ZERO,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn last_prompt(&self) -> Option<(String, f32)> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl GenerationClient for StubGenerator {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push((prompt.to_string(), temperature));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.clone()
    }
}
