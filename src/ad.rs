use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use url::Url;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Persuasive,
    Urgent,
}

impl Sentiment {
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Persuasive => "Persuasive",
            Sentiment::Urgent => "Urgent",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sentiment {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "persuasive" => Ok(Sentiment::Persuasive),
            "urgent" => Ok(Sentiment::Urgent),
            other => Err(AppError::InputError(format!("unknown sentiment {:?}", other))),
        }
    }
}

/// The three RSA slot types with their count and length limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Headlines,
    Descriptions,
    Paths,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Headlines, Section::Descriptions, Section::Paths];

    pub fn target_count(&self) -> usize {
        match self {
            Section::Headlines => 15,
            Section::Descriptions => 4,
            Section::Paths => 2,
        }
    }

    pub fn max_len(&self) -> usize {
        match self {
            Section::Headlines => 30,
            Section::Descriptions => 90,
            Section::Paths => 15,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Section::Headlines => "headlines",
            Section::Descriptions => "descriptions",
            Section::Paths => "paths",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated ad copy request. Built once per submission and never mutated.
#[derive(Debug, Clone)]
pub struct AdRequest {
    keywords: Vec<String>,
    landing_page: Option<Url>,
    sentiment: Sentiment,
    usps: Vec<String>,
    ctas: Vec<String>,
    temperature: f32,
}

impl AdRequest {
    pub fn new(
        keywords: Vec<String>,
        landing_page: Option<&str>,
        sentiment: Sentiment,
        usps: Vec<String>,
        ctas: Vec<String>,
        temperature: f32,
    ) -> Result<Self> {
        let keywords = non_empty("keywords", keywords)?;
        let usps = non_empty("usps", usps)?;
        let ctas = non_empty("ctas", ctas)?;

        let landing_page = match landing_page.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(parse_landing_page(raw)?),
            None => None,
        };

        if !(0.0..=1.0).contains(&temperature) {
            return Err(AppError::InputError(format!(
                "temperature must be between 0.0 and 1.0, got {}",
                temperature
            )));
        }

        Ok(AdRequest {
            keywords,
            landing_page,
            sentiment,
            usps,
            ctas,
            temperature,
        })
    }

    /// Builds a request from raw form fields: comma-separated lists, a URL,
    /// a sentiment label and a temperature.
    pub fn from_form(
        keywords: &str,
        landing_page: Option<&str>,
        sentiment: &str,
        usps: &str,
        ctas: &str,
        temperature: f32,
    ) -> Result<Self> {
        let sentiment = sentiment.parse::<Sentiment>()?;
        Self::new(
            split_list(keywords),
            landing_page,
            sentiment,
            split_list(usps),
            split_list(ctas),
            temperature,
        )
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn landing_page(&self) -> Option<&Url> {
        self.landing_page.as_ref()
    }

    pub fn sentiment(&self) -> Sentiment {
        self.sentiment
    }

    pub fn usps(&self) -> &[String] {
        &self.usps
    }

    pub fn ctas(&self) -> &[String] {
        &self.ctas
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

/// Splits a comma-separated form field, trimming entries and dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(field: &str, entries: Vec<String>) -> Result<Vec<String>> {
    let entries: Vec<String> = entries
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect();

    if entries.is_empty() {
        return Err(AppError::InputError(format!("{} must contain at least one entry", field)));
    }
    Ok(entries)
}

fn parse_landing_page(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| AppError::InputError(format!("landing page {:?} is not a valid URL: {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(AppError::InputError(format!(
            "landing page {:?} must be an http(s) URL",
            raw
        ))),
    }
}

/// Parsed and normalized ad copy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedAdCopy {
    pub headlines: Vec<String>,
    pub descriptions: Vec<String>,
    pub paths: Vec<String>,
}

impl GeneratedAdCopy {
    pub fn section(&self, section: Section) -> &[String] {
        match section {
            Section::Headlines => &self.headlines,
            Section::Descriptions => &self.descriptions,
            Section::Paths => &self.paths,
        }
    }

    pub fn section_mut(&mut self, section: Section) -> &mut Vec<String> {
        match section {
            Section::Headlines => &mut self.headlines,
            Section::Descriptions => &mut self.descriptions,
            Section::Paths => &mut self.paths,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn split_list_trims_and_drops_blanks() {
        assert_eq!(split_list(" a, ,b ,"), strings(&["a", "b"]));
        assert_eq!(split_list("shipping"), strings(&["shipping"]));
        assert!(split_list(" , ,").is_empty());
    }

    #[test]
    fn sentiment_parses_case_insensitively() {
        assert_eq!("positive".parse::<Sentiment>().unwrap(), Sentiment::Positive);
        assert_eq!(" URGENT ".parse::<Sentiment>().unwrap(), Sentiment::Urgent);
        assert!(matches!("angry".parse::<Sentiment>(), Err(AppError::InputError(_))));
    }

    #[test]
    fn from_form_builds_valid_request() {
        let request = AdRequest::from_form(
            "shipping, delivery",
            Some("https://example.com"),
            "Positive",
            "fast",
            "buy now",
            0.7,
        )
        .unwrap();

        assert_eq!(request.keywords(), strings(&["shipping", "delivery"]).as_slice());
        assert_eq!(request.landing_page().unwrap().as_str(), "https://example.com/");
        assert_eq!(request.sentiment(), Sentiment::Positive);
        assert_eq!(request.ctas(), strings(&["buy now"]).as_slice());
    }

    #[test]
    fn blank_landing_page_is_absent() {
        let request = AdRequest::from_form("a", Some("  "), "neutral", "b", "c", 0.0).unwrap();
        assert!(request.landing_page().is_none());
    }

    #[test]
    fn rejects_empty_required_lists() {
        for (k, u, c) in [(" , ", "u", "c"), ("k", "", "c"), ("k", "u", ",")] {
            let result = AdRequest::from_form(k, None, "neutral", u, c, 0.5);
            assert!(matches!(result, Err(AppError::InputError(_))));
        }
    }

    #[test]
    fn rejects_bad_urls_and_temperatures() {
        assert!(AdRequest::from_form("k", Some("not a url"), "neutral", "u", "c", 0.5).is_err());
        assert!(AdRequest::from_form("k", Some("ftp://example.com"), "neutral", "u", "c", 0.5).is_err());
        assert!(AdRequest::from_form("k", None, "neutral", "u", "c", 1.5).is_err());
        assert!(AdRequest::from_form("k", None, "neutral", "u", "c", -0.1).is_err());
        assert!(AdRequest::from_form("k", None, "neutral", "u", "c", f32::NAN).is_err());
    }

    #[test]
    fn section_limits() {
        assert_eq!((Section::Headlines.target_count(), Section::Headlines.max_len()), (15, 30));
        assert_eq!((Section::Descriptions.target_count(), Section::Descriptions.max_len()), (4, 90));
        assert_eq!((Section::Paths.target_count(), Section::Paths.max_len()), (2, 15));
    }
}
