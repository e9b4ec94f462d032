use std::fmt::Write;

use crate::ad::{AdRequest, Section};
use crate::text::{capitalize_words, char_len, truncate};

pub const SYSTEM_PROMPT: &str = "You are an expert ad copywriter for Google Ads.";

/// Scraped page text beyond this many characters is cut from the prompt.
pub const SCRAPED_CONTENT_BUDGET: usize = 1000;

/// Composes the user message for one ad copy generation.
///
/// The RSA limits and the reply layout are restated on every call; the
/// service keeps no state between requests.
pub fn build_prompt(request: &AdRequest, scraped: &str) -> String {
    let headlines = Section::Headlines;
    let descriptions = Section::Descriptions;
    let paths = Section::Paths;

    let landing_page = request
        .landing_page()
        .map(|url| url.to_string())
        .unwrap_or_else(|| "not provided".to_string());

    let website_content = if scraped.trim().is_empty() {
        "unavailable".to_string()
    } else if char_len(scraped) > SCRAPED_CONTENT_BUDGET {
        format!("{} (truncated for brevity)", truncate(scraped, SCRAPED_CONTENT_BUDGET))
    } else {
        scraped.to_string()
    };

    let mut result = String::with_capacity(website_content.len() + 1200);
    result.push_str("Generate a Google Responsive Search Ad with the following parameters:\n");
    // Writing into a String cannot fail
    let _ = writeln!(result, "- Keywords: {}", request.keywords().join(", "));
    let _ = writeln!(result, "- Landing Page: {}", landing_page);
    let _ = writeln!(result, "- Sentiment: {}", request.sentiment());
    let _ = writeln!(result, "- Unique Selling Points: {}", request.usps().join(", "));
    let _ = writeln!(result, "- Call-To-Actions: {}", request.ctas().join(", "));
    let _ = writeln!(result, "- Website Content: {}", website_content);

    result.push_str("\nEnsure that:\n");
    let _ = writeln!(
        result,
        "- Headlines are full sentences, max {} characters each ({} headlines)",
        headlines.max_len(),
        headlines.target_count()
    );
    let _ = writeln!(
        result,
        "- Descriptions are max {} characters each ({} descriptions)",
        descriptions.max_len(),
        descriptions.target_count()
    );
    let _ = writeln!(
        result,
        "- Paths ({}) are max {} characters each",
        paths.target_count(),
        paths.max_len()
    );
    result.push_str("- Ad copy complies with Google Ads policies\n");

    result.push_str("\nReply with exactly three sections in this layout and nothing else:\n");
    for section in Section::ALL {
        let _ = writeln!(result, "{}:", capitalize_words(section.name()));
        for n in 1..=section.target_count() {
            let _ = writeln!(result, "{}. <{} {}>", n, singular(section), n);
        }
    }

    result
}

fn singular(section: Section) -> &'static str {
    match section {
        Section::Headlines => "headline",
        Section::Descriptions => "description",
        Section::Paths => "path",
    }
}
