//! Parsing and validation of generated ad copy.
//!
//! The generation service is asked for a reply of the form
//!
//! ```text
//! Headlines:
//! 1. ...
//! Descriptions:
//! 1. ...
//! Paths:
//! 1. ...
//! ```
//!
//! but nothing forces it to comply, so parsing is deliberately loose:
//!
//! * A header is a line that, once markdown decoration (`#`, `*`, `_`) is
//!   stripped, starts with `headline`, `description` or `path` (optionally
//!   `display path`), followed only by an optional parenthetical and colon.
//!   Text after the colon on a header line is taken as an item.
//! * Every other non-blank line belongs to the current section. List markers
//!   (`1.`, `1)`, `1 -`, `(1)`, `-`, `*`, `•`), item labels (`Headline 1:`,
//!   also in bold), quotes, bold markers, trailing `,`/`;` and count
//!   annotations like `(28 chars)` are stripped.
//! * A line without a marker that reads as commentary (ends in `:` or opens
//!   with `Note`, `Tip`, `Here are`, ...) is dropped.
//! * Path items containing `/` are split into segments; a leading scheme or
//!   domain (`example.com/shoes`) is not a path.
//! * Lines before the first header are preamble. If there is no header at
//!   all, every line is treated as a headline so the problem shows up as
//!   violations rather than an error.
//!
//! Nothing here fails: deviations from the RSA limits are reported as
//! [`Violation`]s next to a best-effort [`GeneratedAdCopy`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::ad::{GeneratedAdCopy, Section};
use crate::text::{char_len, truncate};

static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(headline|description|(?:display\s+(?:url\s+)?)?path)s?\b\s*(?:\([^)]*\))?\s*(?::\s*(.*))?$",
    )
    .expect("Failed to compile header regex")
});

static BULLET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[-*•]\s+|\(\d{1,2}\)\s*|\d{1,2}\s*[.):\]]\s*|\d{1,2}\s*[-–]\s+)")
        .expect("Failed to compile bullet regex")
});

static ITEM_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:headline|description|path)\s*#?\d{1,2}\s*[:.)\-–]\**\s*")
        .expect("Failed to compile item label regex")
});

static COMMENTARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:notes?\b|tips?\b|remember\b|here\s+(?:is|are)\b|these\s+(?:are|headlines|descriptions|paths)\b)|:$",
    )
    .expect("Failed to compile commentary regex")
});

static COUNT_ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*[(\[]\s*\d+\s*(?:chars?|characters?)\s*[)\]]\s*$")
        .expect("Failed to compile count annotation regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationKind {
    Oversized,
    CountMismatch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub section: Section,
    /// Item position within the section; `None` for section-level problems.
    pub index: Option<usize>,
    pub kind: ViolationKind,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub items: GeneratedAdCopy,
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemClass {
    Conforming,
    Oversized { len: usize },
}

pub fn classify(section: Section, item: &str) -> ItemClass {
    let len = char_len(item);
    if len > section.max_len() {
        ItemClass::Oversized { len }
    } else {
        ItemClass::Conforming
    }
}

#[derive(Debug)]
struct Candidate {
    text: String,
    commentary: bool,
}

/// Parses a raw reply into ad copy and checks it against the RSA limits.
pub fn parse_and_validate(raw: &str) -> ValidationResult {
    let parsed = segment(raw);
    let mut result = ValidationResult::default();

    for section in Section::ALL {
        let items = parsed.section(section);

        if items.len() != section.target_count() {
            let mut detail = format!("expected {}, got {}", section.target_count(), items.len());
            if items.is_empty() {
                detail.push_str(" (section not found)");
            }
            result.violations.push(Violation {
                section,
                index: None,
                kind: ViolationKind::CountMismatch,
                detail,
            });
        }

        for (index, item) in items.iter().enumerate() {
            let normalized = match classify(section, item) {
                ItemClass::Conforming => item.clone(),
                ItemClass::Oversized { len } => {
                    let cut = truncate(item, section.max_len());
                    result.violations.push(Violation {
                        section,
                        index: Some(index),
                        kind: ViolationKind::Oversized,
                        detail: format!(
                            "{} characters, limit {}; truncated to {:?}",
                            len,
                            section.max_len(),
                            cut
                        ),
                    });
                    cut
                }
            };
            result.items.section_mut(section).push(normalized);
        }
    }

    debug!(
        headlines = result.items.headlines.len(),
        descriptions = result.items.descriptions.len(),
        paths = result.items.paths.len(),
        violations = result.violations.len(),
        "validated generated ad copy"
    );

    result
}

/// Splits a raw reply into sections without judging lengths or counts.
pub fn segment(raw: &str) -> GeneratedAdCopy {
    let mut headlines = Vec::new();
    let mut descriptions = Vec::new();
    let mut paths = Vec::new();
    let mut preamble = Vec::new();
    let mut current: Option<Section> = None;
    let mut found_header = false;

    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some((section, inline)) = parse_header(line) {
            current = Some(section);
            found_header = true;
            if let Some((text, _)) = inline.as_deref().and_then(clean_item) {
                bucket(section, &mut headlines, &mut descriptions, &mut paths)
                    .push(Candidate { text, commentary: false });
            }
            continue;
        }

        let Some((text, marked)) = clean_item(line) else {
            continue;
        };
        let commentary = !marked && COMMENTARY.is_match(&text);
        let candidate = Candidate { text, commentary };

        match current {
            Some(section) => bucket(section, &mut headlines, &mut descriptions, &mut paths).push(candidate),
            None => preamble.push(candidate),
        }
    }

    if !found_header {
        debug!("no section headers in reply, treating every line as a headline");
        headlines = preamble;
    }

    GeneratedAdCopy {
        headlines: keep_items(headlines),
        descriptions: keep_items(descriptions),
        paths: split_paths(keep_items(paths)),
    }
}

fn split_paths(items: Vec<String>) -> Vec<String> {
    let mut segments = Vec::with_capacity(items.len());
    for item in &items {
        let item = item.trim();
        let item = item
            .strip_prefix("https://")
            .or_else(|| item.strip_prefix("http://"))
            .unwrap_or(item);

        let mut parts: Vec<&str> = item
            .split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .collect();
        // example.com/shoes/sale: the domain is not a path segment
        if parts.len() > 1 && parts[0].contains('.') {
            parts.remove(0);
        }
        segments.extend(parts.into_iter().map(str::to_string));
    }
    segments
}

fn bucket<'a>(
    section: Section,
    headlines: &'a mut Vec<Candidate>,
    descriptions: &'a mut Vec<Candidate>,
    paths: &'a mut Vec<Candidate>,
) -> &'a mut Vec<Candidate> {
    match section {
        Section::Headlines => headlines,
        Section::Descriptions => descriptions,
        Section::Paths => paths,
    }
}

fn keep_items(candidates: Vec<Candidate>) -> Vec<String> {
    candidates
        .into_iter()
        .filter(|c| !c.commentary)
        .map(|c| c.text)
        .collect()
}

fn parse_header(line: &str) -> Option<(Section, Option<String>)> {
    let stripped = line.trim().trim_matches(|c: char| c == '#' || c == '*' || c == '_' || c.is_whitespace());
    let caps = HEADER.captures(stripped)?;

    let keyword = caps.get(1)?.as_str().to_lowercase();
    let section = if keyword.starts_with("headline") {
        Section::Headlines
    } else if keyword.starts_with("description") {
        Section::Descriptions
    } else {
        Section::Paths
    };

    let inline = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty());

    Some((section, inline))
}

/// Cleaned item text, and whether the line carried a bullet or item label.
fn clean_item(line: &str) -> Option<(String, bool)> {
    let mut text = line.trim();
    let mut bullet = false;
    let mut label = false;

    // Markers and bold nest in any order: `1. **Headline 1:** text`
    loop {
        let before = text;
        if !bullet {
            if let Some(end) = bullet_end(text) {
                text = &text[end..];
                bullet = true;
            }
        }
        if !label {
            if let Some(m) = ITEM_LABEL.find(text) {
                text = &text[m.end()..];
                label = true;
            }
        }
        text = strip_decoration(text);
        if text == before {
            break;
        }
    }

    let text = COUNT_ANNOTATION.replace(text, "");
    let text = strip_decoration(text.trim_end_matches([',', ';']));
    let text = strip_quotes(text).trim();

    if text.is_empty() {
        None
    } else {
        Some((text.to_string(), bullet || label))
    }
}

// `1.5x faster` and `10:00` start with digits, not with a list number
fn bullet_end(text: &str) -> Option<usize> {
    let m = BULLET.find(text)?;
    let rest = &text[m.end()..];
    if m.as_str().ends_with(['.', ':']) && rest.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(m.end())
}

fn strip_decoration(text: &str) -> &str {
    text.trim().trim_matches(|c: char| c == '*' || c == '_').trim()
}

fn strip_quotes(text: &str) -> &str {
    const PAIRS: [(char, char); 4] = [('"', '"'), ('\'', '\''), ('“', '”'), ('‘', '’')];

    for (open, close) in PAIRS {
        if let Some(inner) = text.strip_prefix(open).and_then(|t| t.strip_suffix(close)) {
            return inner;
        }
    }
    text
}
