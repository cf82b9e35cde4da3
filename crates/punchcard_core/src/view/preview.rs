//! Display projections derived from entry text.
//!
//! # Responsibility
//! - Derive a stable one-line title for timeline and snapshot views.
//! - Derive a markdown-free excerpt and preview image for list rows.
//!
//! # Invariants
//! - Derivations are pure and never mutate the entry.
//! - Blank input yields an empty title and `None` excerpt.

use crate::model::entry::Entry;
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum characters kept by [`entry_title`].
pub const TITLE_MAX_CHARS: usize = 120;
/// Maximum characters kept by list excerpts.
pub const EXCERPT_MAX_CHARS: usize = 140;

static FIRST_SENTENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?[.!?])(\s|$)").expect("valid sentence regex"));
static MARKDOWN_IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*]\(([^)]+)\)").expect("valid image regex"));
static MARKDOWN_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link regex"));
static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\*_`#>~\[\]\(\)!]+"#).expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Derived presentation fields for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPreview {
    /// First sentence (or first line) of the text.
    pub title: String,
    /// Markdown-stripped, whitespace-normalized excerpt.
    pub excerpt: Option<String>,
    /// Attached image url, else the first markdown image in the text.
    pub image: Option<String>,
}

/// Derives the stable title for an entry text.
///
/// Rules: take the first non-blank line; if it starts with a sentence ending
/// in `.`, `!` or `?` followed by whitespace or end of line, keep only that
/// sentence; cap at [`TITLE_MAX_CHARS`] characters and trim.
pub fn entry_title(text: &str) -> String {
    let first_line = text
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");
    let sentence = FIRST_SENTENCE_RE
        .captures(first_line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(first_line);
    sentence
        .chars()
        .take(TITLE_MAX_CHARS)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Strips markdown syntax and keeps the first `max_chars` characters.
pub fn excerpt(text: &str, max_chars: usize) -> Option<String> {
    let without_images = MARKDOWN_IMAGE_RE.replace_all(text, " ");
    let without_links = MARKDOWN_LINK_RE.replace_all(&without_images, "$1");
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(&without_links, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(max_chars).collect())
    }
}

/// Derives title, excerpt and preview image for an entry.
pub fn derive_entry_preview(entry: &Entry) -> EntryPreview {
    let image = entry.image_url.clone().or_else(|| {
        MARKDOWN_IMAGE_RE
            .captures(&entry.text)
            .and_then(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
            .filter(|value| !value.is_empty())
    });
    EntryPreview {
        title: entry_title(&entry.text),
        excerpt: excerpt(&entry.text, EXCERPT_MAX_CHARS),
        image,
    }
}
