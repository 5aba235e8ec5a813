//! Raw reference extraction from a DOM inspection result.
//!
//! The renderer's inspection script returns attribute values untouched; the
//! splitting of `srcset` lists and computed `background-image` values happens
//! here so it can be exercised without a browser.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

/// Matches every `url(...)` token of a CSS value, quoted or bare.
#[allow(clippy::expect_used)]
static CSS_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^)\s]*))\s*\)"#)
        .expect("CSS url() regex is valid") // Static pattern, safe to panic
});

/// Result of the one-shot DOM inspection script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DomSnapshot {
    /// `src` and `data-src` values of `img`, `source` and `video` elements.
    pub sources: Vec<String>,
    /// Raw `srcset` attribute values.
    pub srcsets: Vec<String>,
    /// Computed `background-image` values other than `none`.
    pub backgrounds: Vec<String>,
}

impl DomSnapshot {
    /// Flattens the snapshot into raw, possibly relative, references.
    #[must_use]
    pub fn into_references(self) -> Vec<String> {
        let mut references: Vec<String> = self
            .sources
            .into_iter()
            .filter(|source| !source.trim().is_empty())
            .collect();
        for srcset in &self.srcsets {
            references.extend(parse_srcset(srcset));
        }
        for background in &self.backgrounds {
            references.extend(background_image_urls(background));
        }
        references
    }
}

/// Splits a `srcset` attribute into its candidate URLs, dropping descriptors.
///
/// Candidate URLs are whitespace-delimited, so inline payloads containing
/// commas survive intact.
#[must_use]
pub fn parse_srcset(srcset: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    let mut rest = srcset;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }

        let url_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (raw_url, after) = rest.split_at(url_end);
        let url = raw_url.trim_end_matches(',');
        if !url.is_empty() {
            candidates.push(url.to_string());
        }

        // A trailing comma on the URL token ends the candidate without descriptors.
        if url.len() < raw_url.len() {
            rest = after;
            continue;
        }

        rest = skip_descriptors(after);
    }

    candidates
}

fn skip_descriptors(input: &str) -> &str {
    let mut depth = 0usize;
    for (index, ch) in input.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return &input[index + 1..],
            _ => {}
        }
    }
    ""
}

/// Extracts every URL from a computed `background-image` value.
#[must_use]
pub fn background_image_urls(value: &str) -> Vec<String> {
    CSS_URL_PATTERN
        .captures_iter(value)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
        .collect()
}
