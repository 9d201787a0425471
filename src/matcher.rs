//! Year detection and snippet extraction.
//!
//! A [`YearMatcher`] is compiled once from the configured year set and then
//! applied to every extracted page field. Body text (`main_text`) reports a
//! window of context around each hit; every other field reports its first
//! [`SNIPPET_CHARS`] characters.
//!
//! All offsets here are counted in `char`s, not bytes, so snippets never split
//! a multi-byte code point.

use crate::models::{FieldSource, YearMatch};
use regex::Regex;
use tracing::debug;

/// Characters of context kept on each side of a body-text match.
pub const CONTEXT_RADIUS: usize = 50;

/// Characters kept from the start of a non-body field.
pub const SNIPPET_CHARS: usize = 100;

/// Compiled matcher for a fixed set of years.
#[derive(Debug, Clone)]
pub struct YearMatcher {
    regex: Regex,
}

impl YearMatcher {
    /// Build an alternation over `years`.
    ///
    /// No word boundaries are added: `"20201"` yields a `2020` hit.
    pub fn new<S: AsRef<str>>(years: &[S]) -> Result<Self, regex::Error> {
        let pattern = years
            .iter()
            .map(|y| regex::escape(y.as_ref()))
            .collect::<Vec<_>>()
            .join("|");
        let regex = Regex::new(&pattern)?;
        Ok(Self { regex })
    }

    /// Scan one field and emit a record per non-overlapping match.
    pub fn scan(&self, url: &str, source: FieldSource, content: &str) -> Vec<YearMatch> {
        self.regex
            .find_iter(content)
            .map(|m| {
                let snippet = match source {
                    FieldSource::MainText => context_window(content, m.start(), m.end()),
                    _ => truncate_chars(content, SNIPPET_CHARS),
                };
                YearMatch::new(m.as_str(), url, source, snippet)
            })
            .collect()
    }

    /// Scan every extracted field of a page, preserving field order.
    pub fn scan_page(&self, url: &str, fields: &[(FieldSource, String)]) -> Vec<YearMatch> {
        let records: Vec<YearMatch> = fields
            .iter()
            .flat_map(|(source, content)| self.scan(url, *source, content))
            .collect();
        debug!(%url, fields = fields.len(), records = records.len(), "Scanned page");
        records
    }
}

/// The text surrounding a match at byte range `start..end`.
///
/// Keeps up to [`CONTEXT_RADIUS`] chars before `start` and after `end`,
/// clamped to the bounds of `content`.
pub fn context_window(content: &str, start: usize, end: usize) -> &str {
    let from = content[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_RADIUS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let to = content[end..]
        .char_indices()
        .nth(CONTEXT_RADIUS)
        .map(|(i, _)| end + i)
        .unwrap_or(content.len());
    &content[from..to]
}

/// At most the first `max` chars of `s`.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
