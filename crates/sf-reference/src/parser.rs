//! Reference parser
//!
//! Finds `[ref]` tokens in free text. A token is one to three identifier
//! segments joined by `:` inside a single bracket pair, with no whitespace.
//! Anything else (nested brackets, four segments, punctuation) stays literal.

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Pattern shared by every scan: `[seg]`, `[seg:seg]`, `[seg:seg:seg]`
static REFERENCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[([A-Za-z_][A-Za-z0-9_]*(?::[A-Za-z_][A-Za-z0-9_]*){0,2})\]")
        .expect("reference pattern is a valid regex")
});

/// One reference token found in text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence<'t> {
    /// Byte range of the bracketed token
    pub span: (usize, usize),

    /// Bracketed token exactly as written: `[location:forest]`
    pub original: &'t str,

    /// Reference string between the brackets: `location:forest`
    pub reference: &'t str,
}

impl Occurrence<'_> {
    /// Byte range of the bracketed token
    #[inline]
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.span.0..self.span.1
    }
}

/// Every reference occurrence, repeats included, left to right
pub fn occurrences(text: &str) -> impl Iterator<Item = Occurrence<'_>> {
    REFERENCE_PATTERN.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let inner = caps.get(1)?;
        Some(Occurrence {
            span: (whole.start(), whole.end()),
            original: whole.as_str(),
            reference: inner.as_str(),
        })
    })
}

/// Distinct reference strings in first-appearance order
///
/// Case-sensitive: `[Alice]` and `[alice]` are different references.
#[must_use]
pub fn find_references(text: &str) -> Vec<&str> {
    occurrences(text)
        .map(|occ| occ.reference)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Check whether text contains at least one reference token
#[inline]
#[must_use]
pub fn has_references(text: &str) -> bool {
    REFERENCE_PATTERN.is_match(text)
}
