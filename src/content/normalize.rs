//! Cleans raw extracted document text into narration-ready [`TextContent`].
//!
//! Rules, applied in this order on every pass:
//!
//! | # | Pattern                                   | Replacement |
//! |---|-------------------------------------------|-------------|
//! | a | `\'`, `\"`                                | `'`, `"`    |
//! | b | `ABC D EFG - X - 123` (byline / dataset)  | removed     |
//! | c | `12. HEADING`                             | removed     |
//! | d | any whitespace run                        | one space, then trim |
//!
//! A single regex pass can expose a new match (removing `8. AB` from
//! `7. 8. AB CD` leaves `7. CD`), so passes repeat until the text stops
//! changing. The result is therefore a fixed point: normalizing it again is
//! a no-op.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static ESCAPED_QUOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\\(['"])"#).expect("valid escaped-quote regex"));

static BYLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z]+\s[A-Z]\s[A-Z]+\s-\s[A-Z]\s-\s\d+\b").expect("valid byline regex")
});

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+\.\s[A-Z]+\b").expect("valid heading regex"));

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

// ---------------------------------------------------------------------------
// TextContent
// ---------------------------------------------------------------------------

/// Normalized narration text: single-spaced, trimmed, free of extraction
/// artifacts. Only [`normalize`] produces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextContent(String);

impl TextContent {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for TextContent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TextContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// normalize
// ---------------------------------------------------------------------------

/// Apply the cleanup rules until the text is stable.
///
/// ```
/// use doc_narrator::content::normalize;
///
/// let raw = "1. INTRODUCTION  It\\'s   a\ttest.\n";
/// assert_eq!(normalize(raw).as_str(), "It's a test.");
/// ```
pub fn normalize(raw: &str) -> TextContent {
    let mut text = raw.to_owned();
    loop {
        let next = apply_rules(&text);
        if next == text {
            return TextContent(text);
        }
        text = next;
    }
}

fn apply_rules(text: &str) -> String {
    let text = ESCAPED_QUOTE.replace_all(text, "$1");
    let text = BYLINE.replace_all(&text, "");
    let text = HEADING.replace_all(&text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescapes_quotes() {
        assert_eq!(normalize(r#"it\'s \"quoted\""#).as_str(), r#"it's "quoted""#);
    }

    #[test]
    fn removes_byline_with_dataset_suffix() {
        let raw = "Results JOHN Q PUBLIC - A - 2023 were strong.";
        assert_eq!(normalize(raw).as_str(), "Results were strong.");
    }

    #[test]
    fn keeps_caps_without_dataset_suffix() {
        assert_eq!(normalize("NASA U SA rocks").as_str(), "NASA U SA rocks");
    }

    #[test]
    fn removes_numbered_headings() {
        let raw = "2. METHODS We sampled. 3. RESULTS It worked.";
        assert_eq!(normalize(raw).as_str(), "We sampled. It worked.");
    }

    #[test]
    fn keeps_numbers_followed_by_lowercase() {
        assert_eq!(normalize("Step 1. then 2. more").as_str(), "Step 1. then 2. more");
    }

    #[test]
    fn collapses_whitespace_and_trims() {
        assert_eq!(normalize("  a \n\n b\t\tc  ").as_str(), "a b c");
    }

    #[test]
    fn empty_and_blank_input() {
        assert!(normalize("").is_empty());
        assert!(normalize(" \n\t ").is_empty());
    }

    #[test]
    fn exposed_heading_is_removed_on_a_later_pass() {
        // First pass removes "8. AB", leaving "7.  CD" → "7. CD" → removed.
        assert_eq!(normalize("7. 8. AB CD tail").as_str(), "tail");
    }

    #[test]
    fn double_escaped_quote_settles() {
        assert_eq!(normalize(r"a\\'b").as_str(), "a'b");
    }

    #[test]
    fn normalize_is_idempotent() {
        let samples = [
            "",
            "Hello world.",
            "1. INTRO\n\nText  with   gaps",
            "7. 8. AB CD tail",
            r"it\\\'s",
            "JOHN Q PUBLIC - A - 2023 JANE R DOE - B - 7 end",
            "  mixed\u{00a0}unicode\u{2003}spaces — ok ",
            "9. 10. 11. ABC DEF GHI",
        ];
        for raw in samples {
            let once = normalize(raw);
            let twice = normalize(once.as_str());
            assert_eq!(once, twice, "not idempotent for {raw:?}");
        }
    }
}
