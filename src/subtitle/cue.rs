//! Subtitle cue types.
//!
//! A [`SubtitleCue`] holds two [`Timestamp`]s, which can only be built from
//! non-negative finite seconds, so anything that reaches the serializer is
//! already printable.

use std::fmt;

/// The SubRip timing delimiter. Cue text must never contain it.
pub const ARROW: &str = "-->";

/// What [`ARROW`] is replaced with inside cue text.
pub const ARROW_SUBSTITUTE: &str = "→";

/// Body of a cue whose recognized text is empty.
pub const EMPTY_CUE_TEXT: &str = "…";

// ---------------------------------------------------------------------------
// Timestamp
// ---------------------------------------------------------------------------

/// A point on the narration timeline, in seconds. Always finite and `>= 0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Timestamp(f64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0.0);

    /// `None` for negative, NaN or infinite input.
    ///
    /// ```
    /// use doc_narrator::subtitle::Timestamp;
    ///
    /// assert!(Timestamp::from_secs(1.5).is_some());
    /// assert!(Timestamp::from_secs(-0.1).is_none());
    /// assert!(Timestamp::from_secs(f64::NAN).is_none());
    /// ```
    pub fn from_secs(secs: f64) -> Option<Self> {
        (secs.is_finite() && secs >= 0.0).then_some(Self(secs))
    }

    pub fn as_secs(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    /// SubRip form, `HH:MM:SS,mmm`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&super::srt::format_timestamp(*self))
    }
}

// ---------------------------------------------------------------------------
// SubtitleCue
// ---------------------------------------------------------------------------

/// One timed subtitle entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    /// 1-based position in the subtitle file.
    pub index: usize,
    pub start: Timestamp,
    pub end: Timestamp,
    /// Sanitized text; see [`sanitize_cue_text`].
    pub text: String,
}

impl SubtitleCue {
    /// Build a cue, sanitizing `text` on the way in.
    pub fn new(index: usize, start: Timestamp, end: Timestamp, text: &str) -> Self {
        Self {
            index,
            start,
            end,
            text: sanitize_cue_text(text),
        }
    }
}

/// Trim, drop blank lines, and replace the `-->` delimiter with `→`.
///
/// Blank lines are removed because a blank line ends a SubRip block.
///
/// ```
/// use doc_narrator::subtitle::sanitize_cue_text;
///
/// assert_eq!(sanitize_cue_text("  a --> b  "), "a → b");
/// assert_eq!(sanitize_cue_text("one\n\n two "), "one\ntwo");
/// ```
pub fn sanitize_cue_text(text: &str) -> String {
    text.replace(ARROW, ARROW_SUBSTITUTE)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_rejects_invalid_seconds() {
        assert!(Timestamp::from_secs(-1.0).is_none());
        assert!(Timestamp::from_secs(f64::INFINITY).is_none());
        assert!(Timestamp::from_secs(f64::NEG_INFINITY).is_none());
        assert!(Timestamp::from_secs(f64::NAN).is_none());
    }

    #[test]
    fn timestamp_accepts_zero() {
        assert_eq!(Timestamp::from_secs(0.0), Some(Timestamp::ZERO));
    }

    #[test]
    fn timestamp_display_is_srt_format() {
        let ts = Timestamp::from_secs(3725.25).unwrap();
        assert_eq!(ts.to_string(), "01:02:05,250");
    }

    #[test]
    fn arrow_is_replaced() {
        assert_eq!(sanitize_cue_text("x --> y"), "x → y");
    }

    #[test]
    fn long_dash_runs_never_reintroduce_the_arrow() {
        for input in ["--->", "---->", "----->>", "a-->-->b", "-- >"] {
            let out = sanitize_cue_text(input);
            assert!(!out.contains(ARROW), "{input:?} → {out:?}");
        }
    }

    #[test]
    fn text_is_trimmed() {
        assert_eq!(sanitize_cue_text("   Hello world.  "), "Hello world.");
    }

    #[test]
    fn new_sanitizes_text() {
        let cue = SubtitleCue::new(1, Timestamp::ZERO, Timestamp::ZERO, " a-->b ");
        assert_eq!(cue.text, "a→b");
    }
}
