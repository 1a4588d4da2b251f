//! SubRip (`.srt`) serializer.
//!
//! Each cue becomes one block:
//!
//! ```text
//! 1
//! 00:00:00,000 --> 00:00:02,340
//! Hello world.
//!
//! ```
//!
//! # Timing precision
//!
//! Seconds are rounded to the nearest millisecond before being split into
//! fields, so `59.9996` prints as `00:01:00,000` rather than `00:00:59,1000`.

use std::fmt::Write as _;
use std::path::Path;

use super::cue::{SubtitleCue, Timestamp};

/// Format a timestamp as `HH:MM:SS,mmm`.
///
/// ```
/// use doc_narrator::subtitle::{format_timestamp, Timestamp};
///
/// let ts = Timestamp::from_secs(3725.25).unwrap();
/// assert_eq!(format_timestamp(ts), "01:02:05,250");
/// assert_eq!(format_timestamp(Timestamp::ZERO), "00:00:00,000");
/// ```
pub fn format_timestamp(ts: Timestamp) -> String {
    let total_ms = (ts.as_secs() * 1000.0).round() as u64;

    let millis = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    format!("{hours:02}:{mins:02}:{secs:02},{millis:03}")
}

/// Render cues to SubRip text. Every block, including the last, ends with a
/// blank line.
pub fn render_srt(cues: &[SubtitleCue]) -> String {
    let mut output = String::new();

    for cue in cues {
        // Writing into a String cannot fail.
        let _ = write!(
            output,
            "{}\n{} --> {}\n{}\n\n",
            cue.index,
            format_timestamp(cue.start),
            format_timestamp(cue.end),
            cue.text
        );
    }

    output
}

/// Render `cues` and write them to `path` in one call.
pub fn write_srt(path: &Path, cues: &[SubtitleCue]) -> std::io::Result<()> {
    std::fs::write(path, render_srt(cues))
}
