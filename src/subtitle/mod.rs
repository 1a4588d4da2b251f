//! Timed subtitle cues and their SubRip serialization.

pub mod cue;
pub mod srt;

pub use cue::{
    sanitize_cue_text, SubtitleCue, Timestamp, ARROW, ARROW_SUBSTITUTE, EMPTY_CUE_TEXT,
};
pub use srt::{format_timestamp, render_srt, write_srt};
