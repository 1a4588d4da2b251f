//! Narration audio: decode → (resample for recognition) → reconcile → encode.
//!
//! # Pipeline
//!
//! ```text
//! narration.wav ─read_wav─▶ NarrationAudio ─┬─ resample_to_16k ─▶ Whisper
//!                                          └─ reconcile(video duration)
//!                                                └─write_wav─▶ narration-reconciled.wav
//! ```

pub mod reconcile;
pub mod resample;
pub mod wav;

pub use reconcile::{reconcile, target_sample_count, Adjustment, ReconciliationError};
pub use resample::{resample, resample_to_16k, stereo_to_mono, WHISPER_SAMPLE_RATE};
pub use wav::{read_wav, write_wav, AudioError, NarrationAudio};
