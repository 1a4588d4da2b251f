//! Speech recognition and transcript alignment.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 TranscriptAligner                    │
//! │                                                      │
//! │  narration.wav ─read_wav─▶ resample_to_16k           │
//! │                                  │                   │
//! │                                  ▼                   │
//! │             SpeechRecognizer (trait, Arc<dyn>)       │
//! │   ┌─────────────┐    ┌──────────────────┐            │
//! │   │  ModelPaths │───▶│ WhisperRecognizer│            │
//! │   └─────────────┘    └────────┬─────────┘            │
//! │                               ▼                      │
//! │              Vec<TranscriptSegment>                  │
//! │                               │ segments_to_cues     │
//! │                               ▼                      │
//! │                      Vec<SubtitleCue>                │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use doc_narrator::stt::{TranscribeParams, TranscriptAligner, WhisperRecognizer};
//!
//! let recognizer = WhisperRecognizer::load("models/ggml-small.bin", TranscribeParams::default(), false)
//!     .expect("model not found");
//! let aligner = TranscriptAligner::new(Arc::new(recognizer));
//! let cues = aligner.align("narration.wav".as_ref(), "en").unwrap();
//! println!("{} cues", cues.len());
//! ```

pub mod aligner;
pub mod engine;
pub mod model;
pub mod transcribe;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use aligner::{segments_to_cues, TranscriptAligner};
pub use engine::{SpeechRecognizer, TranscriptionError, WhisperRecognizer};
pub use model::{find_model_by_id, ModelInfo, ModelPaths, WHISPER_MODELS};
pub use transcribe::{SamplingStrategy, TranscribeParams, TranscriptSegment};

// test-only re-export so the pipeline test module can import MockRecognizer
// without `use doc_narrator::stt::engine::MockRecognizer`.
#[cfg(test)]
pub use engine::MockRecognizer;
