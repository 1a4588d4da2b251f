//! Speech recognizer trait and implementations.
//!
//! # Overview
//!
//! [`SpeechRecognizer`] is the interface used by the
//! [`TranscriptAligner`](crate::stt::TranscriptAligner).  It is object-safe
//! and `Send + Sync` so it can be held behind an `Arc<dyn SpeechRecognizer>`
//! and shared by every job in the process.
//!
//! [`WhisperRecognizer`] is the production implementation that wraps a
//! `whisper_rs::WhisperContext`.  Construct it with [`WhisperRecognizer::load`].
//!
//! [`MockRecognizer`] (available under `#[cfg(test)]`) returns pre-configured
//! segments without loading a model.

use std::borrow::Cow;
use std::path::Path;

use thiserror::Error;
use whisper_rs::{FullParams, WhisperContext, WhisperContextParameters};

use crate::audio::{AudioError, WHISPER_SAMPLE_RATE};
use crate::stt::transcribe::{SamplingStrategy, TranscribeParams, TranscriptSegment};

// ---------------------------------------------------------------------------
// TranscriptionError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// The GGML model file was not found at the given path.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// `whisper_rs` failed to initialise a `WhisperContext` or `WhisperState`.
    #[error("Whisper context initialisation failed: {0}")]
    ContextInit(String),

    /// An error occurred during the inference pass.
    #[error("recognition failed: {0}")]
    Recognizer(String),

    #[error("narration audio is empty")]
    EmptyAudio,

    /// A segment's timing is negative, non-finite, inverted, or out of order.
    #[error("segment {index} has malformed timing: {reason}")]
    MalformedSegment { index: usize, reason: String },

    #[error(transparent)]
    Audio(#[from] AudioError),
}

// ---------------------------------------------------------------------------
// SpeechRecognizer trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface for speech recognition.
///
/// # Contract
///
/// - `audio` must be **16 kHz, mono, f32** PCM samples.
/// - `language` is an ISO-639-1 code; it is always honoured, never
///   auto-detected.
/// - Returns `Err(TranscriptionError::EmptyAudio)` when `audio` is empty.
/// - Segments come back in the order the recognizer emitted them.
pub trait SpeechRecognizer: Send + Sync {
    fn recognize(
        &self,
        audio: &[f32],
        language: &str,
    ) -> Result<Vec<TranscriptSegment>, TranscriptionError>;
}

// Compile-time assertion: Box<dyn SpeechRecognizer> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechRecognizer>) {}
};

/// whisper.cpp skips inputs shorter than one second; short narrations are
/// padded with trailing silence up to this length.
const MIN_INPUT_SAMPLES: usize = WHISPER_SAMPLE_RATE as usize + WHISPER_SAMPLE_RATE as usize / 10;

// ---------------------------------------------------------------------------
// WhisperRecognizer
// ---------------------------------------------------------------------------

/// Production recognizer that wraps a `whisper_rs::WhisperContext`.
///
/// The model is loaded once. A new `WhisperState` is created for every
/// [`recognize`] call so the recognizer can be shared across jobs without
/// any locking.
///
/// [`recognize`]: SpeechRecognizer::recognize
pub struct WhisperRecognizer {
    ctx: WhisperContext,
    params: TranscribeParams,
}

impl std::fmt::Debug for WhisperRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperRecognizer")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

// `WhisperContext` holds a raw pointer internally but declares
// `unsafe impl Send` and `unsafe impl Sync` in whisper-rs; the model
// weights are read-only after loading.
// SAFETY: WhisperContext is Send+Sync as declared by whisper-rs.
unsafe impl Send for WhisperRecognizer {}
unsafe impl Sync for WhisperRecognizer {}

impl WhisperRecognizer {
    /// Load a GGML model from `model_path` and prepare it for inference.
    ///
    /// # Errors
    ///
    /// - [`TranscriptionError::ModelNotFound`]: `model_path` does not exist.
    /// - [`TranscriptionError::ContextInit`]: whisper-rs failed to load the file.
    pub fn load(
        model_path: impl AsRef<Path>,
        params: TranscribeParams,
        use_gpu: bool,
    ) -> Result<Self, TranscriptionError> {
        let path = model_path.as_ref();

        if !path.exists() {
            return Err(TranscriptionError::ModelNotFound(path.display().to_string()));
        }

        let path_str = path.to_str().ok_or_else(|| {
            TranscriptionError::ModelNotFound(format!(
                "model path contains non-UTF-8 characters: {}",
                path.display()
            ))
        })?;

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(use_gpu);
        let ctx = WhisperContext::new_with_params(path_str, ctx_params)
            .map_err(|e| TranscriptionError::ContextInit(e.to_string()))?;

        log::info!("stt: loaded model {}", path.display());
        Ok(Self { ctx, params })
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn recognize(
        &self,
        audio: &[f32],
        language: &str,
    ) -> Result<Vec<TranscriptSegment>, TranscriptionError> {
        if audio.is_empty() {
            return Err(TranscriptionError::EmptyAudio);
        }

        let audio: Cow<'_, [f32]> = if audio.len() < MIN_INPUT_SAMPLES {
            let mut buf = audio.to_vec();
            buf.resize(MIN_INPUT_SAMPLES, 0.0);
            Cow::Owned(buf)
        } else {
            Cow::Borrowed(audio)
        };

        // ── Build FullParams ──────────────────────────────────────────────
        use whisper_rs::SamplingStrategy as WS;
        let ws = match self.params.strategy {
            SamplingStrategy::Greedy { best_of } => WS::Greedy { best_of },
            SamplingStrategy::BeamSearch { beam_size, patience } => {
                WS::BeamSearch { beam_size, patience }
            }
        };

        let mut fp = FullParams::new(ws);
        fp.set_language(Some(language));
        fp.set_n_threads(self.params.n_threads);

        if self.params.suppress_progress {
            fp.set_print_progress(false);
            fp.set_print_realtime(false);
        }

        // ── Create per-call state and run inference ───────────────────────
        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| TranscriptionError::ContextInit(e.to_string()))?;

        let wall_start = std::time::Instant::now();

        state
            .full(fp, &audio)
            .map_err(|e| TranscriptionError::Recognizer(e.to_string()))?;

        // ── Collect segments ──────────────────────────────────────────────
        let n_segments = state
            .full_n_segments()
            .map_err(|e| TranscriptionError::Recognizer(e.to_string()))?;

        let mut segments = Vec::with_capacity(n_segments.max(0) as usize);
        for i in 0..n_segments {
            let text = state
                .full_get_segment_text(i)
                .map_err(|e| TranscriptionError::Recognizer(format!("segment {i}: {e}")))?;

            // Timestamps are in centiseconds.
            let t0 = state
                .full_get_segment_t0(i)
                .map_err(|e| TranscriptionError::Recognizer(format!("segment {i}: {e}")))?;
            let t1 = state
                .full_get_segment_t1(i)
                .map_err(|e| TranscriptionError::Recognizer(format!("segment {i}: {e}")))?;

            segments.push(TranscriptSegment::new(
                t0 as f64 / 100.0,
                t1 as f64 / 100.0,
                text,
            ));
        }

        log::debug!(
            "stt: {} segment(s) in {} ms",
            segments.len(),
            wall_start.elapsed().as_millis()
        );
        Ok(segments)
    }
}

// ---------------------------------------------------------------------------
// MockRecognizer  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns pre-configured segments and records the
/// language and sample count of each call.
#[cfg(test)]
pub struct MockRecognizer {
    response: Result<Vec<TranscriptSegment>, String>,
    calls: std::sync::Mutex<Vec<(String, usize)>>,
}

#[cfg(test)]
impl MockRecognizer {
    /// Create a mock that always returns `Ok(segments)`.
    pub fn ok(segments: Vec<TranscriptSegment>) -> Self {
        Self {
            response: Ok(segments),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always fails with
    /// [`TranscriptionError::Recognizer`].
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// `(language, sample count)` of every call so far.
    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl SpeechRecognizer for MockRecognizer {
    fn recognize(
        &self,
        audio: &[f32],
        language: &str,
    ) -> Result<Vec<TranscriptSegment>, TranscriptionError> {
        self.calls
            .lock()
            .unwrap()
            .push((language.to_owned(), audio.len()));
        if audio.is_empty() {
            return Err(TranscriptionError::EmptyAudio);
        }
        self.response
            .clone()
            .map_err(TranscriptionError::Recognizer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_ok_returns_configured_segments() {
        let mock = MockRecognizer::ok(vec![TranscriptSegment::new(0.0, 1.0, "hi")]);
        let segs = mock.recognize(&[0.0; 16], "en").unwrap();
        assert_eq!(segs.len(), 1);
        assert_eq!(mock.calls(), vec![("en".to_owned(), 16)]);
    }

    #[test]
    fn mock_err_returns_recognizer_error() {
        let mock = MockRecognizer::err("boom");
        let err = mock.recognize(&[0.0; 16], "en").unwrap_err();
        assert!(matches!(err, TranscriptionError::Recognizer(ref m) if m == "boom"));
    }

    #[test]
    fn mock_empty_audio_is_rejected() {
        let mock = MockRecognizer::ok(Vec::new());
        assert!(matches!(
            mock.recognize(&[], "en"),
            Err(TranscriptionError::EmptyAudio)
        ));
    }

    #[test]
    fn load_missing_model_returns_model_not_found() {
        let result =
            WhisperRecognizer::load("/nonexistent/model.bin", TranscribeParams::default(), false);
        assert!(
            matches!(result, Err(TranscriptionError::ModelNotFound(_))),
            "expected ModelNotFound, got: {result:?}"
        );
    }

    #[test]
    fn box_dyn_recognizer_compiles() {
        let recognizer: Box<dyn SpeechRecognizer> = Box::new(MockRecognizer::ok(Vec::new()));
        let _ = recognizer.recognize(&[0.0; 4], "en");
    }

    #[test]
    fn error_display_names_segment() {
        let e = TranscriptionError::MalformedSegment {
            index: 3,
            reason: "end before start".into(),
        };
        assert_eq!(
            e.to_string(),
            "segment 3 has malformed timing: end before start"
        );
    }

    #[test]
    fn short_input_padding_covers_one_second() {
        assert!(MIN_INPUT_SAMPLES > WHISPER_SAMPLE_RATE as usize);
    }
}
