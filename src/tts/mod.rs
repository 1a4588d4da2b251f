//! Narration synthesis.
//!
//! [`NarrationSynthesizer`] is the pipeline stage; it drives one
//! [`SpeechSynthesizer`] backend and guarantees a WAV artifact.
//!
//! | Backend                  | Needs             | Output          |
//! |--------------------------|-------------------|-----------------|
//! | [`EspeakSynthesizer`]    | `espeak-ng` binary | `narration.wav` |
//! | [`GoogleTtsSynthesizer`] | network           | `narration.mp3` |

pub mod espeak;
pub mod google;
pub mod synthesizer;

use std::sync::Arc;

use crate::config::{TtsBackend, TtsConfig};

pub use espeak::EspeakSynthesizer;
pub use google::{chunk_text, GoogleTtsSynthesizer, MAX_CHUNK_CHARS};
pub use synthesizer::{NarrationSynthesizer, SpeechSynthesizer, SynthesisError, NARRATION_WAV};

/// Build the backend selected in `[tts]`.
pub fn synthesizer_from_config(config: &TtsConfig) -> Arc<dyn SpeechSynthesizer> {
    match config.backend {
        TtsBackend::Espeak => Arc::new(EspeakSynthesizer::from_config(config)),
        TtsBackend::GoogleTranslate => Arc::new(GoogleTtsSynthesizer::from_config(config)),
    }
}
