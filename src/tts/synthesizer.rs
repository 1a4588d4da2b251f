//! Text-to-speech seam and the narration stage built on it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::content::TextContent;
use crate::media::{MediaEncoder, ToolError, TranscodeError};

/// File name of the stage's WAV artifact inside the job directory.
pub const NARRATION_WAV: &str = "narration.wav";

// ---------------------------------------------------------------------------
// SynthesisError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("nothing to narrate: text is empty")]
    EmptyText,

    /// HTTP transport or connection error.
    #[error("TTS request failed: {0}")]
    Request(String),

    /// The backend answered but refused the request (e.g. unknown language).
    #[error("TTS backend rejected the request: {0}")]
    Backend(String),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("synthesizer exited with code {code:?}: {diagnostics}")]
    Failed {
        code: Option<i32>,
        diagnostics: String,
    },

    #[error("synthesizer produced no audio at {0}")]
    MissingOutput(PathBuf),

    #[error("cannot convert narration to WAV: {0}")]
    Transcode(#[from] TranscodeError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<reqwest::Error> for SynthesisError {
    fn from(e: reqwest::Error) -> Self {
        SynthesisError::Request(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// SpeechSynthesizer trait
// ---------------------------------------------------------------------------

/// A text-to-speech backend.
///
/// Implementors write exactly one encoded audio file inside `dir` and return
/// its path. They may also leave scratch files there; the directory belongs
/// to the job.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        dir: &Path,
    ) -> Result<PathBuf, SynthesisError>;
}

const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechSynthesizer>) {}
};

// ---------------------------------------------------------------------------
// NarrationSynthesizer
// ---------------------------------------------------------------------------

/// The synthesis stage: one backend call per job, normalized to a WAV
/// artifact.
pub struct NarrationSynthesizer {
    backend: Arc<dyn SpeechSynthesizer>,
    encoder: Arc<dyn MediaEncoder>,
}

impl NarrationSynthesizer {
    pub fn new(backend: Arc<dyn SpeechSynthesizer>, encoder: Arc<dyn MediaEncoder>) -> Self {
        Self { backend, encoder }
    }

    /// Narrate `text` in `language` into `dir` and return the WAV artifact.
    pub async fn synthesize(
        &self,
        text: &TextContent,
        language: &str,
        dir: &Path,
    ) -> Result<PathBuf, SynthesisError> {
        if text.is_empty() {
            return Err(SynthesisError::EmptyText);
        }

        let artifact = self.backend.synthesize(text.as_str(), language, dir).await?;

        match tokio::fs::metadata(&artifact).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => {}
            _ => return Err(SynthesisError::MissingOutput(artifact)),
        }

        if is_wav(&artifact) {
            return Ok(artifact);
        }

        let wav = dir.join(NARRATION_WAV);
        log::debug!(
            "tts: transcoding {} -> {}",
            artifact.display(),
            wav.display()
        );
        self.encoder.transcode_to_wav(&artifact, &wav).await?;
        if !wav.is_file() {
            return Err(SynthesisError::MissingOutput(wav));
        }
        Ok(wav)
    }
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
