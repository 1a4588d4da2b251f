//! The encoder/muxer collaborator seam.
//!
//! [`MediaEncoder`] covers the three things the pipeline needs from an
//! external media toolkit: how long a video is, turning an arbitrary audio
//! file into WAV, and the final video + narration + subtitles mux.
//! [`FfmpegEncoder`](super::FfmpegEncoder) is the production implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use super::process::ToolError;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Video duration could not be determined.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("probe exited with code {code:?}: {diagnostics}")]
    Failed {
        code: Option<i32>,
        diagnostics: String,
    },

    #[error("unreadable probe output: {0}")]
    Parse(String),

    #[error("probe output has no duration")]
    MissingDuration,
}

/// An audio file could not be converted to WAV.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("transcoder exited with code {code:?}:\n{diagnostics}")]
    Failed {
        code: Option<i32>,
        diagnostics: String,
    },
}

/// The final mux failed.
#[derive(Debug, Error)]
pub enum MuxError {
    /// The encoder ran and exited non-zero. `diagnostics` is everything it
    /// printed, verbatim.
    #[error("encoder exited with code {code:?}:\n{diagnostics}")]
    EncoderFailed {
        code: Option<i32>,
        diagnostics: String,
    },

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("encoder reported success but wrote nothing to {0}")]
    MissingOutput(PathBuf),
}

// ---------------------------------------------------------------------------
// MuxRequest
// ---------------------------------------------------------------------------

/// Inputs and output of one mux run.
#[derive(Debug, Clone, Copy)]
pub struct MuxRequest<'a> {
    /// Source video; only its first video stream is used.
    pub video: &'a Path,
    /// Reconciled narration; becomes the only audio stream.
    pub audio: &'a Path,
    /// SubRip file burned into the picture.
    pub subtitles: &'a Path,
    /// Where the muxed file is written.
    pub output: &'a Path,
}

// ---------------------------------------------------------------------------
// VideoAsset
// ---------------------------------------------------------------------------

/// A source video and its probed duration. Read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoAsset {
    pub path: PathBuf,
    /// Seconds.
    pub duration: f64,
}

impl VideoAsset {
    pub async fn probe(encoder: &dyn MediaEncoder, path: &Path) -> Result<Self, ProbeError> {
        let duration = encoder.probe_duration(path).await?;
        Ok(Self {
            path: path.to_path_buf(),
            duration,
        })
    }
}

// ---------------------------------------------------------------------------
// MediaEncoder trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe interface to the external media toolkit.
#[async_trait]
pub trait MediaEncoder: Send + Sync {
    /// Container duration of `video` in seconds.
    async fn probe_duration(&self, video: &Path) -> Result<f64, ProbeError>;

    /// Decode `input` (any format the toolkit reads) into mono WAV at
    /// `output`, keeping the source sample rate.
    async fn transcode_to_wav(&self, input: &Path, output: &Path) -> Result<(), TranscodeError>;

    /// Combine video, narration and burned-in subtitles into `request.output`.
    async fn mux(&self, request: &MuxRequest<'_>) -> Result<(), MuxError>;
}

// Compile-time assertion: Box<dyn MediaEncoder> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn MediaEncoder>) {}
};
