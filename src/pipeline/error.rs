//! Pipeline error types.
//!
//! Each stage fails with its module's own error; [`StageError`] collects them
//! and [`PipelineError`] tags the result with the job and the stage it was
//! in. [`CleanupWarning`] is never returned, only logged.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use super::state::PipelineStage;
use crate::audio::ReconciliationError;
use crate::content::ExtractionError;
use crate::media::MuxError;
use crate::stt::TranscriptionError;
use crate::tts::SynthesisError;

/// Pre-flight rejection. Raised before any file is created.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{role} {path} does not exist")]
    MissingInput { role: &'static str, path: PathBuf },

    #[error("{role} {path} must have a .{expected} extension")]
    WrongExtension {
        role: &'static str,
        path: PathBuf,
        expected: String,
    },

    #[error("invalid output name {0:?}: must be a plain, non-empty file name")]
    InvalidOutputName(String),

    #[error("destination directory {0} does not exist")]
    MissingDestination(PathBuf),
}

#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    #[error(transparent)]
    Mux(#[from] MuxError),

    #[error("stage exceeded its {after:?} deadline")]
    TimedOut { after: Duration },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A blocking task panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StageError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> StageError {
        let path = path.into();
        move |source| StageError::Io { path, source }
    }
}

/// The single failure value a job run returns.
#[derive(Debug, Error)]
#[error("job {job_id} failed at stage {stage}: {error}")]
pub struct PipelineError {
    pub job_id: Uuid,
    pub stage: PipelineStage,
    pub error: StageError,
}

/// The working directory could not be removed. Logged, never returned.
#[derive(Debug, Error)]
#[error("could not remove working directory {path}: {source}")]
pub struct CleanupWarning {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}
