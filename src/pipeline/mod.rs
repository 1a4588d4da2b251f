//! Job orchestration: one document and one video in, one narrated,
//! subtitled video out.
//!
//! # Architecture
//!
//! ```text
//! JobRequest
//!     │
//!     ▼
//! PipelineOrchestrator::run()            ← one call per job, &self
//!     │
//!     ├─ Validating     extensions, inputs, output name
//!     ├─ WorkDir        narrate-<job id>-XXXXXX under work_root
//!     ├─ Extracting     TextExtractor → normalize → content.txt
//!     ├─ Synthesizing   NarrationSynthesizer → narration.wav
//!     ├─ Transcribing   spawn_blocking(TranscriptAligner) → narration.srt
//!     ├─ Reconciling    probe + spawn_blocking(reconcile) → narration-reconciled.wav
//!     ├─ Muxing         MediaEncoder::mux → <name>.<ext>
//!     └─ Finalizing     move to destination
//!
//! JobEvent (mpsc::UnboundedSender) ──▶ caller (CLI logger, UI, ...)
//! Result<PathBuf, PipelineError>   ──▶ caller
//! ```

pub mod error;
pub mod job;
pub mod runner;
pub mod state;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use error::{CleanupWarning, PipelineError, StageError, ValidationError};
pub use job::{PipelineJob, WorkDir};
pub use runner::{
    with_deadline, JobEvent, JobRequest, PipelineOrchestrator, PipelineServices, CONTENT_FILE,
    RECONCILED_FILE, SUBTITLE_FILE,
};
pub use state::{JobStatus, PipelineStage};
