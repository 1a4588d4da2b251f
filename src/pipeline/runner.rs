//! Pipeline orchestrator: document + video → narrated, subtitled video.
//!
//! [`PipelineOrchestrator`] runs one job per [`run`](PipelineOrchestrator::run)
//! call, strictly stage after stage:
//!
//! ```text
//! Validating    check extensions, inputs, output name       (no files yet)
//! Extracting    TextExtractor → normalize      → content.txt
//! Synthesizing  NarrationSynthesizer           → narration.wav
//! Transcribing  spawn_blocking(TranscriptAligner) → narration.srt
//! Reconciling   probe video, spawn_blocking(reconcile) → narration-reconciled.wav
//! Muxing        MediaEncoder::mux              → <name>.<ext>
//! Finalizing    move <name>.<ext> to the destination
//! ```
//!
//! Every stage after validation runs under its configured deadline and writes
//! only inside the job's working directory, which is removed when the job
//! ends however it ends.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::audio::{read_wav, reconcile, write_wav, Adjustment, ReconciliationError};
use crate::config::PipelineConfig;
use crate::content::{normalize, TextExtractor};
use crate::media::{MediaEncoder, MuxRequest, VideoAsset};
use crate::stt::{SpeechRecognizer, TranscriptAligner};
use crate::subtitle::write_srt;
use crate::tts::{NarrationSynthesizer, SpeechSynthesizer};

use super::error::{PipelineError, StageError, ValidationError};
use super::job::PipelineJob;
use super::state::PipelineStage;

/// Normalized document text.
pub const CONTENT_FILE: &str = "content.txt";
/// SubRip subtitles built from the narration transcript.
pub const SUBTITLE_FILE: &str = "narration.srt";
/// Narration fitted to the video's duration.
pub const RECONCILED_FILE: &str = "narration-reconciled.wav";

// ---------------------------------------------------------------------------
// Services, requests, events
// ---------------------------------------------------------------------------

/// The external collaborators, built once per process and shared by every
/// job. Cloning is cheap.
#[derive(Clone)]
pub struct PipelineServices {
    pub extractor: Arc<dyn TextExtractor>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub encoder: Arc<dyn MediaEncoder>,
}

/// One narration job.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub document: PathBuf,
    pub video: PathBuf,
    /// Base name of the output; the video extension is appended.
    pub output_name: String,
    /// Existing directory that receives the output.
    pub destination: PathBuf,
    /// Overrides `PipelineConfig::language` for this job.
    pub language: Option<String>,
}

/// Progress notifications. Delivery is best-effort.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    StageStarted {
        job_id: Uuid,
        stage: PipelineStage,
    },
    StageCompleted {
        job_id: Uuid,
        stage: PipelineStage,
        artifact: Option<PathBuf>,
    },
    Finished {
        job_id: Uuid,
        output: PathBuf,
    },
    Failed {
        job_id: Uuid,
        stage: PipelineStage,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// PipelineOrchestrator
// ---------------------------------------------------------------------------

/// Drives jobs through the stage sequence.
///
/// `run` takes `&self`, so one orchestrator (and the model it holds) can
/// serve concurrent jobs; each job gets its own working directory.
///
/// ```rust,no_run
/// use doc_narrator::config::PipelineConfig;
/// use doc_narrator::pipeline::{JobRequest, PipelineOrchestrator, PipelineServices};
///
/// # async fn example(services: PipelineServices) {
/// let orchestrator = PipelineOrchestrator::new(services, PipelineConfig::default());
/// let request = JobRequest {
///     document: "paper.pdf".into(),
///     video: "clip.mp4".into(),
///     output_name: "paper-narrated".into(),
///     destination: ".".into(),
///     language: None,
/// };
/// match orchestrator.run(&request).await {
///     Ok(path) => println!("{}", path.display()),
///     Err(e) => eprintln!("{e}"),
/// }
/// # }
/// ```
pub struct PipelineOrchestrator {
    services: PipelineServices,
    synthesizer: NarrationSynthesizer,
    aligner: TranscriptAligner,
    config: PipelineConfig,
    events: Option<mpsc::UnboundedSender<JobEvent>>,
}

impl PipelineOrchestrator {
    pub fn new(services: PipelineServices, config: PipelineConfig) -> Self {
        let synthesizer = NarrationSynthesizer::new(
            Arc::clone(&services.synthesizer),
            Arc::clone(&services.encoder),
        );
        let aligner = TranscriptAligner::new(Arc::clone(&services.recognizer));
        Self {
            services,
            synthesizer,
            aligner,
            config,
            events: None,
        }
    }

    /// Send [`JobEvent`]s to `tx`. A closed receiver is ignored.
    #[must_use]
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<JobEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Entry point
    // -----------------------------------------------------------------------

    /// Run one job to completion and return the path of the output video.
    ///
    /// On failure nothing is left at the destination, and the working
    /// directory is gone in both cases.
    pub async fn run(&self, request: &JobRequest) -> Result<PathBuf, PipelineError> {
        let mut job = PipelineJob::new();
        let started = Instant::now();
        log::info!(
            "pipeline[{}]: {} + {} -> {}",
            job.job_id,
            request.document.display(),
            request.video.display(),
            request.output_name
        );

        let result = self.drive(&mut job, request).await;
        self.conclude(&mut job, result, started)
    }

    /// Finish `job`, report the outcome, and hand `result` back unchanged.
    /// A working directory that cannot be removed is only logged.
    fn conclude(
        &self,
        job: &mut PipelineJob,
        result: Result<PathBuf, PipelineError>,
        started: Instant,
    ) -> Result<PathBuf, PipelineError> {
        if let Some(warning) = job.finish(result.is_ok()) {
            log::warn!("pipeline[{}]: {warning}", job.job_id);
        }

        match &result {
            Ok(output) => {
                log::info!(
                    "pipeline[{}]: done in {:.1?}: {}",
                    job.job_id,
                    started.elapsed(),
                    output.display()
                );
                self.emit(JobEvent::Finished {
                    job_id: job.job_id,
                    output: output.clone(),
                });
            }
            Err(e) => {
                log::error!("pipeline[{}]: {e}", job.job_id);
                self.emit(JobEvent::Failed {
                    job_id: job.job_id,
                    stage: e.stage,
                    message: e.error.to_string(),
                });
            }
        }

        result
    }

    async fn drive(
        &self,
        job: &mut PipelineJob,
        request: &JobRequest,
    ) -> Result<PathBuf, PipelineError> {
        let job_id = job.job_id;
        let language = request
            .language
            .as_deref()
            .unwrap_or(self.config.language.as_str());

        // ── Validating ───────────────────────────────────────────────────
        job.enter(PipelineStage::Validating);
        self.emit(JobEvent::StageStarted {
            job_id,
            stage: PipelineStage::Validating,
        });
        let file_name = self.validate(request).map_err(|e| PipelineError {
            job_id,
            stage: PipelineStage::Validating,
            error: e.into(),
        })?;
        self.emit(JobEvent::StageCompleted {
            job_id,
            stage: PipelineStage::Validating,
            artifact: None,
        });

        // ── Working directory ────────────────────────────────────────────
        let root = self.config.work_root();
        let dir = job.open_workdir(&root).map_err(|source| PipelineError {
            job_id,
            stage: PipelineStage::Extracting,
            error: StageError::Io {
                path: root.clone(),
                source,
            },
        })?;
        log::debug!("pipeline[{job_id}]: working in {}", dir.display());

        // ── Stages ───────────────────────────────────────────────────────
        let content = self
            .stage(
                job,
                PipelineStage::Extracting,
                Some(self.config.extract_timeout()),
                self.extract(&request.document, &dir),
            )
            .await?;

        let narration = self
            .stage(
                job,
                PipelineStage::Synthesizing,
                Some(self.config.synthesis_timeout()),
                self.synthesize(&content, language, &dir),
            )
            .await?;

        let subtitles = self
            .stage(
                job,
                PipelineStage::Transcribing,
                Some(self.config.transcription_timeout()),
                self.transcribe(&narration, language, &dir),
            )
            .await?;

        let reconciled = self
            .stage(
                job,
                PipelineStage::Reconciling,
                Some(self.config.reconcile_timeout()),
                self.fit_to_video(&request.video, &narration, &dir),
            )
            .await?;

        let muxed = self
            .stage(
                job,
                PipelineStage::Muxing,
                Some(self.config.mux_timeout()),
                self.mux(&request.video, &reconciled, &subtitles, &dir.join(&file_name)),
            )
            .await?;

        let destination = request.destination.join(&file_name);
        let output = self
            .stage(
                job,
                PipelineStage::Finalizing,
                None,
                finalize(&muxed, &destination),
            )
            .await?;
        Ok(output)
    }

    /// Enter `stage`, run `work` under `limit`, and record its artifact.
    async fn stage<F>(
        &self,
        job: &mut PipelineJob,
        stage: PipelineStage,
        limit: Option<Duration>,
        work: F,
    ) -> Result<PathBuf, PipelineError>
    where
        F: Future<Output = Result<PathBuf, StageError>>,
    {
        let job_id = job.job_id;
        job.enter(stage);
        self.emit(JobEvent::StageStarted { job_id, stage });
        log::info!("pipeline[{job_id}]: {stage}");

        let started = Instant::now();
        let outcome = match limit {
            Some(limit) => with_deadline(limit, work).await,
            None => work.await,
        };

        match outcome {
            Ok(artifact) => {
                log::debug!(
                    "pipeline[{job_id}]: {stage} took {:.1?} -> {}",
                    started.elapsed(),
                    artifact.display()
                );
                job.record(stage, artifact.clone());
                self.emit(JobEvent::StageCompleted {
                    job_id,
                    stage,
                    artifact: Some(artifact.clone()),
                });
                Ok(artifact)
            }
            Err(error) => Err(PipelineError {
                job_id,
                stage,
                error,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Stage bodies
    // -----------------------------------------------------------------------

    /// Returns the output file name (`<name>.<video ext>`).
    fn validate(&self, request: &JobRequest) -> Result<String, ValidationError> {
        check_input("document", &request.document, &self.config.document_extension)?;
        check_input("video", &request.video, &self.config.video_extension)?;

        let name = request.output_name.trim();
        let plain = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(|c| c == '/' || c == '\\');
        if !plain {
            return Err(ValidationError::InvalidOutputName(
                request.output_name.clone(),
            ));
        }

        if !request.destination.is_dir() {
            return Err(ValidationError::MissingDestination(
                request.destination.clone(),
            ));
        }

        Ok(format!(
            "{name}.{}",
            self.config.video_extension.trim_start_matches('.')
        ))
    }

    async fn extract(&self, document: &Path, dir: &Path) -> Result<PathBuf, StageError> {
        let raw = self.services.extractor.extract(document).await?;
        let text = normalize(&raw);
        log::debug!(
            "pipeline: extracted {} bytes, {} after normalizing",
            raw.len(),
            text.as_str().len()
        );

        let path = dir.join(CONTENT_FILE);
        tokio::fs::write(&path, text.as_str())
            .await
            .map_err(StageError::io(&path))?;
        Ok(path)
    }

    async fn synthesize(
        &self,
        content: &Path,
        language: &str,
        dir: &Path,
    ) -> Result<PathBuf, StageError> {
        let raw = tokio::fs::read_to_string(content)
            .await
            .map_err(StageError::io(content))?;
        let text = normalize(&raw);
        Ok(self.synthesizer.synthesize(&text, language, dir).await?)
    }

    async fn transcribe(
        &self,
        narration: &Path,
        language: &str,
        dir: &Path,
    ) -> Result<PathBuf, StageError> {
        let aligner = self.aligner.clone();
        let audio_path = narration.to_path_buf();
        let language = language.to_owned();

        let cues = tokio::task::spawn_blocking(move || aligner.align(&audio_path, &language))
            .await
            .map_err(|e| StageError::Internal(format!("transcription task failed: {e}")))??;

        let path = dir.join(SUBTITLE_FILE);
        write_srt(&path, &cues).map_err(StageError::io(&path))?;
        log::info!("pipeline: {} subtitle cue(s)", cues.len());
        Ok(path)
    }

    async fn fit_to_video(
        &self,
        video: &Path,
        narration: &Path,
        dir: &Path,
    ) -> Result<PathBuf, StageError> {
        let video = VideoAsset::probe(self.services.encoder.as_ref(), video)
            .await
            .map_err(|e| ReconciliationError::Probe(e.to_string()))?;
        let target = video.duration;
        log::debug!("pipeline: {} is {target:.3} s long", video.path.display());

        let input = narration.to_path_buf();
        let output = dir.join(RECONCILED_FILE);
        let out = output.clone();

        // The blocking task outlives this future when the stage times out.
        let cancelled = Arc::new(AtomicBool::new(false));
        let _cancel = CancelOnDrop(Arc::clone(&cancelled));

        let adjustment = tokio::task::spawn_blocking(move || {
            reconcile_file(&input, &out, target, &cancelled)
        })
        .await
        .map_err(|e| StageError::Internal(format!("reconciliation task failed: {e}")))??
        .ok_or_else(|| StageError::Internal("reconciliation cancelled".into()))?;

        log::info!("pipeline: narration fitted to {target:.3} s ({adjustment:?})");
        Ok(output)
    }

    async fn mux(
        &self,
        video: &Path,
        audio: &Path,
        subtitles: &Path,
        output: &Path,
    ) -> Result<PathBuf, StageError> {
        let request = MuxRequest {
            video,
            audio,
            subtitles,
            output,
        };
        self.services.encoder.mux(&request).await?;
        Ok(output.to_path_buf())
    }

    fn emit(&self, event: JobEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Run `work`, failing with [`StageError::TimedOut`] once `limit` passes.
///
/// Dropping `work` on timeout kills any child process it spawned
/// (`kill_on_drop`).
pub async fn with_deadline<T, F>(limit: Duration, work: F) -> Result<T, StageError>
where
    F: Future<Output = Result<T, StageError>>,
{
    tokio::time::timeout(limit, work)
        .await
        .unwrap_or(Err(StageError::TimedOut { after: limit }))
}

/// Sets its flag when dropped.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Fit the WAV at `input` to `target` seconds and write it to `output`.
///
/// Returns `None` without writing once `cancelled` is set. A write already
/// under way is not interrupted.
fn reconcile_file(
    input: &Path,
    output: &Path,
    target: f64,
    cancelled: &AtomicBool,
) -> Result<Option<Adjustment>, ReconciliationError> {
    let audio = read_wav(input)?;
    let (fitted, adjustment) = reconcile(&audio, target)?;
    if cancelled.load(Ordering::SeqCst) {
        return Ok(None);
    }
    write_wav(output, &fitted)?;
    Ok(Some(adjustment))
}

fn check_input(role: &'static str, path: &Path, expected: &str) -> Result<(), ValidationError> {
    let expected = expected.trim_start_matches('.');
    let matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(expected));
    if !matches {
        return Err(ValidationError::WrongExtension {
            role,
            path: path.to_path_buf(),
            expected: expected.to_owned(),
        });
    }
    if !path.is_file() {
        return Err(ValidationError::MissingInput {
            role,
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

async fn finalize(output: &Path, destination: &Path) -> Result<PathBuf, StageError> {
    move_file(output, destination)
        .await
        .map_err(StageError::io(destination))?;
    Ok(destination.to_path_buf())
}

/// `rename`, or copy + remove when the two paths are on different
/// filesystems.
///
/// Succeeds once the file is complete at `to`. The source lives in the
/// working directory, so failing to remove it is only logged.
async fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    copy_across(from, to).await?;
    discard_source(from).await;
    Ok(())
}

/// Copy `from` to `to`. A failed copy leaves nothing at `to`.
async fn copy_across(from: &Path, to: &Path) -> io::Result<()> {
    if let Err(e) = tokio::fs::copy(from, to).await {
        let _ = tokio::fs::remove_file(to).await;
        return Err(e);
    }
    Ok(())
}

async fn discard_source(from: &Path) {
    if let Err(e) = tokio::fs::remove_file(from).await {
        log::warn!("pipeline: could not remove {} after copying it: {e}", from.display());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
