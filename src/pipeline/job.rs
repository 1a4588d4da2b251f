//! Per-job bookkeeping and the scoped working directory.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use uuid::Uuid;

use super::error::CleanupWarning;
use super::state::{JobStatus, PipelineStage};

// ---------------------------------------------------------------------------
// WorkDir
// ---------------------------------------------------------------------------

/// A job-exclusive directory named `narrate-<job id>-XXXXXX`.
///
/// Removed by [`WorkDir::cleanup`], or on drop if that never ran, so a job
/// abandoned mid-stage still leaves nothing behind.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl WorkDir {
    pub fn create(root: &Path, job_id: Uuid) -> io::Result<Self> {
        std::fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("narrate-{job_id}-"))
            .tempdir_in(root)?;
        Ok(Self {
            path: dir.path().to_path_buf(),
            dir: Some(dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory and everything in it. Idempotent.
    pub fn cleanup(&mut self) -> Option<CleanupWarning> {
        let dir = self.dir.take()?;
        dir.close().err().map(|source| CleanupWarning {
            path: self.path.clone(),
            source,
        })
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if let Some(warning) = self.cleanup() {
            log::warn!("pipeline: {warning}");
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineJob
// ---------------------------------------------------------------------------

/// One run of the pipeline: identity, progress, and the files each stage
/// produced.
#[derive(Debug)]
pub struct PipelineJob {
    pub job_id: Uuid,
    stage: PipelineStage,
    status: JobStatus,
    artifacts: BTreeMap<PipelineStage, PathBuf>,
    workdir: Option<WorkDir>,
}

impl PipelineJob {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(job_id: Uuid) -> Self {
        Self {
            job_id,
            stage: PipelineStage::Idle,
            status: JobStatus::Pending,
            artifacts: BTreeMap::new(),
            workdir: None,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn artifacts(&self) -> &BTreeMap<PipelineStage, PathBuf> {
        &self.artifacts
    }

    pub fn artifact(&self, stage: PipelineStage) -> Option<&Path> {
        self.artifacts.get(&stage).map(PathBuf::as_path)
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_ref().map(WorkDir::path)
    }

    /// Move into a working stage.
    pub fn enter(&mut self, stage: PipelineStage) {
        debug_assert!(!self.stage.is_terminal(), "job already finished");
        self.stage = stage;
        self.status = JobStatus::Running;
    }

    /// Create the working directory under `root`.
    pub fn open_workdir(&mut self, root: &Path) -> io::Result<PathBuf> {
        let workdir = WorkDir::create(root, self.job_id)?;
        let path = workdir.path().to_path_buf();
        self.workdir = Some(workdir);
        Ok(path)
    }

    pub fn record(&mut self, stage: PipelineStage, artifact: PathBuf) {
        self.artifacts.insert(stage, artifact);
    }

    /// Enter `Done` or `Failed` and remove the working directory.
    ///
    /// Artifacts pointing into the working directory are dropped with it;
    /// only the `Finalizing` artifact (outside it) survives success.
    pub fn finish(&mut self, succeeded: bool) -> Option<CleanupWarning> {
        if succeeded {
            self.stage = PipelineStage::Done;
            self.status = JobStatus::Succeeded;
            self.artifacts.retain(|stage, _| *stage == PipelineStage::Finalizing);
        } else {
            self.stage = PipelineStage::Failed;
            self.status = JobStatus::Failed;
            self.artifacts.clear();
        }
        let mut workdir = self.workdir.take()?;
        workdir.cleanup()
    }
}

impl Default for PipelineJob {
    fn default() -> Self {
        Self::new()
    }
}
