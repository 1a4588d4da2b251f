//! Job state machine.
//!
//! [`PipelineStage`] is where a job is; [`JobStatus`] is the coarse outcome
//! a caller polls. The stage transitions are strictly linear:
//!
//! ```text
//! Idle ─▶ Validating ─▶ Extracting ─▶ Synthesizing ─▶ Transcribing
//!      ─▶ Reconciling ─▶ Muxing ─▶ Finalizing ─▶ Done
//! any working stage ──error / deadline──▶ Failed
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// PipelineStage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStage {
    /// Job created, nothing checked yet.
    Idle,
    /// Input paths, extensions and output name are being checked. No files
    /// exist yet.
    Validating,
    /// Document text is being extracted and normalized.
    Extracting,
    /// The narration audio is being produced.
    Synthesizing,
    /// The narration is being recognized and the subtitle file written.
    Transcribing,
    /// The narration is being fitted to the video's duration.
    Reconciling,
    /// The external encoder is combining video, narration and subtitles.
    Muxing,
    /// The output is being moved to its destination.
    Finalizing,
    Done,
    Failed,
}

impl PipelineStage {
    /// Working stages in execution order.
    pub const SEQUENCE: [PipelineStage; 7] = [
        PipelineStage::Validating,
        PipelineStage::Extracting,
        PipelineStage::Synthesizing,
        PipelineStage::Transcribing,
        PipelineStage::Reconciling,
        PipelineStage::Muxing,
        PipelineStage::Finalizing,
    ];

    /// `true` for `Done` and `Failed`.
    ///
    /// ```
    /// use doc_narrator::pipeline::PipelineStage;
    ///
    /// assert!(PipelineStage::Done.is_terminal());
    /// assert!(PipelineStage::Failed.is_terminal());
    /// assert!(!PipelineStage::Muxing.is_terminal());
    /// ```
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }

    /// The stage that follows this one on success, if any.
    pub fn next(&self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Idle => Some(PipelineStage::Validating),
            PipelineStage::Finalizing => Some(PipelineStage::Done),
            PipelineStage::Done | PipelineStage::Failed => None,
            stage => {
                let pos = Self::SEQUENCE.iter().position(|s| s == stage)?;
                Self::SEQUENCE.get(pos + 1).copied()
            }
        }
    }

    /// A short human-readable label for logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineStage::Idle => "Idle",
            PipelineStage::Validating => "Validating",
            PipelineStage::Extracting => "Extracting",
            PipelineStage::Synthesizing => "Synthesizing",
            PipelineStage::Transcribing => "Transcribing",
            PipelineStage::Reconciling => "Reconciling",
            PipelineStage::Muxing => "Muxing",
            PipelineStage::Finalizing => "Finalizing",
            PipelineStage::Done => "Done",
            PipelineStage::Failed => "Failed",
        }
    }
}

impl Default for PipelineStage {
    fn default() -> Self {
        PipelineStage::Idle
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_walks_the_sequence_to_done() {
        let mut stage = PipelineStage::Idle;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            visited.push(next);
            stage = next;
        }
        assert_eq!(
            visited,
            vec![
                PipelineStage::Idle,
                PipelineStage::Validating,
                PipelineStage::Extracting,
                PipelineStage::Synthesizing,
                PipelineStage::Transcribing,
                PipelineStage::Reconciling,
                PipelineStage::Muxing,
                PipelineStage::Finalizing,
                PipelineStage::Done,
            ]
        );
    }

    #[test]
    fn failed_has_no_successor() {
        assert_eq!(PipelineStage::Failed.next(), None);
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(PipelineStage::Transcribing.to_string(), "Transcribing");
    }

    #[test]
    fn defaults() {
        assert_eq!(PipelineStage::default(), PipelineStage::Idle);
        assert_eq!(JobStatus::default(), JobStatus::Pending);
    }
}
