//! Recognition parameters and the segment type recognizers return.
//!
//! [`TranscribeParams`] carries everything that controls a Whisper run except
//! the language, which is chosen per job and passed to
//! [`SpeechRecognizer::recognize`](crate::stt::SpeechRecognizer::recognize).

use crate::config::SttConfig;

// ---------------------------------------------------------------------------
// SamplingStrategy
// ---------------------------------------------------------------------------

/// Mirrors `whisper_rs::SamplingStrategy` but is owned and `Clone`.
///
/// Greedy is the default. [`SamplingStrategy::BeamSearch`] gives slightly
/// better accuracy at 2-4× the cost, which matters little for offline
/// narration.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingStrategy {
    /// Greedy (single-pass) decoding.
    Greedy {
        /// Number of candidate tokens evaluated per step.  1 is fastest.
        best_of: i32,
    },
    /// Beam-search decoding.
    BeamSearch {
        /// Number of beams to maintain in parallel.
        beam_size: i32,
        /// Beam-search patience factor (≥1.0 = standard beam search).
        patience: f32,
    },
}

impl Default for SamplingStrategy {
    fn default() -> Self {
        Self::Greedy { best_of: 1 }
    }
}

// ---------------------------------------------------------------------------
// TranscribeParams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TranscribeParams {
    /// Greedy is fastest; BeamSearch is more accurate.
    pub strategy: SamplingStrategy,

    /// Number of CPU threads handed to Whisper.  Defaults to
    /// [`optimal_threads()`], capped at 8.
    pub n_threads: i32,

    /// Suppress Whisper's progress output to stderr.
    pub suppress_progress: bool,
}

impl Default for TranscribeParams {
    fn default() -> Self {
        Self {
            strategy: SamplingStrategy::default(),
            n_threads: optimal_threads(),
            suppress_progress: true,
        }
    }
}

impl TranscribeParams {
    /// `[stt]` overrides on top of the defaults. A configured beam size
    /// switches to beam search.
    pub fn from_config(config: &SttConfig) -> Self {
        let mut params = Self::default();
        if let Some(n) = config.n_threads.filter(|n| *n > 0) {
            params.n_threads = n;
        }
        if let Some(beam_size) = config.beam_size.filter(|b| *b > 1) {
            params.strategy = SamplingStrategy::BeamSearch {
                beam_size,
                patience: 1.0,
            };
        }
        params
    }
}

/// Returns the number of physical CPU threads to use for inference,
/// capped at 8 to avoid diminishing returns on Whisper.
pub(crate) fn optimal_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8) as i32)
        .unwrap_or(4)
}

// ---------------------------------------------------------------------------
// TranscriptSegment
// ---------------------------------------------------------------------------

/// One time-aligned chunk of recognized speech, times in seconds from the
/// start of the audio.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_greedy() {
        let p = TranscribeParams::default();
        assert_eq!(p.strategy, SamplingStrategy::Greedy { best_of: 1 });
        assert!(p.suppress_progress);
    }

    #[test]
    fn config_beam_size_selects_beam_search() {
        let config = SttConfig {
            beam_size: Some(5),
            n_threads: Some(2),
            ..SttConfig::default()
        };
        let p = TranscribeParams::from_config(&config);
        assert_eq!(
            p.strategy,
            SamplingStrategy::BeamSearch {
                beam_size: 5,
                patience: 1.0
            }
        );
        assert_eq!(p.n_threads, 2);
    }

    #[test]
    fn non_positive_threads_are_ignored() {
        let config = SttConfig {
            n_threads: Some(0),
            ..SttConfig::default()
        };
        assert_eq!(
            TranscribeParams::from_config(&config).n_threads,
            optimal_threads()
        );
    }

    #[test]
    fn optimal_threads_is_positive_and_at_most_8() {
        let t = optimal_threads();
        assert!((1..=8).contains(&t));
    }
}
