//! Narration/video duration reconciliation.
//!
//! The narration is tiled or cut (never resampled) so that its sample
//! count is exactly `round(target_secs * sample_rate)`:
//!
//! ```text
//! narration longer  than video → keep the first N samples
//! narration shorter than video → tile end-to-end, then keep the first N
//! narration already N samples  → unchanged
//! ```
//!
//! Tiling (rather than padding with silence) keeps the narration looping for
//! the whole video.

use thiserror::Error;

use super::wav::{AudioError, NarrationAudio};

// ---------------------------------------------------------------------------
// ReconciliationError
// ---------------------------------------------------------------------------

/// Reasons the narration could not be fitted to the video.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// The narration has no samples, so it has no duration to tile.
    #[error("narration audio is empty; cannot fit a zero-length clip to the video")]
    EmptyAudio,

    #[error("narration audio has a zero sample rate")]
    InvalidSampleRate,

    /// Target duration is zero, negative, NaN or infinite.
    #[error("invalid target duration: {0} s")]
    InvalidTarget(f64),

    /// The video's duration could not be determined.
    #[error("could not probe video duration: {0}")]
    Probe(String),

    #[error(transparent)]
    Audio(#[from] AudioError),
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// What [`reconcile`] did to the narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjustment {
    /// Already the right length.
    Unchanged,
    /// Cut down to the target.
    Truncated,
    /// Repeated `repeats` times, then cut down to the target.
    Tiled { repeats: usize },
}

/// Sample count that corresponds to `target_secs` at `sample_rate`.
pub fn target_sample_count(target_secs: f64, sample_rate: u32) -> usize {
    (target_secs * f64::from(sample_rate)).round() as usize
}

/// Fit `audio` to exactly `round(target_secs * sample_rate)` samples.
///
/// ```
/// use doc_narrator::audio::{reconcile, Adjustment, NarrationAudio};
///
/// // 2 s of narration against a 5 s video: tiled 3×, cut to 5 s.
/// let narration = NarrationAudio::new(vec![0.1; 32_000], 16_000);
/// let (fitted, adjustment) = reconcile(&narration, 5.0).unwrap();
/// assert_eq!(fitted.samples.len(), 80_000);
/// assert_eq!(adjustment, Adjustment::Tiled { repeats: 3 });
/// ```
pub fn reconcile(
    audio: &NarrationAudio,
    target_secs: f64,
) -> Result<(NarrationAudio, Adjustment), ReconciliationError> {
    if audio.sample_rate == 0 {
        return Err(ReconciliationError::InvalidSampleRate);
    }
    if audio.is_empty() {
        return Err(ReconciliationError::EmptyAudio);
    }
    if !target_secs.is_finite() || target_secs <= 0.0 {
        return Err(ReconciliationError::InvalidTarget(target_secs));
    }

    let target_len = target_sample_count(target_secs, audio.sample_rate);
    let len = audio.samples.len();

    let (samples, adjustment) = match len.cmp(&target_len) {
        std::cmp::Ordering::Equal => (audio.samples.clone(), Adjustment::Unchanged),
        std::cmp::Ordering::Greater => (
            audio.samples[..target_len].to_vec(),
            Adjustment::Truncated,
        ),
        std::cmp::Ordering::Less => {
            let repeats = target_len.div_ceil(len);
            let mut tiled = Vec::with_capacity(len * repeats);
            for _ in 0..repeats {
                tiled.extend_from_slice(&audio.samples);
            }
            tiled.truncate(target_len);
            (tiled, Adjustment::Tiled { repeats })
        }
    };

    log::debug!(
        "reconcile: {len} → {target_len} samples @ {} Hz ({adjustment:?})",
        audio.sample_rate
    );

    Ok((NarrationAudio::new(samples, audio.sample_rate), adjustment))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize, rate: u32) -> NarrationAudio {
        NarrationAudio::new((0..len).map(|i| i as f32).collect(), rate)
    }

    #[test]
    fn longer_narration_is_truncated_to_prefix() {
        let audio = ramp(48_000, 16_000); // 3 s
        let (out, adj) = reconcile(&audio, 2.0).unwrap();
        assert_eq!(adj, Adjustment::Truncated);
        assert_eq!(out.samples.len(), 32_000);
        assert_eq!(out.samples[..], audio.samples[..32_000]);
        assert_eq!(out.sample_rate, 16_000);
    }

    #[test]
    fn shorter_narration_is_tiled_not_padded() {
        let audio = ramp(32_000, 16_000); // 2 s
        let (out, adj) = reconcile(&audio, 5.0).unwrap();
        assert_eq!(adj, Adjustment::Tiled { repeats: 3 });
        assert_eq!(out.samples.len(), 80_000);
        // Second and third loops restart from the first sample.
        assert_eq!(out.samples[32_000], 0.0);
        assert_eq!(out.samples[64_000], 0.0);
        assert_eq!(out.samples[79_999], 15_999.0);
    }

    #[test]
    fn exact_length_passes_through() {
        let audio = ramp(16_000, 16_000);
        let (out, adj) = reconcile(&audio, 1.0).unwrap();
        assert_eq!(adj, Adjustment::Unchanged);
        assert_eq!(out, audio);
    }

    #[test]
    fn sample_count_matches_rounded_target_for_many_shapes() {
        let rates = [8_000_u32, 16_000, 22_050, 24_000, 44_100];
        let lengths = [1_usize, 7, 999, 10_000, 123_457];
        let targets = [0.001_f64, 0.5, 1.2345, 3.99999, 7.25, 61.0];

        for &rate in &rates {
            for &len in &lengths {
                let audio = NarrationAudio::new(vec![0.3; len], rate);
                for &target in &targets {
                    let (out, _) = reconcile(&audio, target).unwrap();
                    assert_eq!(
                        out.samples.len(),
                        (target * f64::from(rate)).round() as usize,
                        "rate={rate} len={len} target={target}"
                    );
                    assert_eq!(out.sample_rate, rate);
                }
            }
        }
    }

    #[test]
    fn empty_audio_is_an_error() {
        let audio = NarrationAudio::new(Vec::new(), 16_000);
        assert!(matches!(
            reconcile(&audio, 5.0),
            Err(ReconciliationError::EmptyAudio)
        ));
    }

    #[test]
    fn zero_rate_is_an_error() {
        let audio = NarrationAudio::new(vec![0.0; 10], 0);
        assert!(matches!(
            reconcile(&audio, 5.0),
            Err(ReconciliationError::InvalidSampleRate)
        ));
    }

    #[test]
    fn non_positive_or_non_finite_target_is_an_error() {
        let audio = ramp(100, 16_000);
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                reconcile(&audio, bad),
                Err(ReconciliationError::InvalidTarget(_))
            ));
        }
    }

    #[test]
    fn target_sample_count_rounds_half_up() {
        assert_eq!(target_sample_count(5.0, 16_000), 80_000);
        assert_eq!(target_sample_count(0.25, 2), 1);
        assert_eq!(target_sample_count(0.2, 2), 0);
    }
}
