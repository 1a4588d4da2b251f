//! Narration audio → subtitle cues.

use std::path::Path;
use std::sync::Arc;

use crate::audio::{read_wav, resample_to_16k};
use crate::stt::engine::{SpeechRecognizer, TranscriptionError};
use crate::stt::transcribe::TranscriptSegment;
use crate::subtitle::{sanitize_cue_text, SubtitleCue, Timestamp, EMPTY_CUE_TEXT};

/// Runs the recognizer over a narration file and turns its segments into
/// numbered, sanitized cues. Timing is copied from the recognizer untouched.
#[derive(Clone)]
pub struct TranscriptAligner {
    recognizer: Arc<dyn SpeechRecognizer>,
}

impl TranscriptAligner {
    pub fn new(recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Blocking: decodes the WAV and runs inference on the calling thread.
    pub fn align(
        &self,
        narration: &Path,
        language: &str,
    ) -> Result<Vec<SubtitleCue>, TranscriptionError> {
        let audio = read_wav(narration)?;
        if audio.is_empty() {
            return Err(TranscriptionError::EmptyAudio);
        }

        let samples = resample_to_16k(&audio.samples, audio.sample_rate);
        let segments = self.recognizer.recognize(&samples, language)?;
        log::debug!(
            "stt: {} segment(s) for {:.2} s of narration",
            segments.len(),
            audio.duration()
        );
        segments_to_cues(&segments)
    }
}

/// Validate segment timing and turn each segment into one cue numbered
/// `position + 1`.
///
/// A segment whose text is empty after sanitizing gets [`EMPTY_CUE_TEXT`],
/// since an empty body would end its SubRip block early.
pub fn segments_to_cues(
    segments: &[TranscriptSegment],
) -> Result<Vec<SubtitleCue>, TranscriptionError> {
    let mut cues = Vec::with_capacity(segments.len());
    let mut previous_start = 0.0;

    for (index, segment) in segments.iter().enumerate() {
        let malformed = |reason: String| TranscriptionError::MalformedSegment { index, reason };

        let start = Timestamp::from_secs(segment.start)
            .ok_or_else(|| malformed(format!("invalid start {}", segment.start)))?;
        let end = Timestamp::from_secs(segment.end)
            .ok_or_else(|| malformed(format!("invalid end {}", segment.end)))?;
        if segment.end < segment.start {
            return Err(malformed(format!(
                "ends at {} before it starts at {}",
                segment.end, segment.start
            )));
        }
        if segment.start < previous_start {
            return Err(malformed(format!(
                "starts at {} before the previous segment at {}",
                segment.start, previous_start
            )));
        }
        previous_start = segment.start;

        let text = sanitize_cue_text(&segment.text);
        let text = if text.is_empty() { EMPTY_CUE_TEXT } else { text.as_str() };
        cues.push(SubtitleCue::new(index + 1, start, end, text));
    }

    Ok(cues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{write_wav, NarrationAudio};
    use crate::stt::engine::MockRecognizer;

    fn seg(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment::new(start, end, text)
    }

    #[test]
    fn cues_are_numbered_from_one_in_order() {
        let cues = segments_to_cues(&[
            seg(0.0, 1.5, " Hello "),
            seg(1.5, 3.0, "world"),
            seg(3.0, 3.0, "again"),
        ])
        .unwrap();
        let indices: Vec<_> = cues.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(cues[0].text, "Hello");
        assert_eq!(cues[1].start.as_secs(), 1.5);
        assert_eq!(cues[1].end.as_secs(), 3.0);
    }

    #[test]
    fn arrow_in_text_is_substituted() {
        let cues = segments_to_cues(&[seg(0.0, 1.0, "a --> b")]).unwrap();
        assert_eq!(cues[0].text, "a → b");
    }

    #[test]
    fn blank_segment_keeps_its_position_with_placeholder_text() {
        let cues = segments_to_cues(&[
            seg(0.0, 1.0, "one"),
            seg(1.0, 2.0, "   "),
            seg(2.0, 3.0, "three"),
        ])
        .unwrap();
        let numbered: Vec<_> = cues
            .iter()
            .map(|c| (c.index, c.start.as_secs(), c.text.as_str()))
            .collect();
        assert_eq!(
            numbered,
            vec![(1, 0.0, "one"), (2, 1.0, EMPTY_CUE_TEXT), (3, 2.0, "three")]
        );
    }

    #[test]
    fn blank_segment_renders_a_complete_block() {
        let cues = segments_to_cues(&[seg(0.0, 1.0, "\n\n"), seg(1.0, 2.0, "b")]).unwrap();
        let srt = crate::subtitle::render_srt(&cues);
        assert_eq!(
            srt,
            format!(
                "1\n00:00:00,000 --> 00:00:01,000\n{EMPTY_CUE_TEXT}\n\n\
                 2\n00:00:01,000 --> 00:00:02,000\nb\n\n"
            )
        );
    }

    #[test]
    fn inverted_segment_is_malformed() {
        let err = segments_to_cues(&[seg(0.0, 1.0, "ok"), seg(2.0, 1.0, "bad")]).unwrap_err();
        assert!(matches!(
            err,
            TranscriptionError::MalformedSegment { index: 1, .. }
        ));
    }

    #[test]
    fn negative_or_nan_time_is_malformed() {
        assert!(matches!(
            segments_to_cues(&[seg(-0.5, 1.0, "x")]),
            Err(TranscriptionError::MalformedSegment { index: 0, .. })
        ));
        assert!(matches!(
            segments_to_cues(&[seg(0.0, f64::NAN, "x")]),
            Err(TranscriptionError::MalformedSegment { index: 0, .. })
        ));
    }

    #[test]
    fn out_of_order_start_is_malformed() {
        let err = segments_to_cues(&[seg(2.0, 3.0, "b"), seg(1.0, 4.0, "a")]).unwrap_err();
        assert!(matches!(
            err,
            TranscriptionError::MalformedSegment { index: 1, .. }
        ));
    }

    #[test]
    fn starts_are_non_decreasing() {
        let segments: Vec<_> = (0..50)
            .map(|i| seg(i as f64 * 0.7, i as f64 * 0.7 + 1.2, "w"))
            .collect();
        let cues = segments_to_cues(&segments).unwrap();
        assert!(cues
            .windows(2)
            .all(|w| w[0].index + 1 == w[1].index && w[0].start <= w[1].start));
    }

    #[test]
    fn align_resamples_and_requests_language() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("narration.wav");
        write_wav(&wav, &NarrationAudio::new(vec![0.1; 32_000], 32_000)).unwrap();

        let mock = Arc::new(MockRecognizer::ok(vec![seg(0.0, 1.0, "Hello world.")]));
        let aligner = TranscriptAligner::new(mock.clone());
        let cues = aligner.align(&wav, "fr").unwrap();

        assert_eq!(cues.len(), 1);
        assert_eq!(mock.calls(), vec![("fr".to_owned(), 16_000)]);
    }

    #[test]
    fn align_empty_wav_is_empty_audio() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("narration.wav");
        write_wav(&wav, &NarrationAudio::new(Vec::new(), 16_000)).unwrap();

        let aligner = TranscriptAligner::new(Arc::new(MockRecognizer::ok(Vec::new())));
        assert!(matches!(
            aligner.align(&wav, "en"),
            Err(TranscriptionError::EmptyAudio)
        ));
    }

    #[test]
    fn align_unreadable_file_is_audio_error() {
        let aligner = TranscriptAligner::new(Arc::new(MockRecognizer::ok(Vec::new())));
        assert!(matches!(
            aligner.align(Path::new("/nonexistent/narration.wav"), "en"),
            Err(TranscriptionError::Audio(_))
        ));
    }
}
