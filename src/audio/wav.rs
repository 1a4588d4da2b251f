//! Decoded narration audio and its WAV codec.
//!
//! [`NarrationAudio`] is always **mono `f32`** in `[-1.0, 1.0]`.  Multi-channel
//! files are downmixed on read; integer PCM is scaled by its bit depth.
//! Writes produce 32-bit float mono WAV at the audio's own sample rate.

use std::path::Path;

use thiserror::Error;

use super::resample::stereo_to_mono;

// ---------------------------------------------------------------------------
// AudioError
// ---------------------------------------------------------------------------

/// Failures reading or writing a WAV artifact.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to open WAV file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("failed to decode WAV samples: {0}")]
    Decode(#[source] hound::Error),

    #[error("failed to write WAV file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("unsupported WAV format: {0}")]
    Unsupported(String),
}

// ---------------------------------------------------------------------------
// NarrationAudio
// ---------------------------------------------------------------------------

/// Decoded mono narration: samples plus the rate they were recorded at.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl NarrationAudio {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Length in seconds (`samples / sample_rate`); `0.0` for a zero rate.
    ///
    /// ```
    /// use doc_narrator::audio::NarrationAudio;
    ///
    /// let audio = NarrationAudio::new(vec![0.0; 32_000], 16_000);
    /// assert!((audio.duration() - 2.0).abs() < 1e-9);
    /// ```
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }
}

// ---------------------------------------------------------------------------
// WAV I/O
// ---------------------------------------------------------------------------

/// Read a WAV file into mono `f32` narration audio.
pub fn read_wav(path: &Path) -> Result<NarrationAudio, AudioError> {
    let mut reader = hound::WavReader::open(path).map_err(|source| AudioError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(AudioError::Unsupported("zero channels".into()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(AudioError::Unsupported(format!(
                    "{}-bit integer PCM",
                    spec.bits_per_sample
                )));
            }
            let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|sample| sample as f32 / max_val))
                .collect::<Result<_, _>>()
                .map_err(AudioError::Decode)?
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(AudioError::Decode)?,
    };

    let samples = stereo_to_mono(&interleaved, spec.channels);
    Ok(NarrationAudio::new(samples, spec.sample_rate))
}

/// Write narration audio as 32-bit float mono WAV.
pub fn write_wav(path: &Path, audio: &NarrationAudio) -> Result<(), AudioError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let write_err = |source| AudioError::Write {
        path: path.display().to_string(),
        source,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(write_err)?;
    for &sample in &audio.samples {
        writer.write_sample(sample).map_err(write_err)?;
    }
    writer.finalize().map_err(write_err)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
