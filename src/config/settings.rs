//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across jobs.
//! Every struct is `#[serde(default)]`, so a `settings.toml` only needs the
//! keys it wants to override.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Job-level settings: narration language, input types, working directories
/// and per-stage deadlines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// ISO-639-1 narration language. Used for synthesis *and* recognition.
    pub language: String,
    /// Parent directory for per-job working directories. `None` means the
    /// OS temp dir.
    pub work_root: Option<PathBuf>,
    /// Expected document extension (compared case-insensitively).
    pub document_extension: String,
    /// Expected video container extension (compared case-insensitively).
    pub video_extension: String,
    /// Deadline for text extraction.
    pub extract_timeout_secs: u64,
    /// Deadline for speech synthesis (including MP3 → WAV transcoding).
    pub synthesis_timeout_secs: u64,
    /// Deadline for speech recognition.
    pub transcription_timeout_secs: u64,
    /// Deadline for probing the video and reconciling the narration.
    pub reconcile_timeout_secs: u64,
    /// Deadline for the final encoder run.
    pub mux_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            language: "en".into(),
            work_root: None,
            document_extension: "pdf".into(),
            video_extension: "mp4".into(),
            extract_timeout_secs: 120,
            synthesis_timeout_secs: 600,
            transcription_timeout_secs: 1_800,
            reconcile_timeout_secs: 120,
            mux_timeout_secs: 3_600,
        }
    }
}

impl PipelineConfig {
    /// Directory under which job working directories are created.
    pub fn work_root(&self) -> PathBuf {
        self.work_root.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn extract_timeout(&self) -> Duration {
        Duration::from_secs(self.extract_timeout_secs)
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_secs)
    }

    pub fn transcription_timeout(&self) -> Duration {
        Duration::from_secs(self.transcription_timeout_secs)
    }

    pub fn reconcile_timeout(&self) -> Duration {
        Duration::from_secs(self.reconcile_timeout_secs)
    }

    pub fn mux_timeout(&self) -> Duration {
        Duration::from_secs(self.mux_timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// ExtractConfig
// ---------------------------------------------------------------------------

/// Selects which library or tool reads text out of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractBackend {
    /// poppler's `pdftotext` command-line tool.
    Pdftotext,
    /// In-process pdfium (requires the `pdfium` cargo feature).
    Pdfium,
}

impl Default for ExtractBackend {
    fn default() -> Self {
        Self::Pdftotext
    }
}

/// Settings for the document text extraction step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub backend: ExtractBackend,
    /// Explicit `pdftotext` binary. `None` means search `PATH`.
    pub pdftotext_path: Option<PathBuf>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            backend: ExtractBackend::default(),
            pdftotext_path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// TtsConfig
// ---------------------------------------------------------------------------

/// Selects which text-to-speech backend produces the narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TtsBackend {
    /// Local `espeak-ng`: offline, writes WAV directly.
    Espeak,
    /// Google Translate's TTS endpoint: online, returns MP3.
    GoogleTranslate,
}

impl Default for TtsBackend {
    fn default() -> Self {
        Self::Espeak
    }
}

/// Settings for the speech synthesis step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub backend: TtsBackend,
    /// Explicit `espeak-ng` binary. `None` means search `PATH`.
    pub espeak_path: Option<PathBuf>,
    /// espeak voice name overriding the narration language (e.g. `"en-us"`).
    pub voice: Option<String>,
    /// Speaking rate in words per minute (espeak only).
    pub words_per_minute: u32,
    /// Top-level domain of the translate endpoint (e.g. `"com"`, `"co.uk"`).
    pub google_tld: String,
    /// Per-request HTTP timeout for the translate endpoint.
    pub request_timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            backend: TtsBackend::default(),
            espeak_path: None,
            voice: None,
            words_per_minute: 160,
            google_tld: "com".into(),
            request_timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// SttConfig
// ---------------------------------------------------------------------------

/// Settings for the Whisper recognizer used to align subtitles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Model id from the registry (e.g. `"small"`), or a path to a GGML file.
    pub model: String,
    /// Worker threads handed to Whisper. `None` picks a value from the host.
    pub n_threads: Option<i32>,
    /// Beam width. `None` selects greedy decoding.
    pub beam_size: Option<i32>,
    /// Attempt GPU-accelerated inference when available.
    pub use_gpu: bool,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: "small".into(),
            n_threads: None,
            beam_size: None,
            use_gpu: false,
        }
    }
}

// ---------------------------------------------------------------------------
// MediaConfig
// ---------------------------------------------------------------------------

/// Settings for the ffmpeg / ffprobe collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Explicit `ffmpeg` binary. `None` means search `PATH`.
    pub ffmpeg_path: Option<PathBuf>,
    /// Explicit `ffprobe` binary. `None` means search `PATH`.
    pub ffprobe_path: Option<PathBuf>,
    /// Video codec for the muxed output.
    pub video_codec: String,
    /// Audio codec for the muxed output.
    pub audio_codec: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            video_codec: "libx264".into(),
            audio_codec: "aac".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use doc_narrator::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Job-level settings.
    pub pipeline: PipelineConfig,
    /// Document text extraction.
    pub extract: ExtractConfig,
    /// Speech synthesis.
    pub tts: TtsConfig,
    /// Speech recognition.
    pub stt: SttConfig,
    /// ffmpeg / ffprobe.
    pub media: MediaConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.pipeline.language, loaded.pipeline.language);
        assert_eq!(original.pipeline.work_root, loaded.pipeline.work_root);
        assert_eq!(
            original.pipeline.document_extension,
            loaded.pipeline.document_extension
        );
        assert_eq!(original.pipeline.mux_timeout_secs, loaded.pipeline.mux_timeout_secs);

        assert_eq!(original.extract.backend, loaded.extract.backend);

        assert_eq!(original.tts.backend, loaded.tts.backend);
        assert_eq!(original.tts.words_per_minute, loaded.tts.words_per_minute);
        assert_eq!(original.tts.google_tld, loaded.tts.google_tld);

        assert_eq!(original.stt.model, loaded.stt.model);
        assert_eq!(original.stt.beam_size, loaded.stt.beam_size);

        assert_eq!(original.media.video_codec, loaded.media.video_codec);
        assert_eq!(original.media.audio_codec, loaded.media.audio_codec);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.pipeline.language, default.pipeline.language);
        assert_eq!(config.stt.model, default.stt.model);
        assert_eq!(config.tts.backend, default.tts.backend);
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.pipeline.language, "en");
        assert_eq!(cfg.pipeline.document_extension, "pdf");
        assert_eq!(cfg.pipeline.video_extension, "mp4");
        assert!(cfg.pipeline.work_root.is_none());
        assert_eq!(cfg.extract.backend, ExtractBackend::Pdftotext);
        assert_eq!(cfg.tts.backend, TtsBackend::Espeak);
        assert_eq!(cfg.stt.model, "small");
        assert!(cfg.stt.beam_size.is_none());
        assert_eq!(cfg.media.video_codec, "libx264");
        assert_eq!(cfg.media.audio_codec, "aac");
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.pipeline.language = "fr".into();
        cfg.pipeline.work_root = Some(PathBuf::from("/var/tmp/narrator"));
        cfg.tts.backend = TtsBackend::GoogleTranslate;
        cfg.tts.voice = Some("fr-fr".into());
        cfg.stt.model = "medium".into();
        cfg.stt.beam_size = Some(5);
        cfg.media.ffmpeg_path = Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.pipeline.language, "fr");
        assert_eq!(
            loaded.pipeline.work_root,
            Some(PathBuf::from("/var/tmp/narrator"))
        );
        assert_eq!(loaded.tts.backend, TtsBackend::GoogleTranslate);
        assert_eq!(loaded.tts.voice.as_deref(), Some("fr-fr"));
        assert_eq!(loaded.stt.model, "medium");
        assert_eq!(loaded.stt.beam_size, Some(5));
        assert_eq!(
            loaded.media.ffmpeg_path,
            Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"))
        );
    }

    /// A file that only sets a couple of keys still loads; the rest default.
    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[pipeline]\nlanguage = \"de\"\n\n[stt]\nmodel = \"base\"\n")
            .expect("write");

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.pipeline.language, "de");
        assert_eq!(cfg.pipeline.video_extension, "mp4");
        assert_eq!(cfg.stt.model, "base");
        assert_eq!(cfg.media.audio_codec, "aac");
    }

    #[test]
    fn work_root_defaults_to_temp_dir() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.work_root(), std::env::temp_dir());
        assert_eq!(cfg.mux_timeout(), Duration::from_secs(3_600));
    }
}
