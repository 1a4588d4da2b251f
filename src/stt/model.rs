//! Model registry, metadata and path resolution.
//!
//! [`WHISPER_MODELS`] lists the standard multilingual GGML builds published
//! with whisper.cpp. [`ModelPaths`] resolves the on-disk location of a model
//! given an [`crate::config::AppPaths`] instance.

use std::path::PathBuf;

use crate::config::AppPaths;

// ---------------------------------------------------------------------------
// ModelInfo
// ---------------------------------------------------------------------------

/// Static metadata for a single GGML model file.
#[derive(Debug)]
pub struct ModelInfo {
    /// Unique identifier used in `SttConfig::model` (e.g. `"small"`).
    pub id: &'static str,
    pub display_name: &'static str,
    /// File name under the models directory (e.g. `"ggml-small.bin"`).
    pub file_name: &'static str,
    /// Approximate file size in megabytes.
    pub file_size_mb: u64,
    /// Minimum RAM required to run this model (megabytes).
    pub ram_required_mb: u64,
    /// Direct download URL for the GGML file.
    pub source_url: &'static str,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Standard OpenAI Whisper models (99-language multilingual).
pub const WHISPER_MODELS: &[ModelInfo] = &[
    ModelInfo {
        id: "tiny",
        display_name: "Whisper Tiny",
        file_name: "ggml-tiny.bin",
        file_size_mb: 75,
        ram_required_mb: 390,
        source_url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.bin",
    },
    ModelInfo {
        id: "base",
        display_name: "Whisper Base",
        file_name: "ggml-base.bin",
        file_size_mb: 142,
        ram_required_mb: 500,
        source_url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-base.bin",
    },
    ModelInfo {
        id: "small",
        display_name: "Whisper Small [Recommended]",
        file_name: "ggml-small.bin",
        file_size_mb: 466,
        ram_required_mb: 1_000,
        source_url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-small.bin",
    },
    ModelInfo {
        id: "medium",
        display_name: "Whisper Medium",
        file_name: "ggml-medium.bin",
        file_size_mb: 1_500,
        ram_required_mb: 2_600,
        source_url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-medium.bin",
    },
    ModelInfo {
        id: "large-v3",
        display_name: "Whisper Large-v3",
        file_name: "ggml-large-v3.bin",
        file_size_mb: 2_900,
        ram_required_mb: 4_700,
        source_url: "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-large-v3.bin",
    },
];

impl ModelInfo {
    /// `small     Whisper Small [Recommended] (466 MB, needs ~1000 MB RAM)`
    pub fn summary(&self) -> String {
        format!(
            "{:<9} {} ({} MB, needs ~{} MB RAM)",
            self.id, self.display_name, self.file_size_mb, self.ram_required_mb
        )
    }
}

/// Find a [`ModelInfo`] by its `id` string.
pub fn find_model_by_id(id: &str) -> Option<&'static ModelInfo> {
    WHISPER_MODELS.iter().find(|m| m.id == id)
}

// ---------------------------------------------------------------------------
// ModelPaths
// ---------------------------------------------------------------------------

/// Resolves the on-disk location of model files from [`AppPaths`].
///
/// ```rust,no_run
/// use doc_narrator::config::AppPaths;
/// use doc_narrator::stt::{ModelPaths, WHISPER_MODELS};
///
/// let paths = ModelPaths::from_app_paths(&AppPaths::new());
/// let available: Vec<_> = WHISPER_MODELS.iter()
///     .filter(|m| paths.is_available(m))
///     .collect();
/// ```
#[derive(Debug, Clone)]
pub struct ModelPaths {
    /// Directory that contains (or will contain) GGML `.bin` files.
    pub models_dir: PathBuf,
}

impl ModelPaths {
    pub fn from_app_paths(app_paths: &AppPaths) -> Self {
        Self {
            models_dir: app_paths.models_dir.clone(),
        }
    }

    /// Construct directly from a models directory path (useful in tests).
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
        }
    }

    /// Full path to the GGML file for the given model.
    pub fn model_path(&self, model: &ModelInfo) -> PathBuf {
        self.models_dir.join(model.file_name)
    }

    /// Returns `true` if the model file exists on disk.
    pub fn is_available(&self, model: &ModelInfo) -> bool {
        self.model_path(model).exists()
    }

    /// Resolve a `SttConfig::model` value: a registry id, or else a path to
    /// a GGML file.
    pub fn resolve(&self, model: &str) -> PathBuf {
        match find_model_by_id(model) {
            Some(info) => self.model_path(info),
            None => PathBuf::from(model),
        }
    }

    /// One entry per registered model: its summary, then where it is
    /// installed or the URL to download it from.
    pub fn describe_models(&self) -> String {
        let mut out = String::new();
        for model in WHISPER_MODELS {
            let path = self.model_path(model);
            let location = if path.exists() {
                format!("installed at {}", path.display())
            } else {
                format!("download {} to {}", model.source_url, path.display())
            };
            out.push_str(&format!("{}\n    {location}\n", model.summary()));
        }
        out
    }

    /// Returns all registered models that are present on disk.
    pub fn list_local_models(&self) -> Vec<&'static ModelInfo> {
        WHISPER_MODELS
            .iter()
            .filter(|m| self.is_available(m))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
